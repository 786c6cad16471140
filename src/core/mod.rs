//! Core chain functionality
//!
//! This module contains the block structure, the append-only chain
//! store, and the proof-of-work puzzle engine.

pub mod block;
pub mod chain;
pub mod pow;

pub use block::{Block, BLOCK_SALT};
pub use chain::Chain;
pub use pow::ProofOfWork;
