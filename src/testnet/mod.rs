//! Testnet harness
//!
//! Helpers for spinning up in-process clusters of nodes on sequential
//! ports and producing valid blocks and registration messages for them.

pub mod test_utils;

pub use test_utils::*;
