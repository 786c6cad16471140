//! Configuration management
//!
//! This module handles the node's tunables: proof-of-work difficulty
//! for registration messages, gossip fan-out and cache TTL, and the
//! outbound query timeout.

pub mod settings;

pub use settings::{Config, GLOBAL_CONFIG};
