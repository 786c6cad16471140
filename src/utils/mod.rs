//! Utility functions and helpers
//!
//! This module contains the digest and timestamp helpers and the
//! restricted serialization boundary used throughout the node.

pub mod crypto;
pub mod serialization;

pub use crypto::{current_timestamp, sha256_digest};
pub use serialization::{deserialize, serialize};
