//! # Gossip Chain - a PoW-gated peer-to-peer blockchain node
//!
//! Each node keeps an in-memory append-only chain and a deduplicated
//! peer list, serves a one-request-per-connection TCP command protocol,
//! and spreads new blocks and new-peer announcements through a gossip
//! protocol gated by proof of work.
//!
//! ## Layout
//! - `core/`: block structure, append-only chain store, PoW engine
//! - `network/`: TCP server, outbound client, command dispatch, peer
//!   registry, gossip engine
//! - `config/`: node tunables (difficulty, fan-out, TTL, timeouts)
//! - `utils/`: digests, timestamps, the restricted serialization
//!   boundary
//! - `cli/`: command-line interface for the node binary
//! - `testnet/`: multi-node test harness
//!
//! Dissemination is best-effort: relays race across independently timed
//! nodes and each picks its own fan-out subset, so full-network
//! convergence is probabilistic, not guaranteed.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod network;
pub mod testnet;
pub mod utils;

// Re-export commonly used types for convenience
pub use cli::{Command, Opt};
pub use config::{Config, GLOBAL_CONFIG};
pub use core::{Block, Chain, ProofOfWork, BLOCK_SALT};
pub use error::{NodeError, Result};
pub use network::{Dispatcher, Gossip, GossipCache, PeerAddress, Peers, Server};
pub use utils::{current_timestamp, deserialize, serialize, sha256_digest};
