//! Peer-to-peer networking functionality
//!
//! This module handles communication between nodes: the one-shot TCP
//! command server, the outbound peer client, the command dispatcher,
//! the peer registry, and the PoW-gated gossip engine.

pub mod client;
pub mod gossip;
pub mod peers;
pub mod protocol;
pub mod server;

pub use gossip::{Fingerprint, Gossip, GossipCache};
pub use peers::{PeerAddress, Peers};
pub use protocol::Dispatcher;
pub use server::Server;
