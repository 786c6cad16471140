//! Test utilities for multi-node scenarios

use crate::core::{Block, ProofOfWork, BLOCK_SALT};
use crate::error::Result;
use crate::network::Server;
use crate::utils::current_timestamp;

/// Spin up `count` nodes bound on sequential localhost ports starting
/// at `base_port`.
pub fn spawn_test_nodes(base_port: u16, count: u16) -> Result<Vec<Server>> {
    let mut nodes = Vec::with_capacity(count as usize);
    for offset in 0..count {
        nodes.push(Server::new("localhost", base_port + offset)?);
    }
    Ok(nodes)
}

/// Shut every node down, releasing the listening sockets.
pub fn shutdown_test_nodes(nodes: &[Server]) {
    for node in nodes {
        node.shutdown();
    }
}

/// Build a sealed block with the given content, ready to submit.
pub fn sealed_test_block(content: &str) -> Result<Block> {
    let mut block = Block::new()?;
    block.set_content(content);
    let header = block.hash(BLOCK_SALT);
    block.set_header(header);
    Ok(block)
}

/// Mine a `register_node` wire line announcing `host:port` at the given
/// difficulty.
pub fn mined_register_line(host: &str, port: u16, difficulty: u32) -> Result<Vec<u8>> {
    let timestamp = current_timestamp()?;
    let payload = format!("{timestamp} {host} {port}");
    let message = ProofOfWork::mine_message(payload.as_bytes(), difficulty, None)?;
    let mut line = b"register_node ".to_vec();
    line.extend(message);
    Ok(line)
}
