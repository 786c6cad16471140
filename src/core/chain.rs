// In-memory append-only chain. Every stored block was validated against
// its commitment header before insertion; genesis sits at index 0 and is
// never revalidated or removed.

use crate::core::block::{Block, BLOCK_SALT};
use crate::error::{NodeError, Result};
use data_encoding::HEXLOWER;
use log::info;
use std::sync::RwLock;

pub struct Chain {
    blocks: RwLock<Vec<Block>>,
}

impl Chain {
    /// Create a chain holding a freshly stamped genesis block.
    pub fn new() -> Result<Chain> {
        let genesis = Block::generate_genesis_block()?;
        info!(
            "Created chain with genesis header {}",
            HEXLOWER.encode(genesis.get_header())
        );
        Ok(Chain {
            blocks: RwLock::new(vec![genesis]),
        })
    }

    /// Validate the block's commitment against `salt` and append it.
    /// Returns the new block's index. A rejected block causes zero
    /// mutation.
    pub fn append(&self, block: Block, salt: &[u8]) -> Result<usize> {
        if !block.is_valid(salt) {
            return Err(NodeError::InvalidBlock(
                "Header does not match recomputed commitment hash".to_string(),
            ));
        }

        let mut blocks = self
            .blocks
            .write()
            .map_err(|e| NodeError::Io(format!("Failed to acquire chain write lock: {e}")))?;
        blocks.push(block);
        let index = blocks.len() - 1;
        info!("Appended block at index {index}");
        Ok(index)
    }

    /// Bounds-checked lookup returning a snapshot of the block.
    pub fn get(&self, index: usize) -> Result<Block> {
        let blocks = self
            .blocks
            .read()
            .map_err(|e| NodeError::Io(format!("Failed to acquire chain read lock: {e}")))?;
        blocks
            .get(index)
            .cloned()
            .ok_or(NodeError::InvalidIndex(index))
    }

    pub fn len(&self) -> usize {
        self.blocks
            .read()
            .expect("Failed to acquire chain read lock - this should never happen")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        // Genesis guarantees at least one entry.
        self.len() == 0
    }

    /// Stable snapshot of the whole chain, safe to iterate while
    /// appends proceed concurrently.
    pub fn blocks(&self) -> Vec<Block> {
        self.blocks
            .read()
            .expect("Failed to acquire chain read lock - this should never happen")
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sealed_block(content: &str) -> Block {
        let mut block = Block::new().unwrap();
        block.set_content(content);
        let header = block.hash(BLOCK_SALT);
        block.set_header(header);
        block
    }

    #[test]
    fn test_new_chain_has_genesis_at_index_zero() {
        let chain = Chain::new().unwrap();
        assert_eq!(chain.len(), 1);

        let genesis = chain.get(0).unwrap();
        assert!(genesis.get_content().is_empty());
        assert!(genesis.is_valid(BLOCK_SALT));
    }

    #[test]
    fn test_append_valid_block() {
        let chain = Chain::new().unwrap();
        let index = chain.append(sealed_block("sdfna"), BLOCK_SALT).unwrap();
        assert_eq!(index, 1);
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_append_rejects_unsealed_block() {
        let chain = Chain::new().unwrap();
        let block = Block::new().unwrap();

        let result = chain.append(block, BLOCK_SALT);
        assert!(matches!(result, Err(NodeError::InvalidBlock(_))));
        // Rejection causes zero mutation
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_append_rejects_wrong_salt_commitment() {
        let chain = Chain::new().unwrap();
        let mut block = Block::new().unwrap();
        let header = block.hash(b"some-other-salt");
        block.set_header(header);

        assert!(chain.append(block, BLOCK_SALT).is_err());
    }

    #[test]
    fn test_get_out_of_bounds() {
        let chain = Chain::new().unwrap();
        assert!(matches!(chain.get(10), Err(NodeError::InvalidIndex(10))));
    }

    #[test]
    fn test_blocks_snapshot_is_stable() {
        let chain = Chain::new().unwrap();
        let snapshot = chain.blocks();
        chain.append(sealed_block("later"), BLOCK_SALT).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(chain.len(), 2);
    }
}
