use crate::utils::{current_timestamp, deserialize, serialize, sha256_digest};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Fixed salt used to commit every block to its content, including
/// genesis. See DESIGN.md for the salt-policy decision.
pub const BLOCK_SALT: &[u8] = b"";

/// A single chain entry: arbitrary content, a creation timestamp in
/// whole seconds, and the commitment header that seals both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct Block {
    content: Vec<u8>,
    timestamp: i64,
    header: Vec<u8>,
}

impl Block {
    /// Create an unsealed block stamped with the current time. The
    /// header stays empty until a miner calls [`Block::set_header`].
    pub fn new() -> Result<Block> {
        Ok(Block {
            content: Vec::new(),
            timestamp: current_timestamp()?,
            header: Vec::new(),
        })
    }

    /// The canonical first chain entry: empty content, sealed against
    /// [`BLOCK_SALT`] at creation time.
    pub fn generate_genesis_block() -> Result<Block> {
        let mut block = Block::new()?;
        let header = block.hash(BLOCK_SALT);
        block.set_header(header);
        Ok(block)
    }

    /// Commitment digest over `content || timestamp || salt`.
    pub fn hash(&self, salt: &[u8]) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.content.len() + 8 + salt.len());
        data.extend(self.content.as_slice());
        data.extend(self.timestamp.to_be_bytes());
        data.extend(salt);
        sha256_digest(data.as_slice())
    }

    /// Whether the stored header matches the recomputed commitment.
    pub fn is_valid(&self, salt: &[u8]) -> bool {
        !self.header.is_empty() && self.header == self.hash(salt)
    }

    pub fn set_content(&mut self, content: impl Into<Vec<u8>>) {
        self.content = content.into();
    }

    pub fn set_header(&mut self, header: Vec<u8>) {
        self.header = header;
    }

    pub fn get_content(&self) -> &[u8] {
        self.content.as_slice()
    }

    pub fn get_timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn get_header(&self) -> &[u8] {
        self.header.as_slice()
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Block> {
        deserialize::<Block>(bytes)
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsealed_block_is_invalid() {
        let block = Block::new().unwrap();
        assert!(!block.is_valid(BLOCK_SALT));
    }

    #[test]
    fn test_sealed_block_is_valid() {
        let mut block = Block::new().unwrap();
        block.set_content("sdfna");
        let header = block.hash(BLOCK_SALT);
        block.set_header(header);
        assert!(block.is_valid(BLOCK_SALT));
    }

    #[test]
    fn test_content_change_breaks_commitment() {
        let mut block = Block::new().unwrap();
        block.set_content("original");
        let header = block.hash(BLOCK_SALT);
        block.set_header(header);
        block.set_content("tampered");
        assert!(!block.is_valid(BLOCK_SALT));
    }

    #[test]
    fn test_hash_depends_on_salt() {
        let block = Block::new().unwrap();
        assert_ne!(block.hash(b""), block.hash(b"other-salt"));
    }

    #[test]
    fn test_genesis_block_is_sealed() {
        let genesis = Block::generate_genesis_block().unwrap();
        assert!(genesis.get_content().is_empty());
        assert!(genesis.is_valid(BLOCK_SALT));
    }

    #[test]
    fn test_serialize_round_trip() {
        let mut block = Block::new().unwrap();
        block.set_content(vec![0u8, 1, 255, 10]);
        let header = block.hash(BLOCK_SALT);
        block.set_header(header);

        let bytes = block.serialize().unwrap();
        let decoded = Block::deserialize(&bytes).unwrap();
        assert_eq!(block, decoded);
    }

    #[test]
    fn test_deserialize_garbage_fails() {
        assert!(Block::deserialize(b"asnd").is_err());
    }
}
