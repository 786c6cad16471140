// Restricted serialization boundary: the only path that ever
// reconstructs a value from network bytes. Decoding targets one fixed
// schema per call site and rejects oversized input outright.
use crate::error::{NodeError, Result};
use serde::{Deserialize, Serialize};

/// Hard cap on the size of any decodable network value.
const MAX_DECODE_BYTES: usize = 64 * 1024;

/// Serialize data using bincode 2.0 with standard configuration
pub fn serialize<T: Serialize + bincode::Encode>(data: &T) -> Result<Vec<u8>> {
    let config = bincode::config::standard();
    bincode::encode_to_vec(data, config)
        .map_err(|e| NodeError::Serialization(format!("Serialization failed: {e}")))
}

/// Deserialize data using bincode 2.0, bounded by [`MAX_DECODE_BYTES`].
///
/// Anything that does not match the expected schema is a serialization
/// error, never a panic; callers surface it as `FORMAT_ERROR`.
pub fn deserialize<T>(bytes: &[u8]) -> Result<T>
where
    T: for<'de> Deserialize<'de> + bincode::Decode<()>,
{
    if bytes.len() > MAX_DECODE_BYTES {
        return Err(NodeError::Serialization(format!(
            "Input exceeds decode limit: {} bytes",
            bytes.len()
        )));
    }
    let config = bincode::config::standard().with_limit::<MAX_DECODE_BYTES>();
    let (data, _) = bincode::decode_from_slice(bytes, config)
        .map_err(|e| NodeError::Serialization(format!("Deserialization failed: {e}")))?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
    struct TestData {
        id: u64,
        name: String,
        values: Vec<i32>,
    }

    #[test]
    fn test_serialize_deserialize() {
        let original = TestData {
            id: 42,
            name: "test".to_string(),
            values: vec![1, 2, 3, 4, 5],
        };

        let serialized = serialize(&original).expect("Serialization should work");
        let deserialized: TestData = deserialize(&serialized).expect("Deserialization should work");

        assert_eq!(original, deserialized);
    }

    #[test]
    fn test_deserialize_invalid_data() {
        let invalid_bytes = vec![0xFF, 0xFF, 0xFF, 0xFF];
        let result: Result<TestData> = deserialize(&invalid_bytes);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_rejects_oversized_input() {
        let huge = vec![0u8; MAX_DECODE_BYTES + 1];
        let result: Result<TestData> = deserialize(&huge);
        assert!(result.is_err());
    }
}
