//! Error handling for the node
//!
//! One crate-wide error enum covering the protocol status taxonomy and
//! the infrastructure failures underneath it.

use std::fmt;

/// Result type alias for node operations
pub type Result<T> = std::result::Result<T, NodeError>;

/// Error types for all node operations
#[derive(Debug, Clone)]
pub enum NodeError {
    /// Unrecognized command name; never routes to domain logic
    InvalidCommand,
    /// Recognized command whose argument bytes fail to parse/decode
    Format(String),
    /// Message fails puzzle verification against the required difficulty
    InvalidPow,
    /// Well-formed block whose header does not match its recomputed hash
    InvalidBlock(String),
    /// Chain query index outside current bounds
    InvalidIndex(usize),
    /// Malformed address or confirmed-unreachable peer
    InvalidHost(String),
    /// Outbound transport errors (connect/timeout/closed)
    Network(String),
    /// Serialization/deserialization errors
    Serialization(String),
    /// Socket and file I/O errors
    Io(String),
    /// Digest/timestamp errors
    Crypto(String),
    /// Configuration errors
    Config(String),
    /// Nonce search exhausted its iteration cap
    Mining(String),
}

impl NodeError {
    /// Map a handler error onto the wire status token.
    ///
    /// Transport errors never surface to a remote caller as a distinct
    /// status; the catch-all keeps an unexpected internal failure from
    /// crashing a connection handler.
    pub fn status_token(&self) -> &'static [u8] {
        match self {
            NodeError::InvalidCommand => b"INVALID_COMMAND",
            NodeError::Format(_) | NodeError::Serialization(_) => b"FORMAT_ERROR",
            NodeError::InvalidPow => b"INVALID_POW",
            NodeError::InvalidBlock(_) => b"INVALID_BLOCK",
            NodeError::InvalidIndex(_) => b"INVALID_INDEX",
            NodeError::InvalidHost(_) => b"INVALID_HOST",
            _ => b"FORMAT_ERROR",
        }
    }
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeError::InvalidCommand => write!(f, "Invalid command"),
            NodeError::Format(msg) => write!(f, "Format error: {msg}"),
            NodeError::InvalidPow => write!(f, "Invalid proof of work"),
            NodeError::InvalidBlock(msg) => write!(f, "Invalid block: {msg}"),
            NodeError::InvalidIndex(idx) => write!(f, "Invalid chain index: {idx}"),
            NodeError::InvalidHost(msg) => write!(f, "Invalid host: {msg}"),
            NodeError::Network(msg) => write!(f, "Network error: {msg}"),
            NodeError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            NodeError::Io(msg) => write!(f, "I/O error: {msg}"),
            NodeError::Crypto(msg) => write!(f, "Cryptographic error: {msg}"),
            NodeError::Config(msg) => write!(f, "Configuration error: {msg}"),
            NodeError::Mining(msg) => write!(f, "Mining error: {msg}"),
        }
    }
}

impl std::error::Error for NodeError {}

impl From<std::io::Error> for NodeError {
    fn from(err: std::io::Error) -> Self {
        NodeError::Io(err.to_string())
    }
}

impl From<bincode::error::EncodeError> for NodeError {
    fn from(err: bincode::error::EncodeError) -> Self {
        NodeError::Serialization(err.to_string())
    }
}

impl From<bincode::error::DecodeError> for NodeError {
    fn from(err: bincode::error::DecodeError) -> Self {
        NodeError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_token_mapping() {
        assert_eq!(NodeError::InvalidCommand.status_token(), b"INVALID_COMMAND");
        assert_eq!(
            NodeError::Format("bad".to_string()).status_token(),
            b"FORMAT_ERROR"
        );
        assert_eq!(NodeError::InvalidPow.status_token(), b"INVALID_POW");
        assert_eq!(
            NodeError::InvalidBlock("header".to_string()).status_token(),
            b"INVALID_BLOCK"
        );
        assert_eq!(NodeError::InvalidIndex(10).status_token(), b"INVALID_INDEX");
        assert_eq!(
            NodeError::InvalidHost("kajfads".to_string()).status_token(),
            b"INVALID_HOST"
        );
    }

    #[test]
    fn test_restricted_decoder_mismatch_is_format_error() {
        let err = NodeError::Serialization("schema mismatch".to_string());
        assert_eq!(err.status_token(), b"FORMAT_ERROR");
    }
}
