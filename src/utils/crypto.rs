use ring::digest::{Context, SHA256};

use crate::error::{NodeError, Result};
use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time as whole seconds since the epoch.
pub fn current_timestamp() -> Result<i64> {
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| NodeError::Crypto(format!("System time error: {e}")))?
        .as_secs();

    // Ensure the timestamp fits in i64
    if duration > i64::MAX as u64 {
        return Err(NodeError::Crypto("Timestamp overflow".to_string()));
    }

    Ok(duration as i64)
}

pub fn sha256_digest(data: &[u8]) -> Vec<u8> {
    let mut context = Context::new(&SHA256);
    context.update(data);
    let digest = context.finish();
    digest.as_ref().to_vec()
}
