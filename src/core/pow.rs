use crate::error::{NodeError, Result};
use crate::utils::sha256_digest;
use num_bigint::{BigInt, Sign};

/// Proof-of-work puzzle engine.
///
/// Difficulty is a required count of leading zero bits: a candidate
/// passes when its SHA-256 digest, read as a big-endian integer, is
/// strictly below `1 << (256 - difficulty)`. Mining and verification
/// share the exact same predicate.
pub struct ProofOfWork;

impl ProofOfWork {
    fn target(difficulty: u32) -> BigInt {
        let mut target = BigInt::from(1);
        target <<= 256u32.saturating_sub(difficulty) as usize;
        target
    }

    /// The wire form of a candidate: the payload with the nonce
    /// appended as an ASCII-decimal token after a single space.
    fn candidate(payload: &[u8], nonce: u64) -> Vec<u8> {
        let mut data = Vec::with_capacity(payload.len() + 21);
        data.extend(payload);
        data.push(b' ');
        data.extend(nonce.to_string().into_bytes());
        data
    }

    fn satisfies(data: &[u8], target: &BigInt) -> bool {
        let hash = sha256_digest(data);
        let hash_int = BigInt::from_bytes_be(Sign::Plus, hash.as_slice());
        hash_int < *target
    }

    /// Brute-force nonce search from 0 upward.
    ///
    /// `limit` bounds the number of candidates tried so tests and tools
    /// never block indefinitely; `None` searches until a nonce is found.
    /// CPU-bound: callers must keep this off any serving path.
    pub fn mine(payload: &[u8], difficulty: u32, limit: Option<u64>) -> Result<u64> {
        let target = Self::target(difficulty);
        let max = limit.unwrap_or(u64::MAX);
        let mut nonce: u64 = 0;
        while nonce < max {
            if Self::satisfies(&Self::candidate(payload, nonce), &target) {
                return Ok(nonce);
            }
            nonce += 1;
        }
        Err(NodeError::Mining(format!(
            "Nonce search exhausted after {max} candidates at difficulty {difficulty}"
        )))
    }

    /// Single-digest check that `(payload, nonce)` meets `difficulty`.
    pub fn verify(payload: &[u8], nonce: u64, difficulty: u32) -> bool {
        Self::satisfies(&Self::candidate(payload, nonce), &Self::target(difficulty))
    }

    /// Mine `msg` and return it with the winning nonce appended as the
    /// last space-separated token, ready for the wire.
    pub fn mine_message(msg: &[u8], difficulty: u32, limit: Option<u64>) -> Result<Vec<u8>> {
        let nonce = Self::mine(msg, difficulty, limit)?;
        Ok(Self::candidate(msg, nonce))
    }

    /// Verify a wire message whose last space-separated token is the
    /// nonce. Returns false for messages with no parsable nonce.
    pub fn check_message(msg: &[u8], difficulty: u32) -> bool {
        let Some(split) = msg.iter().rposition(|b| *b == b' ') else {
            return false;
        };
        let Ok(nonce_str) = std::str::from_utf8(&msg[split + 1..]) else {
            return false;
        };
        let Ok(nonce) = nonce_str.parse::<u64>() else {
            return false;
        };
        Self::verify(&msg[..split], nonce, difficulty)
    }
}
