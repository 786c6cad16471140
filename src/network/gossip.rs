use crate::core::{Block, Chain, ProofOfWork, BLOCK_SALT};
use crate::error::{NodeError, Result};
use crate::network::client;
use crate::network::peers::{PeerAddress, Peers};
use data_encoding::HEXLOWER;
use log::{info, warn};
use rand::seq::SliceRandom;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Dedup key for a gossip message: timestamp plus payload text.
pub type Fingerprint = (i64, String);

/// Bounded-lifetime first-seen cache.
///
/// The seen check and the insert happen under one lock acquisition, so
/// two concurrent admissions of the same fresh message can never both
/// count as first-seen and double-relay. Expired entries are swept
/// lazily on each admission, which bounds retention under flooding.
pub struct GossipCache {
    inner: Mutex<HashMap<Fingerprint, Instant>>,
    ttl: Duration,
}

impl GossipCache {
    pub fn new(ttl: Duration) -> GossipCache {
        GossipCache {
            inner: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Atomic check-then-insert. Returns true exactly once per
    /// fingerprint within the TTL window.
    pub fn first_seen(&self, fingerprint: Fingerprint) -> bool {
        let mut inner = self
            .inner
            .lock()
            .expect("Failed to acquire gossip cache lock - this should never happen");
        let now = Instant::now();
        inner.retain(|_, seen| now.duration_since(*seen) < self.ttl);
        if inner.contains_key(&fingerprint) {
            return false;
        }
        inner.insert(fingerprint, now);
        true
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .expect("Failed to acquire gossip cache lock - this should never happen")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// PoW-gated dissemination of peer-registration and new-block
/// announcements: admission, deduplication, local apply, relay.
pub struct Gossip {
    cache: GossipCache,
    peers: Arc<Peers>,
    chain: Arc<Chain>,
    self_addr: PeerAddress,
    register_difficulty: u32,
    fanout: usize,
    query_timeout: Duration,
}

impl Gossip {
    pub fn new(
        self_addr: PeerAddress,
        peers: Arc<Peers>,
        chain: Arc<Chain>,
        register_difficulty: u32,
        fanout: usize,
        ttl: Duration,
        query_timeout: Duration,
    ) -> Gossip {
        Gossip {
            cache: GossipCache::new(ttl),
            peers,
            chain,
            self_addr,
            register_difficulty,
            fanout,
            query_timeout,
        }
    }

    /// Admit a peer-registration announcement.
    ///
    /// `raw` is the full wire argument (`timestamp host port nonce`),
    /// relayed verbatim so every hop verifies the same puzzle. A failed
    /// puzzle rejects with no state change; a repeated fingerprint is
    /// absorbed without re-applying or re-relaying.
    pub fn admit_register(
        &self,
        timestamp: i64,
        host: &str,
        port: u16,
        nonce: u64,
        raw: &[u8],
    ) -> Result<()> {
        let payload = format!("{timestamp} {host} {port}");
        if !ProofOfWork::verify(payload.as_bytes(), nonce, self.register_difficulty) {
            return Err(NodeError::InvalidPow);
        }

        if !self.cache.first_seen((timestamp, format!("{host} {port}"))) {
            return Ok(());
        }

        let address = PeerAddress::new(host, port);
        if self.peers.add(address.clone()) {
            info!("Registered peer {address} via gossip");
        }

        let mut command = b"register_node ".to_vec();
        command.extend(raw);
        let targets = self.select_fanout(&address);
        self.relay(command, targets);
        Ok(())
    }

    /// Admit a new-block announcement.
    ///
    /// Valid first-seen blocks are appended and relayed to all known
    /// peers; a block bouncing back through the mesh hits the cache and
    /// is absorbed without growing the chain again.
    pub fn admit_block(&self, raw: &[u8]) -> Result<()> {
        let block = Block::deserialize(raw)?;
        if !block.is_valid(BLOCK_SALT) {
            return Err(NodeError::InvalidBlock(
                "Header does not match recomputed commitment hash".to_string(),
            ));
        }

        let fingerprint = (
            block.get_timestamp(),
            HEXLOWER.encode(block.get_header()),
        );
        if !self.cache.first_seen(fingerprint) {
            return Ok(());
        }

        let index = self.chain.append(block, BLOCK_SALT)?;
        info!("Admitted gossiped block at index {index}");

        let mut command = b"new_block ".to_vec();
        command.extend(raw);
        let targets: Vec<PeerAddress> = self
            .peers
            .list()
            .into_iter()
            .filter(|peer| *peer != self.self_addr)
            .collect();
        self.relay(command, targets);
        Ok(())
    }

    /// Random subset of known peers to relay a registration to,
    /// excluding ourselves and the announced address.
    fn select_fanout(&self, announced: &PeerAddress) -> Vec<PeerAddress> {
        let candidates: Vec<PeerAddress> = self
            .peers
            .list()
            .into_iter()
            .filter(|peer| *peer != self.self_addr && peer != announced)
            .collect();
        candidates
            .choose_multiple(&mut rand::thread_rng(), self.fanout)
            .cloned()
            .collect()
    }

    /// Fire-and-forget relay: one thread per target, each bounded by
    /// its own timeout. A dead or slow peer degrades that one attempt
    /// and nothing else.
    fn relay(&self, command: Vec<u8>, targets: Vec<PeerAddress>) {
        for target in targets {
            let command = command.clone();
            let timeout = self.query_timeout;
            thread::spawn(move || {
                if let Err(e) = client::query(
                    &command,
                    target.get_host(),
                    target.get_port(),
                    timeout,
                ) {
                    warn!("Relay to {target} failed: {e}");
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_gossip(port: u16) -> Gossip {
        let peers = Arc::new(Peers::new());
        let self_addr = PeerAddress::new("localhost", port);
        peers.add(self_addr.clone());
        Gossip::new(
            self_addr,
            peers,
            Arc::new(Chain::new().unwrap()),
            8,
            3,
            Duration::from_secs(60),
            Duration::from_millis(200),
        )
    }

    #[test]
    fn test_cache_first_seen_once() {
        let cache = GossipCache::new(Duration::from_secs(60));
        let fingerprint = (1700000000, "localhost 8000".to_string());
        assert!(cache.first_seen(fingerprint.clone()));
        assert!(!cache.first_seen(fingerprint));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_ttl_expiry() {
        let cache = GossipCache::new(Duration::from_millis(20));
        let fingerprint = (1700000000, "localhost 8000".to_string());
        assert!(cache.first_seen(fingerprint.clone()));
        thread::sleep(Duration::from_millis(40));
        // Expired entry is swept and the message counts as fresh again
        assert!(cache.first_seen(fingerprint));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_admit_register_rejects_bad_pow() {
        let gossip = test_gossip(9300);
        let raw = b"1700000000 localhost 9301 0";
        let result = gossip.admit_register(1700000000, "localhost", 9301, 0, raw);
        // Nonce 0 is overwhelmingly unlikely to satisfy 8 leading zero
        // bits for this payload; a rejected message changes nothing.
        if result.is_err() {
            assert!(matches!(result, Err(NodeError::InvalidPow)));
            assert_eq!(gossip.peers.len(), 1);
        }
    }

    #[test]
    fn test_admit_register_is_idempotent() {
        let gossip = test_gossip(9310);
        let timestamp = 1700000000;
        let payload = format!("{timestamp} localhost 9311");
        let nonce = ProofOfWork::mine(payload.as_bytes(), 8, None).unwrap();
        let raw = format!("{payload} {nonce}").into_bytes();

        gossip
            .admit_register(timestamp, "localhost", 9311, nonce, &raw)
            .unwrap();
        assert_eq!(gossip.peers.len(), 2);

        // Re-delivery within the TTL never re-applies
        gossip
            .admit_register(timestamp, "localhost", 9311, nonce, &raw)
            .unwrap();
        assert_eq!(gossip.peers.len(), 2);
    }

    #[test]
    fn test_admit_block_appends_once() {
        let gossip = test_gossip(9320);
        let mut block = Block::new().unwrap();
        block.set_content("sdfna");
        let header = block.hash(BLOCK_SALT);
        block.set_header(header);
        let raw = block.serialize().unwrap();

        gossip.admit_block(&raw).unwrap();
        assert_eq!(gossip.chain.len(), 2);

        // The same announcement bouncing back is absorbed
        gossip.admit_block(&raw).unwrap();
        assert_eq!(gossip.chain.len(), 2);
    }

    #[test]
    fn test_admit_block_rejects_unsealed() {
        let gossip = test_gossip(9330);
        let raw = Block::new().unwrap().serialize().unwrap();
        let result = gossip.admit_block(&raw);
        assert!(matches!(result, Err(NodeError::InvalidBlock(_))));
        assert_eq!(gossip.chain.len(), 1);
    }

    #[test]
    fn test_admit_block_rejects_garbage() {
        let gossip = test_gossip(9340);
        let result = gossip.admit_block(b"asnd");
        assert!(matches!(result, Err(NodeError::Serialization(_))));
        assert_eq!(gossip.chain.len(), 1);
    }
}
