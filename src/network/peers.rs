use std::fmt;
use std::sync::RwLock;

/// A known peer's `(host, port)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerAddress {
    host: String,
    port: u16,
}

impl PeerAddress {
    pub fn new(host: impl Into<String>, port: u16) -> PeerAddress {
        PeerAddress {
            host: host.into(),
            port,
        }
    }

    pub fn get_host(&self) -> &str {
        self.host.as_str()
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Insertion-ordered, deduplicated set of known peers. First-seen wins;
/// re-adding an existing address is a no-op.
pub struct Peers {
    inner: RwLock<Vec<PeerAddress>>,
}

impl Default for Peers {
    fn default() -> Self {
        Self::new()
    }
}

impl Peers {
    pub fn new() -> Peers {
        Peers {
            inner: RwLock::new(vec![]),
        }
    }

    /// Insert an address, returning whether it was newly added.
    pub fn add(&self, address: PeerAddress) -> bool {
        let mut inner = self
            .inner
            .write()
            .expect("Failed to acquire write lock on peers - this should never happen");
        if inner.iter().any(|x| *x == address) {
            return false;
        }
        inner.push(address);
        true
    }

    pub fn contains(&self, address: &PeerAddress) -> bool {
        let inner = self
            .inner
            .read()
            .expect("Failed to acquire read lock on peers - this should never happen");
        inner.iter().any(|x| x == address)
    }

    /// Stable snapshot, safe to iterate while the registry mutates.
    pub fn list(&self) -> Vec<PeerAddress> {
        self.inner
            .read()
            .expect("Failed to acquire read lock on peers - this should never happen")
            .to_vec()
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .expect("Failed to acquire read lock on peers - this should never happen")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner
            .read()
            .expect("Failed to acquire read lock on peers - this should never happen")
            .is_empty()
    }
}
