use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::env;
use std::sync::RwLock;
use std::time::Duration;

pub static GLOBAL_CONFIG: Lazy<Config> = Lazy::new(Config::new);

const REGISTER_DIFFICULTY_KEY: &str = "REGISTER_POW_DIFFICULTY";
const GOSSIP_FANOUT_KEY: &str = "GOSSIP_FANOUT";
const GOSSIP_TTL_SECS_KEY: &str = "GOSSIP_TTL_SECS";
const QUERY_TIMEOUT_MS_KEY: &str = "QUERY_TIMEOUT_MS";

const DEFAULT_REGISTER_DIFFICULTY: u32 = 12;
const DEFAULT_GOSSIP_FANOUT: usize = 3;
const DEFAULT_GOSSIP_TTL_SECS: u64 = 60;
const DEFAULT_QUERY_TIMEOUT_MS: u64 = 2000;

/// Node tunables, seeded from the environment at first access.
pub struct Config {
    inner: RwLock<HashMap<String, String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Config {
        let mut map = HashMap::new();
        for key in [
            REGISTER_DIFFICULTY_KEY,
            GOSSIP_FANOUT_KEY,
            GOSSIP_TTL_SECS_KEY,
            QUERY_TIMEOUT_MS_KEY,
        ] {
            if let Ok(value) = env::var(key) {
                map.insert(String::from(key), value);
            }
        }

        Config {
            inner: RwLock::new(map),
        }
    }

    fn get_parsed<T: std::str::FromStr>(&self, key: &str, default: T) -> T {
        let inner = self
            .inner
            .read()
            .expect("Failed to acquire read lock on config - this should never happen");
        inner
            .get(key)
            .and_then(|value| value.parse().ok())
            .unwrap_or(default)
    }

    fn set(&self, key: &str, value: String) {
        let mut inner = self
            .inner
            .write()
            .expect("Failed to acquire write lock on config - this should never happen");
        inner.insert(String::from(key), value);
    }

    /// Difficulty, in leading zero bits, a `register_node` message must
    /// have been mined against.
    pub fn get_register_difficulty(&self) -> u32 {
        self.get_parsed(REGISTER_DIFFICULTY_KEY, DEFAULT_REGISTER_DIFFICULTY)
    }

    pub fn set_register_difficulty(&self, difficulty: u32) {
        self.set(REGISTER_DIFFICULTY_KEY, difficulty.to_string());
    }

    /// Number of peers a registration announcement is relayed to.
    pub fn get_gossip_fanout(&self) -> usize {
        self.get_parsed(GOSSIP_FANOUT_KEY, DEFAULT_GOSSIP_FANOUT)
    }

    /// Lifetime of a gossip-cache fingerprint.
    pub fn get_gossip_ttl(&self) -> Duration {
        Duration::from_secs(self.get_parsed(GOSSIP_TTL_SECS_KEY, DEFAULT_GOSSIP_TTL_SECS))
    }

    /// Connect/read deadline for one outbound peer query.
    pub fn get_query_timeout(&self) -> Duration {
        Duration::from_millis(self.get_parsed(QUERY_TIMEOUT_MS_KEY, DEFAULT_QUERY_TIMEOUT_MS))
    }
}
