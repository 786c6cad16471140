use crate::core::Chain;
use crate::error::{NodeError, Result};
use crate::network::client;
use crate::network::gossip::Gossip;
use crate::network::peers::{PeerAddress, Peers};
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;

/// Wire status tokens (exhaustive).
pub const SUCCESS: &[u8] = b"SUCCESS";
pub const INVALID_COMMAND: &[u8] = b"INVALID_COMMAND";
pub const FORMAT_ERROR: &[u8] = b"FORMAT_ERROR";
pub const INVALID_POW: &[u8] = b"INVALID_POW";
pub const INVALID_BLOCK: &[u8] = b"INVALID_BLOCK";
pub const INVALID_INDEX: &[u8] = b"INVALID_INDEX";
pub const INVALID_HOST: &[u8] = b"INVALID_HOST";

/// Split an inbound line into command name and argument bytes at the
/// first space. A line with no space is all name and no argument.
fn split_command(line: &[u8]) -> (&[u8], &[u8]) {
    match line.iter().position(|b| *b == b' ') {
        Some(idx) => (&line[..idx], &line[idx + 1..]),
        None => (line, &[]),
    }
}

/// Routes one inbound command line to its handler and renders every
/// outcome as response bytes. Validation failures recover locally into
/// a status token; nothing on this path panics or drops state.
pub struct Dispatcher {
    chain: Arc<Chain>,
    peers: Arc<Peers>,
    gossip: Arc<Gossip>,
    query_timeout: Duration,
}

impl Dispatcher {
    pub fn new(
        chain: Arc<Chain>,
        peers: Arc<Peers>,
        gossip: Arc<Gossip>,
        query_timeout: Duration,
    ) -> Dispatcher {
        Dispatcher {
            chain,
            peers,
            gossip,
            query_timeout,
        }
    }

    /// Handle one command line; always returns response bytes.
    pub fn handle(&self, line: &[u8]) -> Vec<u8> {
        match self.dispatch(line) {
            Ok(response) => response,
            Err(e) => {
                debug!("Command rejected: {e}");
                e.status_token().to_vec()
            }
        }
    }

    fn dispatch(&self, line: &[u8]) -> Result<Vec<u8>> {
        let (name, args) = split_command(line);
        match name {
            b"new_block" => self.handle_new_block(args),
            b"query_block" => self.handle_query_block(args),
            b"add_node" => self.handle_add_node(args),
            b"register_node" => self.handle_register_node(args),
            _ => Err(NodeError::InvalidCommand),
        }
    }

    fn handle_new_block(&self, args: &[u8]) -> Result<Vec<u8>> {
        if args.is_empty() {
            return Err(NodeError::Format("Missing block bytes".to_string()));
        }
        self.gossip.admit_block(args)?;
        Ok(SUCCESS.to_vec())
    }

    fn handle_query_block(&self, args: &[u8]) -> Result<Vec<u8>> {
        if args.len() != 1 {
            return Err(NodeError::Format(format!(
                "Expected a single index byte, got {} bytes",
                args.len()
            )));
        }
        let block = self.chain.get(args[0] as usize)?;
        block.serialize()
    }

    /// `add_node host port`: admit a peer only after a protocol-level
    /// liveness probe. Every failure, malformed arguments included, is
    /// the observed `INVALID_HOST` status.
    fn handle_add_node(&self, args: &[u8]) -> Result<Vec<u8>> {
        let text = std::str::from_utf8(args)
            .map_err(|_| NodeError::InvalidHost("Non-text argument".to_string()))?;
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let [host, port] = tokens.as_slice() else {
            return Err(NodeError::InvalidHost(format!(
                "Expected 'host port', got {text:?}"
            )));
        };
        let port: u16 = port
            .parse()
            .map_err(|_| NodeError::InvalidHost(format!("Unparseable port {port:?}")))?;

        // Liveness handshake: the candidate must answer a genesis query.
        let probe = client::query(b"query_block \x00", host, port, self.query_timeout)
            .map_err(|e| NodeError::InvalidHost(format!("Peer unreachable: {e}")))?;
        if probe.is_empty() {
            return Err(NodeError::InvalidHost(format!(
                "No response from {host}:{port}"
            )));
        }

        let address = PeerAddress::new(*host, port);
        if self.peers.add(address.clone()) {
            info!("Added peer {address}");
        }
        Ok(SUCCESS.to_vec())
    }

    /// `register_node timestamp host port nonce`: the PoW-mined gossip
    /// registration. Shape errors are `FORMAT_ERROR`; puzzle failure is
    /// `INVALID_POW`.
    fn handle_register_node(&self, args: &[u8]) -> Result<Vec<u8>> {
        let text = std::str::from_utf8(args)
            .map_err(|_| NodeError::Format("Non-text argument".to_string()))?;
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let [timestamp, host, port, nonce] = tokens.as_slice() else {
            return Err(NodeError::Format(format!(
                "Expected 'timestamp host port nonce', got {} tokens",
                tokens.len()
            )));
        };
        let timestamp: i64 = timestamp
            .parse()
            .map_err(|_| NodeError::Format(format!("Unparseable timestamp {timestamp:?}")))?;
        let port: u16 = port
            .parse()
            .map_err(|_| NodeError::Format(format!("Unparseable port {port:?}")))?;
        let nonce: u64 = nonce
            .parse()
            .map_err(|_| NodeError::Format(format!("Unparseable nonce {nonce:?}")))?;

        self.gossip
            .admit_register(timestamp, host, port, nonce, args)?;
        Ok(SUCCESS.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Block, ProofOfWork, BLOCK_SALT};

    fn test_dispatcher(port: u16) -> Dispatcher {
        let chain = Arc::new(Chain::new().unwrap());
        let peers = Arc::new(Peers::new());
        let self_addr = PeerAddress::new("localhost", port);
        peers.add(self_addr.clone());
        let gossip = Arc::new(Gossip::new(
            self_addr,
            Arc::clone(&peers),
            Arc::clone(&chain),
            8,
            3,
            Duration::from_secs(60),
            Duration::from_millis(200),
        ));
        Dispatcher::new(chain, peers, gossip, Duration::from_millis(200))
    }

    #[test]
    fn test_unrecognized_command() {
        let dispatcher = test_dispatcher(9400);
        assert_eq!(dispatcher.handle(b"jorl"), INVALID_COMMAND);
        assert_eq!(dispatcher.handle(b""), INVALID_COMMAND);
        assert_eq!(dispatcher.handle(b" new_block"), INVALID_COMMAND);
    }

    #[test]
    fn test_new_block_shape_and_domain_errors() {
        let dispatcher = test_dispatcher(9401);
        assert_eq!(dispatcher.handle(b"new_block"), FORMAT_ERROR);
        assert_eq!(dispatcher.handle(b"new_block asnd"), FORMAT_ERROR);

        let unsealed = Block::new().unwrap().serialize().unwrap();
        let mut line = b"new_block ".to_vec();
        line.extend(&unsealed);
        assert_eq!(dispatcher.handle(&line), INVALID_BLOCK);
        assert_eq!(dispatcher.chain.len(), 1);
    }

    #[test]
    fn test_new_block_success_appends() {
        let dispatcher = test_dispatcher(9402);
        let mut block = Block::new().unwrap();
        let header = block.hash(BLOCK_SALT);
        block.set_header(header);

        let mut line = b"new_block ".to_vec();
        line.extend(block.serialize().unwrap());
        assert_eq!(dispatcher.handle(&line), SUCCESS);
        assert_eq!(dispatcher.chain.len(), 2);
    }

    #[test]
    fn test_query_block() {
        let dispatcher = test_dispatcher(9403);
        assert_eq!(dispatcher.handle(b"query_block \x0a"), INVALID_INDEX);
        assert_eq!(dispatcher.handle(b"query_block \x00\x01"), FORMAT_ERROR);

        let response = dispatcher.handle(b"query_block \x00");
        let genesis = Block::deserialize(&response).unwrap();
        assert!(genesis.get_content().is_empty());
        assert!(genesis.is_valid(BLOCK_SALT));
    }

    #[test]
    fn test_add_node_failures_are_invalid_host() {
        let dispatcher = test_dispatcher(9404);
        assert_eq!(dispatcher.handle(b"add_node kajfads"), INVALID_HOST);
        assert_eq!(dispatcher.handle(b"add_node localhost jorl"), INVALID_HOST);
        // Nothing listens on this port: the liveness probe must fail
        assert_eq!(dispatcher.handle(b"add_node 127.0.0.1 1"), INVALID_HOST);
        assert_eq!(dispatcher.peers.len(), 1);
    }

    #[test]
    fn test_register_node_shape_errors() {
        let dispatcher = test_dispatcher(9405);
        assert_eq!(dispatcher.handle(b"register_node"), FORMAT_ERROR);
        assert_eq!(
            dispatcher.handle(b"register_node 1700000000 localhost 8000"),
            FORMAT_ERROR
        );
        assert_eq!(
            dispatcher.handle(b"register_node xyz localhost 8000 17"),
            FORMAT_ERROR
        );
    }

    #[test]
    fn test_register_node_admission() {
        let dispatcher = test_dispatcher(9406);
        let payload = "1700000000 localhost 9407";
        let nonce = ProofOfWork::mine(payload.as_bytes(), 8, None).unwrap();
        let line = format!("register_node {payload} {nonce}").into_bytes();

        assert_eq!(dispatcher.handle(&line), SUCCESS);
        assert!(dispatcher
            .peers
            .contains(&PeerAddress::new("localhost", 9407)));
    }
}
