use crate::config::GLOBAL_CONFIG;
use crate::core::Chain;
use crate::error::{NodeError, Result};
use crate::network::client;
use crate::network::gossip::Gossip;
use crate::network::peers::{PeerAddress, Peers};
use crate::network::protocol::Dispatcher;
use log::{error, info, warn};
use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// Largest inbound command line the server will buffer: the decoder's
/// 64 KiB block cap plus command name and framing slack.
const MAX_COMMAND_LEN: usize = 64 * 1024 + 128;

/// A running node: bound listener, background accept loop, and the
/// stores shared with its connection handlers.
pub struct Server {
    addr: PeerAddress,
    chain: Arc<Chain>,
    peers: Arc<Peers>,
    shutdown: Arc<AtomicBool>,
}

impl Server {
    /// Bind `host:port`, seed the peer registry with our own address,
    /// and start accepting connections in the background.
    pub fn new(host: &str, port: u16) -> Result<Server> {
        let listener = TcpListener::bind((host, port))
            .map_err(|e| NodeError::Network(format!("Failed to bind to {host}:{port}: {e}")))?;

        let addr = PeerAddress::new(host, port);
        let chain = Arc::new(Chain::new()?);
        let peers = Arc::new(Peers::new());
        peers.add(addr.clone());

        let gossip = Arc::new(Gossip::new(
            addr.clone(),
            Arc::clone(&peers),
            Arc::clone(&chain),
            GLOBAL_CONFIG.get_register_difficulty(),
            GLOBAL_CONFIG.get_gossip_fanout(),
            GLOBAL_CONFIG.get_gossip_ttl(),
            GLOBAL_CONFIG.get_query_timeout(),
        ));
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&chain),
            Arc::clone(&peers),
            gossip,
            GLOBAL_CONFIG.get_query_timeout(),
        ));

        let shutdown = Arc::new(AtomicBool::new(false));
        let accept_shutdown = Arc::clone(&shutdown);
        thread::spawn(move || {
            Self::accept_loop(listener, dispatcher, accept_shutdown);
        });

        info!("Node listening on {addr}");
        Ok(Server {
            addr,
            chain,
            peers,
            shutdown,
        })
    }

    fn accept_loop(listener: TcpListener, dispatcher: Arc<Dispatcher>, shutdown: Arc<AtomicBool>) {
        for stream in listener.incoming() {
            if shutdown.load(Ordering::SeqCst) {
                break;
            }
            match stream {
                Ok(stream) => {
                    let dispatcher = Arc::clone(&dispatcher);
                    thread::spawn(move || {
                        if let Err(e) = Self::handle_connection(&dispatcher, stream) {
                            warn!("Error handling connection: {e}");
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {e}");
                }
            }
        }
        info!("Accept loop stopped");
    }

    /// One request, one response, then close.
    fn handle_connection(dispatcher: &Dispatcher, mut stream: TcpStream) -> Result<()> {
        let timeout = GLOBAL_CONFIG.get_query_timeout();
        stream
            .set_read_timeout(Some(timeout))
            .map_err(|e| NodeError::Network(format!("Failed to set read timeout: {e}")))?;
        stream
            .set_write_timeout(Some(timeout))
            .map_err(|e| NodeError::Network(format!("Failed to set write timeout: {e}")))?;

        let command = Self::read_command(&mut stream)?;
        let response = dispatcher.handle(&command);

        stream
            .write_all(&response)
            .map_err(|e| NodeError::Network(format!("Failed to write response: {e}")))?;
        let _ = stream.shutdown(Shutdown::Both);
        Ok(())
    }

    /// Read the command line: until the client half-closes, the length
    /// cap is hit, or the read deadline fires with data already in hand.
    fn read_command(stream: &mut TcpStream) -> Result<Vec<u8>> {
        let mut command = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            match stream.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => {
                    command.extend(&chunk[..n]);
                    if command.len() > MAX_COMMAND_LEN {
                        break;
                    }
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e)
                    if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut =>
                {
                    if command.is_empty() {
                        return Err(NodeError::Network(
                            "Timed out waiting for command".to_string(),
                        ));
                    }
                    break;
                }
                Err(e) => {
                    return Err(NodeError::Network(format!("Failed to read command: {e}")));
                }
            }
        }
        Ok(command)
    }

    /// Issue one outbound command to a peer with the configured timeout.
    pub fn query(&self, command: &[u8], host: &str, port: u16) -> Result<Vec<u8>> {
        client::query(command, host, port, GLOBAL_CONFIG.get_query_timeout())
    }

    /// Stop accepting connections and release the listening socket.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        // Nudge the blocked accept call so the loop observes the flag.
        let _ = TcpStream::connect((self.addr.get_host(), self.addr.get_port()));
        info!("Node {} shut down", self.addr);
    }

    pub fn get_addr(&self) -> &PeerAddress {
        &self.addr
    }

    /// Snapshot of the known peer list.
    pub fn peers(&self) -> Vec<PeerAddress> {
        self.peers.list()
    }

    /// Shared handle to the peer registry.
    pub fn peers_handle(&self) -> Arc<Peers> {
        Arc::clone(&self.peers)
    }

    /// Shared handle to the chain store.
    pub fn chain(&self) -> Arc<Chain> {
        Arc::clone(&self.chain)
    }
}
