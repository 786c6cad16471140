use crate::error::{NodeError, Result};
use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Resolve `host:port` to a socket address, treating resolution failure
/// the same as an unreachable peer.
fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    (host, port)
        .to_socket_addrs()
        .map_err(|e| NodeError::Network(format!("Failed to resolve {host}:{port}: {e}")))?
        .next()
        .ok_or_else(|| NodeError::Network(format!("No address found for {host}:{port}")))
}

/// One request/response exchange with a peer: connect, write the
/// command line, half-close the write side, read the full response.
///
/// Every failure mode (connect, timeout, premature close) is a
/// `Network` error; callers treat it as "peer unreachable" and never
/// let it poison their own request handling.
pub fn query(command: &[u8], host: &str, port: u16, timeout: Duration) -> Result<Vec<u8>> {
    let addr = resolve(host, port)?;

    let mut stream = TcpStream::connect_timeout(&addr, timeout)
        .map_err(|e| NodeError::Network(format!("Failed to connect to {addr}: {e}")))?;
    stream
        .set_write_timeout(Some(timeout))
        .map_err(|e| NodeError::Network(format!("Failed to set write timeout: {e}")))?;
    stream
        .set_read_timeout(Some(timeout))
        .map_err(|e| NodeError::Network(format!("Failed to set read timeout: {e}")))?;

    stream
        .write_all(command)
        .map_err(|e| NodeError::Network(format!("Failed to send command to {addr}: {e}")))?;
    // Half-close signals end-of-command to the remote reader.
    stream
        .shutdown(Shutdown::Write)
        .map_err(|e| NodeError::Network(format!("Failed to half-close to {addr}: {e}")))?;

    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .map_err(|e| NodeError::Network(format!("Failed to read response from {addr}: {e}")))?;
    Ok(response)
}
