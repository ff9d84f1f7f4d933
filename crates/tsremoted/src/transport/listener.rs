//! Listening socket setup and bounded accept polling.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use super::{ListenerError, TRANSPORT_TARGET};

const ACCEPT_BACKOFF: Duration = Duration::from_millis(25);

/// Binds a non-blocking TCP listener for the control channel.
pub(crate) fn bind_tcp(host: &str, port: u16) -> Result<TcpListener, ListenerError> {
    let mut addrs = (host, port)
        .to_socket_addrs()
        .map_err(|source| ListenerError::Resolve {
            host: host.to_string(),
            port,
            source,
        })?;
    let addr = addrs
        .find(|addr| matches!(addr, SocketAddr::V4(_) | SocketAddr::V6(_)))
        .ok_or_else(|| ListenerError::ResolveEmpty {
            host: host.to_string(),
            port,
        })?;
    let listener =
        TcpListener::bind(addr).map_err(|source| ListenerError::BindTcp { addr, source })?;
    listener
        .set_nonblocking(true)
        .map_err(|source| ListenerError::NonBlocking { source })?;
    debug!(target: TRANSPORT_TARGET, %addr, "listening socket bound");
    Ok(listener)
}

/// Waits up to `wait` for one incoming connection.
///
/// Returns `Ok(None)` when the wait elapses without a client.
pub(crate) fn poll_accept(
    listener: &TcpListener,
    wait: Duration,
) -> io::Result<Option<(TcpStream, SocketAddr)>> {
    let deadline = Instant::now() + wait;
    loop {
        match listener.accept() {
            Ok(accepted) => return Ok(Some(accepted)),
            Err(error)
                if error.kind() == io::ErrorKind::WouldBlock
                    || error.kind() == io::ErrorKind::Interrupted =>
            {
                let now = Instant::now();
                if now >= deadline {
                    return Ok(None);
                }
                thread::sleep(ACCEPT_BACKOFF.min(deadline - now));
            }
            Err(error) => return Err(error),
        }
    }
}
