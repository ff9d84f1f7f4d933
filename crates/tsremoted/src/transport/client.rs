//! The single accepted control client.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use super::{ReadBuffer, ResponseBuffer};

const READ_CHUNK_BYTES: usize = 4096;

/// Result of one bounded read attempt.
#[derive(Debug)]
pub(crate) enum ReadOutcome {
    /// Bytes were appended to the read buffer.
    Data(usize),
    /// Nothing arrived within the wait.
    Idle,
    /// The peer closed its side of the connection.
    Closed,
    /// The socket reported an error; the connection is unusable.
    Failed(io::Error),
}

/// Accepted client socket with bounded read and write waits.
#[derive(Debug)]
pub(crate) struct ClientConnection {
    stream: TcpStream,
    peer: SocketAddr,
}

impl ClientConnection {
    /// Wraps an accepted stream, bounding every blocking call by `wait`.
    pub(crate) fn new(stream: TcpStream, peer: SocketAddr, wait: Duration) -> io::Result<Self> {
        // Accepted sockets inherit the listener's non-blocking flag on some
        // platforms; timeouts only apply in blocking mode.
        stream.set_nonblocking(false)?;
        let wait = wait.max(Duration::from_millis(1));
        stream.set_read_timeout(Some(wait))?;
        stream.set_write_timeout(Some(wait))?;
        stream.set_nodelay(true)?;
        Ok(Self { stream, peer })
    }

    pub(crate) fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Reads whatever the client has sent, waiting at most the read timeout.
    pub(crate) fn read_available(&mut self, buffer: &mut ReadBuffer) -> ReadOutcome {
        let mut chunk = [0_u8; READ_CHUNK_BYTES];
        match self.stream.read(&mut chunk) {
            Ok(0) => ReadOutcome::Closed,
            Ok(count) => {
                buffer.extend(&chunk[..count]);
                ReadOutcome::Data(count)
            }
            Err(error) if is_transient(&error) => ReadOutcome::Idle,
            Err(error) => ReadOutcome::Failed(error),
        }
    }

    /// Writes as much pending output as the socket accepts.
    ///
    /// Returns the number of bytes handed to the socket; a full send buffer
    /// is not an error and simply leaves the rest queued.
    pub(crate) fn write_pending(&mut self, buffer: &mut ResponseBuffer) -> io::Result<usize> {
        if buffer.is_empty() {
            return Ok(0);
        }
        match self.stream.write(buffer.pending()) {
            Ok(0) => Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "client socket accepted no bytes",
            )),
            Ok(count) => {
                buffer.consume(count);
                Ok(count)
            }
            Err(error) if is_transient(&error) => Ok(0),
            Err(error) => Err(error),
        }
    }
}

fn is_transient(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
    )
}
