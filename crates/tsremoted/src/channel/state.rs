//! Reporting view of the channel state machine and its queued requests.

use std::fmt;
use std::io;

/// Observable state of the control channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InterfaceState {
    /// No sockets are open.
    #[default]
    Idle,
    /// The listening socket waits for a client.
    Listening,
    /// One client is connected.
    Connected,
    /// Terminal state; all sockets are closed.
    ShuttingDown,
}

impl InterfaceState {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Listening => "listening",
            Self::Connected => "connected",
            Self::ShuttingDown => "shutting_down",
        }
    }

    /// Whether no further transition can leave this state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::ShuttingDown)
    }

    /// Whether the state machine has an edge from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Listening | Self::ShuttingDown)
                | (
                    Self::Listening,
                    Self::Connected | Self::Idle | Self::ShuttingDown
                )
                | (
                    Self::Connected,
                    Self::Listening | Self::Idle | Self::ShuttingDown
                )
        )
    }
}

impl fmt::Display for InterfaceState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Lifecycle request queued for the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingEvent {
    /// Bind the listening socket when idle.
    Listen,
    /// Close every socket and return to idle.
    Close,
    /// Close every socket and stop for good.
    Shutdown,
}

impl PendingEvent {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Listen => "listen",
            Self::Close => "close",
            Self::Shutdown => "shutdown",
        }
    }
}

impl fmt::Display for PendingEvent {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Why the connected client went away.
#[derive(Debug)]
pub enum DisconnectReason {
    /// The peer closed its side of the socket.
    PeerClosed,
    /// Reading from the socket failed.
    ReadFailed(io::Error),
    /// Writing to the socket failed.
    WriteFailed(io::Error),
    /// A close or shutdown request tore the connection down.
    Requested(PendingEvent),
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PeerClosed => formatter.write_str("peer closed the connection"),
            Self::ReadFailed(error) => write!(formatter, "read failed: {error}"),
            Self::WriteFailed(error) => write!(formatter, "write failed: {error}"),
            Self::Requested(event) => write!(formatter, "{event} requested"),
        }
    }
}
