//! Capabilities the surrounding voice-chat client lends to the channel.
//!
//! The control channel never talks to servers itself. Every command that
//! touches a connection goes through [`HostApi`], which the embedding
//! application implements on top of its own session API. Host calls report
//! failure as an [`ErrorCode`]; the dispatcher never interprets specific
//! codes and only logs the host's description of them.

mod simulated;

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;
use std::sync::Arc;

pub use self::simulated::SimulatedHost;

/// Capture profile used when `connect` omits one.
pub const DEFAULT_CAPTURE_PROFILE: &str = "Default";
/// Playback profile used when `connect` omits one.
pub const DEFAULT_PLAYBACK_PROFILE: &str = "Default";
/// Sound pack used when `connect` omits one.
pub const DEFAULT_SOUND_PROFILE: &str = "Default Sound Profile (Female)";

/// Host-assigned identifier of a server connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw identifier value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for ConnectionId {
    type Err = ParseIntError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        input.parse().map(Self)
    }
}

/// Failure code returned by a host capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode(u32);

impl ErrorCode {
    /// Wraps a raw host result code.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw code value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "0x{:04x}", self.0)
    }
}

/// Result of a host capability call.
pub type HostResult<T> = Result<T, ErrorCode>;

/// Parameters of a new server connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectRequest {
    /// Server address, optionally with a port.
    pub host: String,
    /// Identity to connect with.
    pub identity: String,
    /// Nickname shown to other users.
    pub nickname: String,
    /// Server password; empty when none was given.
    pub password: String,
    /// Capture device profile.
    pub capture_profile: String,
    /// Playback device profile.
    pub playback_profile: String,
    /// Sound pack profile.
    pub sound_profile: String,
}

/// Session operations provided by the host application.
pub trait HostApi: Send {
    /// Opens a new server connection and returns its identifier.
    fn connect(&self, request: &ConnectRequest) -> HostResult<ConnectionId>;

    /// Tears down an existing connection.
    fn disconnect(&self, id: ConnectionId) -> HostResult<()>;

    /// Enumerates every connection the host knows, in host order.
    fn list_known_ids(&self) -> HostResult<Vec<ConnectionId>>;

    /// Human-readable name of a connection, typically the server name.
    fn display_name(&self, id: ConnectionId) -> HostResult<String>;

    /// Sends text to the current channel of a connection.
    fn send_channel_message(&self, id: ConnectionId, text: &str) -> HostResult<()>;

    /// Describes a failure code for logging.
    fn describe_error(&self, code: ErrorCode) -> String;
}

impl<T> HostApi for Arc<T>
where
    T: HostApi + Sync + ?Sized,
{
    fn connect(&self, request: &ConnectRequest) -> HostResult<ConnectionId> {
        (**self).connect(request)
    }

    fn disconnect(&self, id: ConnectionId) -> HostResult<()> {
        (**self).disconnect(id)
    }

    fn list_known_ids(&self) -> HostResult<Vec<ConnectionId>> {
        (**self).list_known_ids()
    }

    fn display_name(&self, id: ConnectionId) -> HostResult<String> {
        (**self).display_name(id)
    }

    fn send_channel_message(&self, id: ConnectionId, text: &str) -> HostResult<()> {
        (**self).send_channel_message(id, text)
    }

    fn describe_error(&self, code: ErrorCode) -> String {
        (**self).describe_error(code)
    }
}
