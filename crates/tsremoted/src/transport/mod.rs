//! Socket plumbing for the control channel.
//!
//! The transport binds the single listening socket, waits for the one client
//! the protocol allows, and moves bytes between that client and the channel's
//! read and response buffers. Every wait is bounded by the configured poll
//! interval so a tick never blocks the host application for longer.

mod buffer;
mod client;
mod errors;
mod listener;

pub use self::buffer::{LINE_TERMINATOR, OUTPUT_MARKER, ReadBuffer, ResponseBuffer};
pub(crate) use self::client::{ClientConnection, ReadOutcome};
pub use self::errors::ListenerError;
pub(crate) use self::listener::{bind_tcp, poll_accept};

const TRANSPORT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
