//! Line-based remote control of a voice-chat client over TCP.
//!
//! One external client connects to a telnet-style port and drives the host
//! application with commands such as `ts3.servers.connect` or
//! `ts3.messaging.send`, receiving `>`-prefixed acknowledgements and
//! notices in return. The crate provides the engine behind that port:
//!
//! - [`ControlChannel`], the `Idle`/`Listening`/`Connected`/`ShuttingDown`
//!   state machine, driven by repeated [`ControlChannel::tick`] calls;
//! - [`Command`] parsing and the [`Dispatcher`] that routes commands to the
//!   host through the [`HostApi`] capability trait;
//! - the [`ConnectionRegistry`] of managed connections, kept in step with
//!   host lifecycle notifications delivered through a [`ChannelHandle`].
//!
//! Nothing here spawns threads. Every socket wait inside a tick is bounded by
//! the configured poll interval, so the owner of the loop is never blocked
//! for longer than that. Requests and notifications from other threads are
//! queued and applied at the start of the next tick.
//!
//! ```text
//! ts3.servers.connect voice.example.org default Alice
//! >ts3.servers.connect ok
//! >ts3.info New connection to server has ID 1
//! ts3.servers.list
//! >[*] 1:voice.example.org
//! ```
//!
//! The `tsremoted` binary wires the engine to an in-memory
//! [`SimulatedHost`] and runs it until a termination signal arrives.

mod bootstrap;
mod channel;
mod command;
mod dispatch;
mod health;
mod host;
mod process;
mod registry;
mod telemetry;
mod transport;

pub use bootstrap::{
    BootstrapError, Bootstrapped, ConfigLoader, StaticConfigLoader, SystemConfigLoader,
    bootstrap_with,
};
pub use channel::{
    ChannelHandle, ChannelSettings, ControlChannel, DisconnectReason, InterfaceState,
    PendingEvent, WELCOME_LINE,
};
pub use command::{Arguments, Command, WIRE_PREFIX};
pub use dispatch::{Category, CommandError, Dispatcher};
pub use health::{ChannelReporter, StructuredChannelReporter};
pub use host::{
    ConnectRequest, ConnectionId, DEFAULT_CAPTURE_PROFILE, DEFAULT_PLAYBACK_PROFILE,
    DEFAULT_SOUND_PROFILE, ErrorCode, HostApi, HostResult, SimulatedHost,
};
pub use process::{
    ProcessError, ShutdownError, ShutdownSignal, SystemShutdownSignal, run_daemon,
    run_until_shutdown,
};
pub use registry::{ConnectionRegistry, LifecycleState, ManagedConnection};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::{LINE_TERMINATOR, ListenerError, OUTPUT_MARKER, ReadBuffer, ResponseBuffer};

#[cfg(test)]
mod tests;
