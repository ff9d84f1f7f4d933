//! Signal-driven run loop used by the `tsremoted` binary.

mod errors;
mod shutdown;

use std::sync::Arc;
use std::thread;

use tracing::info;

use crate::bootstrap::{ConfigLoader, bootstrap_with};
use crate::channel::{ControlChannel, InterfaceState};
use crate::health::StructuredChannelReporter;
use crate::host::{HostApi, SimulatedHost};

pub use self::errors::ProcessError;
pub use self::shutdown::{ShutdownError, ShutdownSignal, SystemShutdownSignal};

pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");

/// Loads configuration, starts listening with a [`SimulatedHost`] and ticks
/// until a termination signal arrives.
pub fn run_daemon(loader: &dyn ConfigLoader) -> Result<(), ProcessError> {
    let host = Arc::new(SimulatedHost::new());
    let bootstrapped = bootstrap_with(
        loader,
        Arc::new(StructuredChannelReporter::new()),
        Arc::clone(&host),
    )?;
    let mut channel = bootstrapped.into_channel();
    host.attach(channel.handle());

    let signal = SystemShutdownSignal::install()?;
    run_until_shutdown(&mut channel, &signal)
}

/// Requests listening, then ticks `channel` until it reaches the terminal
/// state.
///
/// A pending shutdown signal is turned into a shutdown request before each
/// tick. The channel must start listening on the first tick; a bind failure
/// is returned rather than idling forever.
pub fn run_until_shutdown<H>(
    channel: &mut ControlChannel<H>,
    signal: &dyn ShutdownSignal,
) -> Result<(), ProcessError>
where
    H: HostApi,
{
    channel.request_listen();
    channel.tick();
    if channel.state() == InterfaceState::Idle {
        let settings = channel.settings();
        return Err(ProcessError::NotListening {
            host: settings.listen_host.clone(),
            port: settings.listen_port,
        });
    }
    if let Some(addr) = channel.local_addr() {
        info!(target: PROCESS_TARGET, %addr, "control channel listening");
    }

    let mut shutdown_requested = false;
    while !channel.is_shut_down() {
        if !shutdown_requested && signal.triggered() {
            channel.request_shutdown();
            shutdown_requested = true;
        }
        channel.tick();
        // Idle ticks do not wait on a socket.
        if channel.state() == InterfaceState::Idle {
            thread::sleep(channel.settings().poll_interval);
        }
    }
    info!(target: PROCESS_TARGET, "control channel shut down");
    Ok(())
}
