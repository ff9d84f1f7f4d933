use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;
use thiserror::Error;
use tracing::info;

use super::PROCESS_TARGET;

/// Abstraction over shutdown notification mechanisms.
pub trait ShutdownSignal: Send + Sync {
    /// Whether shutdown should proceed. Never blocks.
    fn triggered(&self) -> bool;
}

/// Errors reported by shutdown signal listeners.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Installing signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Shutdown listener that latches the first termination signal.
pub struct SystemShutdownSignal {
    signals: Mutex<Signals>,
    received: AtomicBool,
}

impl SystemShutdownSignal {
    /// Registers handlers for SIGTERM, SIGINT, SIGQUIT and SIGHUP.
    pub fn install() -> Result<Self, ShutdownError> {
        let signals = Signals::new([SIGTERM, SIGINT, SIGQUIT, SIGHUP])
            .map_err(|source| ShutdownError::Install { source })?;
        Ok(Self {
            signals: Mutex::new(signals),
            received: AtomicBool::new(false),
        })
    }
}

impl ShutdownSignal for SystemShutdownSignal {
    fn triggered(&self) -> bool {
        if self.received.load(Ordering::Acquire) {
            return true;
        }
        let mut signals = self.signals.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(signal) = signals.pending().next() {
            info!(target: PROCESS_TARGET, signal, "shutdown signal received");
            self.received.store(true, Ordering::Release);
            return true;
        }
        false
    }
}
