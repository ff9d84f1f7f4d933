//! Errors surfaced while running the control-channel process.

use thiserror::Error;

use crate::bootstrap::BootstrapError;

use super::shutdown::ShutdownError;

/// Errors surfaced while launching or supervising the process.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Bootstrapping the channel failed.
    #[error("bootstrap failed: {source}")]
    Bootstrap {
        /// Underlying bootstrap error.
        #[source]
        source: BootstrapError,
    },
    /// Installing the shutdown signal listener failed.
    #[error("failed to install shutdown signal listener: {source}")]
    Shutdown {
        /// Underlying shutdown error.
        #[source]
        source: ShutdownError,
    },
    /// The first listen request did not bind.
    #[error("control channel could not listen on {host}:{port}")]
    NotListening {
        /// Configured listen host.
        host: String,
        /// Configured listen port.
        port: u16,
    },
}

impl From<BootstrapError> for ProcessError {
    fn from(source: BootstrapError) -> Self {
        Self::Bootstrap { source }
    }
}

impl From<ShutdownError> for ProcessError {
    fn from(source: ShutdownError) -> Self {
        Self::Shutdown { source }
    }
}
