//! Control-channel bootstrap orchestration.

use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use thiserror::Error;

use tsremote_config::Config;

use crate::channel::{ChannelSettings, ControlChannel};
use crate::health::ChannelReporter;
use crate::host::HostApi;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the configuration.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader that hands out a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps `config`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
}

/// Result of a successful bootstrap: a configured, idle channel.
pub struct Bootstrapped<H> {
    config: Config,
    channel: ControlChannel<H>,
    telemetry: TelemetryHandle,
}

impl<H> Bootstrapped<H> {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Accessor for the telemetry handle.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Splits off the channel for the caller's run loop.
    #[must_use]
    pub fn into_channel(self) -> ControlChannel<H> {
        self.channel
    }
}

/// Loads configuration, installs telemetry and builds an idle channel
/// around `host`.
pub fn bootstrap_with<H>(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn ChannelReporter>,
    host: H,
) -> Result<Bootstrapped<H>, BootstrapError>
where
    H: HostApi,
{
    let config = loader
        .load()
        .map_err(|source| BootstrapError::Configuration { source })?;
    let telemetry =
        telemetry::initialise(&config).map_err(|source| BootstrapError::Telemetry { source })?;

    let settings = ChannelSettings::from_config(&config);
    tracing::info!(
        target: concat!(env!("CARGO_PKG_NAME"), "::bootstrap"),
        listen_host = %settings.listen_host,
        listen_port = settings.listen_port,
        poll_interval_ms = settings.poll_interval.as_millis(),
        log_format = ?config.log_format(),
        "control channel configured"
    );
    let channel = ControlChannel::with_reporter(settings, host, reporter);

    Ok(Bootstrapped {
        config,
        channel,
        telemetry,
    })
}
