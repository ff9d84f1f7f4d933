//! Shared configuration for the TeamSpeak remote-control channel.
//!
//! Values are layered by [`ortho_config`]: built-in defaults, then an
//! optional `tsremote.toml` (or the file named by `--config-path`), then
//! `TSREMOTE_*` environment variables, and finally command-line flags.

mod defaults;
mod logging;

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LISTEN_HOST, DEFAULT_LISTEN_PORT, DEFAULT_LOG_FILTER, DEFAULT_MAX_LINE_BYTES,
    DEFAULT_POLL_INTERVAL_MS, default_listen_host, default_listen_port, default_log_filter,
    default_log_filter_string, default_log_format, default_max_line_bytes,
    default_poll_interval_ms,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved configuration for the control channel and its binary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "TSREMOTE")]
pub struct Config {
    /// Host name or address the listening socket binds to.
    #[serde(default = "defaults::default_listen_host")]
    #[ortho_config(default = defaults::default_listen_host())]
    pub listen_host: String,
    /// TCP port of the control channel. `0` asks the OS for an ephemeral port.
    #[serde(default = "defaults::default_listen_port")]
    #[ortho_config(default = defaults::default_listen_port())]
    pub listen_port: u16,
    /// Bounded readiness wait applied by every tick, in milliseconds.
    #[serde(default = "defaults::default_poll_interval_ms")]
    #[ortho_config(default = defaults::default_poll_interval_ms())]
    pub poll_interval_ms: u64,
    /// Longest unterminated input line kept in the read buffer.
    #[serde(default = "defaults::default_max_line_bytes")]
    #[ortho_config(default = defaults::default_max_line_bytes())]
    pub max_line_bytes: usize,
    /// `tracing` filter expression.
    #[serde(default = "defaults::default_log_filter_string")]
    #[ortho_config(default = defaults::default_log_filter_string())]
    pub log_filter: String,
    /// Output format of the log subscriber.
    #[serde(default = "defaults::default_log_format")]
    #[ortho_config(default = defaults::default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_host: default_listen_host(),
            listen_port: default_listen_port(),
            poll_interval_ms: default_poll_interval_ms(),
            max_line_bytes: default_max_line_bytes(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Host the control channel binds to.
    #[must_use]
    pub fn listen_host(&self) -> &str {
        &self.listen_host
    }

    /// Port the control channel binds to.
    #[must_use]
    pub fn listen_port(&self) -> u16 {
        self.listen_port
    }

    /// Bounded readiness wait as a [`Duration`].
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Longest unterminated input line kept in the read buffer.
    #[must_use]
    pub fn max_line_bytes(&self) -> usize {
        self.max_line_bytes
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
