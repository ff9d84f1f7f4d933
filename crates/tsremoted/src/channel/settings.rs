//! Engine-side view of the configuration.

use std::time::Duration;

use tsremote_config::{
    Config, DEFAULT_LISTEN_HOST, DEFAULT_LISTEN_PORT, DEFAULT_MAX_LINE_BYTES,
    DEFAULT_POLL_INTERVAL_MS,
};

/// Socket and buffering parameters for one [`ControlChannel`](super::ControlChannel).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSettings {
    /// Host name or address to bind.
    pub listen_host: String,
    /// Port to bind; `0` picks an ephemeral port.
    pub listen_port: u16,
    /// Upper bound on every readiness wait inside a tick.
    pub poll_interval: Duration,
    /// Longest unterminated input line kept before it is discarded.
    pub max_line_bytes: usize,
}

impl ChannelSettings {
    /// Extracts the channel parameters from a loaded configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            listen_host: config.listen_host().to_owned(),
            listen_port: config.listen_port(),
            poll_interval: config.poll_interval(),
            max_line_bytes: config.max_line_bytes(),
        }
    }

    /// Settings for an ephemeral loopback listener with a short poll interval.
    #[must_use]
    pub fn loopback(poll_interval: Duration) -> Self {
        Self {
            listen_host: String::from("127.0.0.1"),
            listen_port: 0,
            poll_interval,
            ..Self::default()
        }
    }
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            listen_host: DEFAULT_LISTEN_HOST.to_owned(),
            listen_port: DEFAULT_LISTEN_PORT,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }
}
