use crate::logging::LogFormat;

/// Address the control channel binds when none is configured.
pub const DEFAULT_LISTEN_HOST: &str = "127.0.0.1";

/// Classic telnet port used by the control channel.
pub const DEFAULT_LISTEN_PORT: u16 = 23;

/// Upper bound for a single readiness wait, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Longest unterminated input line the channel buffers.
pub const DEFAULT_MAX_LINE_BYTES: usize = 4096;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Owned listen host used where allocation is required (e.g. serde).
pub fn default_listen_host() -> String {
    DEFAULT_LISTEN_HOST.to_string()
}

/// Default control channel port.
pub fn default_listen_port() -> u16 {
    DEFAULT_LISTEN_PORT
}

/// Default bounded wait applied by each tick.
pub fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

/// Default line length guard.
pub fn default_max_line_bytes() -> usize {
    DEFAULT_MAX_LINE_BYTES
}

/// Default log filter expression used by the binaries.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// Default logging format for the binaries.
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}
