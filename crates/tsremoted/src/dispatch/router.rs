//! Category routing for command dispatch.

use tracing::{debug, warn};

use crate::command::{Command, WIRE_PREFIX};
use crate::host::{HostApi, HostResult};
use crate::registry::ConnectionRegistry;
use crate::transport::ResponseBuffer;

use super::errors::CommandError;

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

const USAGE_HEADER: &str = "The TeamSpeak3 interface supports the following commands:";

const USAGE: &[&str] = &[
    "identifier.add",
    "identifier.remove",
    "servers.connect <host> <identity> <nickname> [captureProfile] [playbackProfile] [soundProfile] [password]",
    "servers.disconnect [id]",
    "servers.list",
    "servers.select [id]",
    "messaging.send <text>",
    "help",
];

/// Known command categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Identity management, which the host cannot provide.
    Identifier,
    /// Opening, closing, listing and selecting server connections.
    Servers,
    /// Text messages to the selected connection.
    Messaging,
    /// Usage listing.
    Help,
}

impl Category {
    /// Parses a category segment. Matching is exact.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::UnsupportedCategory` for anything else.
    pub fn parse(category: &str, action: &str) -> Result<Self, CommandError> {
        match category {
            "identifier" => Ok(Self::Identifier),
            "servers" => Ok(Self::Servers),
            "messaging" => Ok(Self::Messaging),
            "help" => Ok(Self::Help),
            _ => Err(CommandError::unsupported_category(category, action)),
        }
    }

    /// Returns the canonical string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identifier => "identifier",
            Self::Servers => "servers",
            Self::Messaging => "messaging",
            Self::Help => "help",
        }
    }
}

/// Routes command lines to handlers and records their responses.
#[derive(Debug)]
pub struct Dispatcher<H> {
    pub(super) host: H,
    pub(super) registry: ConnectionRegistry,
}

impl<H> Dispatcher<H>
where
    H: HostApi,
{
    /// Creates a dispatcher backed by `host` and sharing `registry`.
    pub fn new(host: H, registry: ConnectionRegistry) -> Self {
        Self { host, registry }
    }

    /// Registry the dispatcher records connections in.
    #[must_use]
    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// The host capabilities backing this dispatcher.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Parses and handles one input line.
    ///
    /// Returns `false` when the line lacks the wire prefix; such lines
    /// produce no response at all.
    pub fn dispatch_line(&self, line: &str, out: &mut ResponseBuffer) -> bool {
        let Some(command) = Command::parse(line) else {
            debug!(target: DISPATCH_TARGET, line, "ignoring line without {WIRE_PREFIX} prefix");
            return false;
        };
        self.dispatch(&command, out);
        true
    }

    /// Handles a parsed command, rendering any failure as a response line.
    pub fn dispatch(&self, command: &Command<'_>, out: &mut ResponseBuffer) {
        debug!(
            target: DISPATCH_TARGET,
            category = command.category(),
            action = command.action(),
            "dispatching command"
        );
        if let Err(error) = self.route(command, out) {
            debug!(target: DISPATCH_TARGET, command = command.word(), %error, "command failed");
            out.push_line(&error.response_line(command));
        }
    }

    fn route(&self, command: &Command<'_>, out: &mut ResponseBuffer) -> Result<(), CommandError> {
        match Category::parse(command.category(), command.action())? {
            Category::Identifier => self.route_identifier(command, out),
            Category::Servers => self.route_servers(command, out),
            Category::Messaging => self.route_messaging(command, out),
            Category::Help => {
                write_usage(out);
                Ok(())
            }
        }
    }

    /// Maps a host result, logging the host's description of a failure.
    pub(super) fn evaluate<T>(&self, result: HostResult<T>) -> Result<T, CommandError> {
        result.map_err(|code| {
            let description = self.host.describe_error(code);
            warn!(
                target: DISPATCH_TARGET,
                code = %code,
                description = %description,
                "host capability failed"
            );
            CommandError::Host { code, description }
        })
    }
}

pub(super) fn acknowledge(command: &Command<'_>, out: &mut ResponseBuffer) {
    out.push_line(&format!("{} ok", command.word()));
}

fn write_usage(out: &mut ResponseBuffer) {
    out.push_line(USAGE_HEADER);
    for entry in USAGE {
        out.push_line(&format!("{WIRE_PREFIX}.{entry}"));
    }
}
