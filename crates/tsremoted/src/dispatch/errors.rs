//! Failures surfaced to the client while dispatching a command.

use thiserror::Error;

use crate::command::{Command, WIRE_PREFIX};
use crate::host::ErrorCode;

/// Errors raised while handling a single command line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    /// The category segment names no known handler.
    #[error("{category} is not a supported category")]
    UnsupportedCategory { category: String, action: String },

    /// The category is known but the action is not.
    #[error("'{action}' is not a supported {category} action")]
    UnsupportedAction { category: String, action: String },

    /// Required arguments were missing or empty.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// The target id is neither given nor selected, or is not known.
    #[error("unknown connection ID")]
    UnknownConnection,

    /// The host capability returned a failure code.
    #[error("host call failed with {code}: {description}")]
    Host { code: ErrorCode, description: String },
}

impl CommandError {
    /// Creates an unsupported category error.
    pub fn unsupported_category(category: impl Into<String>, action: impl Into<String>) -> Self {
        Self::UnsupportedCategory {
            category: category.into(),
            action: action.into(),
        }
    }

    /// Creates an unsupported action error.
    pub fn unsupported_action(category: impl Into<String>, action: impl Into<String>) -> Self {
        Self::UnsupportedAction {
            category: category.into(),
            action: action.into(),
        }
    }

    /// Creates an invalid arguments error.
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            message: message.into(),
        }
    }

    /// Text of the response line reporting this error for `command`.
    #[must_use]
    pub fn response_line(&self, command: &Command<'_>) -> String {
        match self {
            Self::UnsupportedCategory { category, action } => {
                format!("{WIRE_PREFIX}.error: {action}: {category} is not a supported category")
            }
            Self::UnsupportedAction { category, action } => {
                format!("{WIRE_PREFIX}.error: {action}: not a supported {category} action")
            }
            Self::InvalidArguments { .. } | Self::Host { .. } => {
                format!("{} fail", command.word())
            }
            Self::UnknownConnection => format!("{} fail. Unknown connection ID", command.word()),
        }
    }
}
