//! Grammar of control channel input lines.
//!
//! Every line starts with a command word shaped
//! `<prefix>.<category>.<action>`, followed by whitespace-delimited
//! positional arguments:
//!
//! ```text
//! ts3.servers.connect voice.example.org default Alice
//! ts3.messaging.send hello everyone
//! ```
//!
//! Lines whose prefix is not [`WIRE_PREFIX`] belong to some other
//! conversation and are ignored without a response. Category and action are
//! not checked here; the dispatcher owns that decision.

mod parser;

pub use self::parser::{Arguments, Command, WIRE_PREFIX};
