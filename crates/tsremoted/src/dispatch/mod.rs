//! Routing of parsed command lines to host capabilities.
//!
//! The dispatcher receives one [`Command`](crate::command::Command) at a
//! time, routes it by category and action, and appends the outcome to the
//! channel's [`ResponseBuffer`](crate::transport::ResponseBuffer):
//!
//! ```text
//! ts3.servers.connect voice.example.org default Alice
//! >ts3.servers.connect ok
//! >ts3.info New connection to server has ID 1
//! ```
//!
//! ## Categories
//!
//! | Category | Actions |
//! |---|---|
//! | `identifier` | `add`, `remove` (always unavailable) |
//! | `servers` | `connect`, `disconnect`, `list`, `select` |
//! | `messaging` | `send` |
//! | `help` | any |
//!
//! Failures never close the connection. They are rendered as a single
//! response line by [`CommandError::response_line`].

mod errors;
mod identifier;
mod messaging;
mod router;
mod servers;
#[cfg(test)]
mod tests;

pub use self::errors::CommandError;
pub use self::router::{Category, Dispatcher};
