//! Crate-level test suites for the control channel.

pub(crate) mod support;
