//! Structured reporting of control-channel lifecycle events.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::channel::{DisconnectReason, InterfaceState};
use crate::transport::ListenerError;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface channel lifecycle events to telemetry sinks.
pub trait ChannelReporter: Send + Sync {
    /// Invoked after the channel enters `state`.
    fn state_entered(&self, state: InterfaceState);

    /// Invoked before the channel leaves `state`.
    fn state_exited(&self, state: InterfaceState);

    /// Invoked when a listen request cannot bind; the channel stays idle.
    fn bind_failed(&self, error: &ListenerError);

    /// Invoked when the single control client is accepted.
    fn client_accepted(&self, peer: SocketAddr);

    /// Invoked when accepting or configuring a client fails.
    fn accept_failed(&self, error: &io::Error);

    /// Invoked when the control client goes away.
    fn client_disconnected(&self, peer: SocketAddr, reason: &DisconnectReason);
}

impl<T> ChannelReporter for Arc<T>
where
    T: ChannelReporter + ?Sized,
{
    fn state_entered(&self, state: InterfaceState) {
        (**self).state_entered(state);
    }

    fn state_exited(&self, state: InterfaceState) {
        (**self).state_exited(state);
    }

    fn bind_failed(&self, error: &ListenerError) {
        (**self).bind_failed(error);
    }

    fn client_accepted(&self, peer: SocketAddr) {
        (**self).client_accepted(peer);
    }

    fn accept_failed(&self, error: &io::Error) {
        (**self).accept_failed(error);
    }

    fn client_disconnected(&self, peer: SocketAddr, reason: &DisconnectReason) {
        (**self).client_disconnected(peer, reason);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredChannelReporter;

impl StructuredChannelReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ChannelReporter for StructuredChannelReporter {
    fn state_entered(&self, state: InterfaceState) {
        tracing::debug!(
            target: HEALTH_TARGET,
            event = "state_entered",
            state = %state,
            "entering channel state"
        );
    }

    fn state_exited(&self, state: InterfaceState) {
        tracing::debug!(
            target: HEALTH_TARGET,
            event = "state_exited",
            state = %state,
            "exiting channel state"
        );
    }

    fn bind_failed(&self, error: &ListenerError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bind_failed",
            error = %error,
            "control channel could not listen"
        );
    }

    fn client_accepted(&self, peer: SocketAddr) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "client_accepted",
            peer = %peer,
            "control client connected"
        );
    }

    fn accept_failed(&self, error: &io::Error) {
        tracing::warn!(
            target: HEALTH_TARGET,
            event = "accept_failed",
            error = %error,
            "failed to accept control client"
        );
    }

    fn client_disconnected(&self, peer: SocketAddr, reason: &DisconnectReason) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "client_disconnected",
            peer = %peer,
            reason = %reason,
            "control client disconnected"
        );
    }
}
