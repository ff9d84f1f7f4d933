//! Lifecycle records for the server connections the channel tracks.
//!
//! Records are created either by a successful `servers.connect` or implicitly
//! by a host notification for an unknown id, and are removed only when the
//! host reports the connection closed. The registry is the one structure
//! shared between the tick loop and host notification callbacks, so every
//! operation takes the lock on its own and never across a whole tick.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::host::ConnectionId;

const REGISTRY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::registry");

/// Progress of a managed connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LifecycleState {
    /// Known but not yet connecting.
    #[default]
    NotConnected,
    /// The host has started connecting.
    Connecting,
    /// The host reports the connection established.
    Connected,
}

impl LifecycleState {
    /// Canonical lower-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotConnected => "not_connected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Snapshot of one tracked connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedConnection {
    id: ConnectionId,
    hostname: String,
    state: LifecycleState,
}

impl ManagedConnection {
    fn new(id: ConnectionId, hostname: String) -> Self {
        Self {
            id,
            hostname,
            state: LifecycleState::NotConnected,
        }
    }

    /// Host-assigned identifier.
    #[must_use]
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Address the connection was opened against; empty when unknown.
    #[must_use]
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.state
    }
}

#[derive(Debug, Default)]
struct RegistryState {
    connections: HashMap<ConnectionId, ManagedConnection>,
    // Ids the host closed before the dispatcher recorded them.
    closed_unclaimed: HashSet<ConnectionId>,
    active: Option<ConnectionId>,
}

/// Shared, synchronised map of managed connections plus the active selection.
///
/// Cloning yields another handle to the same registry.
#[derive(Debug, Clone, Default)]
pub struct ConnectionRegistry {
    inner: Arc<Mutex<RegistryState>>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a connection opened by the dispatcher.
    ///
    /// When a host notification already created the record, only the
    /// hostname is filled in and the lifecycle state is kept. Returns `None`
    /// when the host reported the connection closed before it was recorded.
    pub fn create(&self, id: ConnectionId, hostname: &str) -> Option<ManagedConnection> {
        let mut state = self.lock();
        if state.closed_unclaimed.remove(&id) {
            debug!(target: REGISTRY_TARGET, %id, hostname, "connection closed before registration");
            return None;
        }
        let record = state
            .connections
            .entry(id)
            .or_insert_with(|| ManagedConnection::new(id, String::new()));
        if record.hostname.is_empty() {
            hostname.clone_into(&mut record.hostname);
        }
        debug!(target: REGISTRY_TARGET, %id, hostname, "connection registered");
        Some(record.clone())
    }

    /// Marks a connection as connecting, creating it when unknown.
    pub fn notify_connecting(&self, id: ConnectionId) {
        self.advance(id, LifecycleState::Connecting);
    }

    /// Marks a connection as established, creating it when unknown.
    pub fn notify_established(&self, id: ConnectionId) {
        self.advance(id, LifecycleState::Connected);
    }

    /// Removes a closed connection. Unknown ids are otherwise ignored.
    ///
    /// A close for a record the dispatcher has not claimed yet (unknown, or
    /// created only by notifications) is remembered so a `create` racing
    /// behind it does not resurrect the connection.
    pub fn notify_closed(&self, id: ConnectionId) -> Option<ManagedConnection> {
        let mut state = self.lock();
        let removed = state.connections.remove(&id);
        if removed.as_ref().is_none_or(|record| record.hostname.is_empty()) {
            state.closed_unclaimed.insert(id);
        }
        if removed.is_some() {
            debug!(target: REGISTRY_TARGET, %id, "connection released");
        }
        removed
    }

    /// Snapshot of a connection record.
    #[must_use]
    pub fn get(&self, id: ConnectionId) -> Option<ManagedConnection> {
        self.lock().connections.get(&id).cloned()
    }

    /// Returns `true` when the id is registered.
    #[must_use]
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.lock().connections.contains_key(&id)
    }

    /// Number of registered connections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().connections.len()
    }

    /// Returns `true` when no connection is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().connections.is_empty()
    }

    /// Default target for commands that omit an id.
    #[must_use]
    pub fn active_id(&self) -> Option<ConnectionId> {
        self.lock().active
    }

    /// Replaces the active selection.
    pub fn set_active(&self, id: ConnectionId) {
        self.lock().active = Some(id);
        debug!(target: REGISTRY_TARGET, %id, "active connection selected");
    }

    fn advance(&self, id: ConnectionId, next: LifecycleState) {
        let mut state = self.lock();
        state.closed_unclaimed.remove(&id);
        let record = state
            .connections
            .entry(id)
            .or_insert_with(|| ManagedConnection::new(id, String::new()));
        record.state = next;
        debug!(target: REGISTRY_TARGET, %id, state = %next, "connection state changed");
    }

    // Every operation leaves the map consistent before releasing the lock,
    // so a panic elsewhere cannot corrupt it.
    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
