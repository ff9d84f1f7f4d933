//! In-memory host used by the `tsremoted` binary and behaviour tests.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::channel::ChannelHandle;

use super::{ConnectRequest, ConnectionId, ErrorCode, HostApi, HostResult};

/// Raised for ids the simulated host does not know.
pub const INVALID_CONNECTION: ErrorCode = ErrorCode::new(0x0200);
/// Raised by `connect` for an address the simulated host refuses.
pub const CONNECTION_REFUSED: ErrorCode = ErrorCode::new(0x0401);

/// Address `connect` always refuses, for exercising host failures by hand.
pub const UNREACHABLE_HOST: &str = "unreachable.invalid";

#[derive(Debug, Clone)]
struct SimulatedConnection {
    host: String,
    nickname: String,
}

#[derive(Debug, Default)]
struct SimulatedState {
    next_id: u64,
    connections: BTreeMap<ConnectionId, SimulatedConnection>,
    sent: Vec<(ConnectionId, String)>,
}

/// Host that keeps its connections in memory.
///
/// Connections open and close instantly. Once a [`ChannelHandle`] is
/// attached, every open and close is announced to the channel as the real
/// host would.
#[derive(Debug, Default)]
pub struct SimulatedHost {
    state: Mutex<SimulatedState>,
    observer: Mutex<Option<ChannelHandle>>,
}

impl SimulatedHost {
    /// Creates a host with no connections.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes lifecycle notifications to `handle`.
    pub fn attach(&self, handle: ChannelHandle) {
        *lock(&self.observer) = Some(handle);
    }

    /// Messages accepted by `send_channel_message`, oldest first.
    #[must_use]
    pub fn sent_messages(&self) -> Vec<(ConnectionId, String)> {
        lock(&self.state).sent.clone()
    }

    /// Nickname used to open connection `id`.
    #[must_use]
    pub fn nickname(&self, id: ConnectionId) -> Option<String> {
        lock(&self.state)
            .connections
            .get(&id)
            .map(|connection| connection.nickname.clone())
    }

    /// Drops connection `id` as if the server had closed it.
    pub fn drop_connection(&self, id: ConnectionId) -> bool {
        let removed = lock(&self.state).connections.remove(&id).is_some();
        if removed {
            self.announce(|handle| handle.notify_closed(id));
        }
        removed
    }

    /// Delivers a channel message from another user on connection `id`.
    pub fn receive_channel_message(&self, id: ConnectionId, from: &str, text: &str) {
        self.announce(|handle| handle.notify_channel_message(id, from, text));
    }

    fn announce(&self, notify: impl FnOnce(&ChannelHandle)) {
        let observer = lock(&self.observer).clone();
        if let Some(handle) = observer {
            notify(&handle);
        }
    }
}

impl HostApi for SimulatedHost {
    fn connect(&self, request: &ConnectRequest) -> HostResult<ConnectionId> {
        if request.host == UNREACHABLE_HOST {
            return Err(CONNECTION_REFUSED);
        }
        let id = {
            let mut state = lock(&self.state);
            state.next_id += 1;
            let id = ConnectionId::new(state.next_id);
            state.connections.insert(
                id,
                SimulatedConnection {
                    host: request.host.clone(),
                    nickname: request.nickname.clone(),
                },
            );
            id
        };
        self.announce(|handle| {
            handle.notify_connecting(id);
            handle.notify_established(id);
        });
        Ok(id)
    }

    fn disconnect(&self, id: ConnectionId) -> HostResult<()> {
        if self.drop_connection(id) {
            Ok(())
        } else {
            Err(INVALID_CONNECTION)
        }
    }

    fn list_known_ids(&self) -> HostResult<Vec<ConnectionId>> {
        Ok(lock(&self.state).connections.keys().copied().collect())
    }

    fn display_name(&self, id: ConnectionId) -> HostResult<String> {
        lock(&self.state)
            .connections
            .get(&id)
            .map(|connection| connection.host.clone())
            .ok_or(INVALID_CONNECTION)
    }

    fn send_channel_message(&self, id: ConnectionId, text: &str) -> HostResult<()> {
        let mut state = lock(&self.state);
        if !state.connections.contains_key(&id) {
            return Err(INVALID_CONNECTION);
        }
        state.sent.push((id, text.to_owned()));
        Ok(())
    }

    fn describe_error(&self, code: ErrorCode) -> String {
        match code {
            INVALID_CONNECTION => String::from("invalid server connection handler ID"),
            CONNECTION_REFUSED => String::from("failed to connect to server"),
            other => format!("unknown error {other}"),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
