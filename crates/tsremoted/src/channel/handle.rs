//! Thread-safe entry points into a running control channel.

use std::sync::mpsc::Sender;

use tracing::debug;

use crate::command::WIRE_PREFIX;
use crate::host::ConnectionId;
use crate::registry::ConnectionRegistry;

use super::{CHANNEL_TARGET, PendingEvent};

/// Message drained by the channel at the start of every tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ChannelMessage {
    /// Lifecycle request.
    Event(PendingEvent),
    /// Informational line for the connected client.
    Notice(String),
}

/// Cloneable handle for lifecycle requests and host notifications.
///
/// Every method returns immediately without touching sockets; the work is
/// picked up by the next [`tick`](super::ControlChannel::tick). Host
/// lifecycle notifications update the shared registry at once and queue a
/// notice line for the client.
#[derive(Debug, Clone)]
pub struct ChannelHandle {
    sender: Sender<ChannelMessage>,
    registry: ConnectionRegistry,
}

impl ChannelHandle {
    pub(crate) fn new(sender: Sender<ChannelMessage>, registry: ConnectionRegistry) -> Self {
        Self { sender, registry }
    }

    /// Queues a request to start listening.
    pub fn request_listen(&self) {
        self.post(ChannelMessage::Event(PendingEvent::Listen));
    }

    /// Queues a request to close every socket and return to idle.
    pub fn request_close(&self) {
        self.post(ChannelMessage::Event(PendingEvent::Close));
    }

    /// Queues the terminal shutdown request.
    pub fn request_shutdown(&self) {
        self.post(ChannelMessage::Event(PendingEvent::Shutdown));
    }

    /// The host started opening connection `id`.
    pub fn notify_connecting(&self, id: ConnectionId) {
        self.registry.notify_connecting(id);
        self.notice(format!("Server {id} connecting"));
    }

    /// The host finished opening connection `id`.
    pub fn notify_established(&self, id: ConnectionId) {
        self.registry.notify_established(id);
        self.notice(format!("Server {id} connected"));
    }

    /// The host destroyed connection `id`. Unknown ids are ignored by the
    /// registry but still announced.
    pub fn notify_closed(&self, id: ConnectionId) {
        self.registry.notify_closed(id);
        self.notice(format!("Server {id} disconnected"));
    }

    /// A channel text message arrived on connection `id`.
    pub fn notify_channel_message(&self, id: ConnectionId, from: &str, text: &str) {
        self.notice(format!("Channel message on {id} from {from}: {text}"));
    }

    /// A private text message arrived on connection `id`.
    pub fn notify_private_message(&self, id: ConnectionId, from: &str, text: &str) {
        self.notice(format!("Private message on {id} from {from}: {text}"));
    }

    /// Another client poked us on connection `id`.
    pub fn notify_poke(&self, id: ConnectionId, from: &str, text: &str) {
        self.notice(format!("Poke on {id} from {from}: {text}"));
    }

    /// Registry shared with the channel's dispatcher.
    #[must_use]
    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    fn notice(&self, text: String) {
        self.post(ChannelMessage::Notice(format!("{WIRE_PREFIX}.info {text}")));
    }

    fn post(&self, message: ChannelMessage) {
        if self.sender.send(message).is_err() {
            debug!(target: CHANNEL_TARGET, "control channel dropped; message discarded");
        }
    }
}
