//! The control-channel state machine.
//!
//! [`ControlChannel`] owns the listening socket, the single accepted client
//! and both byte buffers. It is driven by repeated calls to
//! [`ControlChannel::tick`] from one loop; each tick drains queued requests
//! and notices, then runs exactly one poll step for the current state:
//!
//! | State | Poll step |
//! |---|---|
//! | `Idle` | nothing |
//! | `Listening` | wait up to the poll interval for one client |
//! | `Connected` | flush output, read input, dispatch complete lines, flush again |
//! | `ShuttingDown` | nothing (terminal) |
//!
//! Other threads interact only through a [`ChannelHandle`], which queues
//! requests over a channel and never touches the sockets.

mod handle;
mod settings;
mod state;

use std::mem;
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};

use tracing::{debug, info};

use crate::command::WIRE_PREFIX;
use crate::dispatch::Dispatcher;
use crate::health::{ChannelReporter, StructuredChannelReporter};
use crate::host::HostApi;
use crate::registry::ConnectionRegistry;
use crate::transport::{
    ClientConnection, ReadBuffer, ReadOutcome, ResponseBuffer, bind_tcp, poll_accept,
};

pub use self::handle::ChannelHandle;
pub(crate) use self::handle::ChannelMessage;
pub use self::settings::ChannelSettings;
pub use self::state::{DisconnectReason, InterfaceState, PendingEvent};

pub(crate) const CHANNEL_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::channel");

/// Line queued for the client as soon as it connects.
pub const WELCOME_LINE: &str = "Welcome to the TeamSpeak 3 Client Telnet Interface";

/// State together with the sockets that state owns.
#[derive(Debug, Default)]
enum Phase {
    #[default]
    Idle,
    Listening {
        listener: TcpListener,
    },
    Connected {
        listener: TcpListener,
        client: ClientConnection,
    },
    ShuttingDown,
}

impl Phase {
    fn state(&self) -> InterfaceState {
        match self {
            Self::Idle => InterfaceState::Idle,
            Self::Listening { .. } => InterfaceState::Listening,
            Self::Connected { .. } => InterfaceState::Connected,
            Self::ShuttingDown => InterfaceState::ShuttingDown,
        }
    }

    fn listener(&self) -> Option<&TcpListener> {
        match self {
            Self::Listening { listener } | Self::Connected { listener, .. } => Some(listener),
            Self::Idle | Self::ShuttingDown => None,
        }
    }
}

/// Single-client line protocol endpoint driving a [`HostApi`].
pub struct ControlChannel<H> {
    settings: ChannelSettings,
    phase: Phase,
    dispatcher: Dispatcher<H>,
    handle: ChannelHandle,
    inbox: Receiver<ChannelMessage>,
    read_buffer: ReadBuffer,
    response_buffer: ResponseBuffer,
    reporter: Arc<dyn ChannelReporter>,
}

impl<H> ControlChannel<H>
where
    H: HostApi,
{
    /// Creates an idle channel that logs lifecycle events through `tracing`.
    pub fn new(settings: ChannelSettings, host: H) -> Self {
        Self::with_reporter(settings, host, Arc::new(StructuredChannelReporter::new()))
    }

    /// Creates an idle channel reporting lifecycle events to `reporter`.
    pub fn with_reporter(
        settings: ChannelSettings,
        host: H,
        reporter: Arc<dyn ChannelReporter>,
    ) -> Self {
        let registry = ConnectionRegistry::new();
        let (sender, inbox) = mpsc::channel();
        Self {
            settings,
            phase: Phase::Idle,
            dispatcher: Dispatcher::new(host, registry.clone()),
            handle: ChannelHandle::new(sender, registry),
            inbox,
            read_buffer: ReadBuffer::new(),
            response_buffer: ResponseBuffer::new(),
            reporter,
        }
    }

    /// Handle for requests and host notifications from other threads.
    #[must_use]
    pub fn handle(&self) -> ChannelHandle {
        self.handle.clone()
    }

    /// Registry of managed connections shared with the handle.
    #[must_use]
    pub fn registry(&self) -> &ConnectionRegistry {
        self.dispatcher.registry()
    }

    /// The host capabilities commands are routed to.
    #[must_use]
    pub fn host(&self) -> &H {
        self.dispatcher.host()
    }

    /// Parameters the channel was built with.
    #[must_use]
    pub fn settings(&self) -> &ChannelSettings {
        &self.settings
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> InterfaceState {
        self.phase.state()
    }

    /// Whether the terminal state has been reached.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.state().is_terminal()
    }

    /// Address of the listening socket while one is open.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.phase
            .listener()
            .and_then(|listener| listener.local_addr().ok())
    }

    /// Queues a request to start listening.
    pub fn request_listen(&self) {
        self.handle.request_listen();
    }

    /// Queues a request to close every socket and return to idle.
    pub fn request_close(&self) {
        self.handle.request_close();
    }

    /// Queues the terminal shutdown request.
    pub fn request_shutdown(&self) {
        self.handle.request_shutdown();
    }

    /// Runs one iteration of the cooperative loop.
    ///
    /// Drains every queued request and notice in arrival order, then performs
    /// the poll step of the resulting state. No wait inside a tick exceeds
    /// the configured poll interval.
    pub fn tick(&mut self) {
        self.process_messages();
        match self.phase {
            Phase::Listening { .. } => self.run_listening(),
            Phase::Connected { .. } => self.run_connected(),
            Phase::Idle | Phase::ShuttingDown => {}
        }
    }

    fn process_messages(&mut self) {
        while let Ok(message) = self.inbox.try_recv() {
            match message {
                ChannelMessage::Event(event) => self.handle_event(event),
                ChannelMessage::Notice(line) => self.queue_notice(line),
            }
        }
    }

    fn queue_notice(&mut self, line: String) {
        if matches!(self.phase, Phase::Connected { .. }) {
            self.response_buffer.push_line(&line);
        } else {
            debug!(target: CHANNEL_TARGET, line = %line, "no client connected; notice dropped");
        }
    }

    fn handle_event(&mut self, event: PendingEvent) {
        debug!(target: CHANNEL_TARGET, %event, state = %self.state(), "processing request");
        match event {
            PendingEvent::Listen => self.handle_listen(),
            PendingEvent::Close => self.handle_close(),
            PendingEvent::Shutdown => self.handle_shutdown(),
        }
    }

    fn handle_listen(&mut self) {
        if !matches!(self.phase, Phase::Idle) {
            info!(target: CHANNEL_TARGET, state = %self.state(), "listen ignored; not idle");
            return;
        }
        match bind_tcp(&self.settings.listen_host, self.settings.listen_port) {
            Ok(listener) => self.change_state(|_| Phase::Listening { listener }),
            Err(error) => self.reporter.bind_failed(&error),
        }
    }

    fn handle_close(&mut self) {
        match self.phase {
            Phase::Listening { .. } => self.change_state(|_| Phase::Idle),
            Phase::Connected { .. } => {
                self.report_disconnect(&DisconnectReason::Requested(PendingEvent::Close));
                self.change_state(|_| Phase::Idle);
            }
            Phase::Idle | Phase::ShuttingDown => {
                debug!(target: CHANNEL_TARGET, state = %self.state(), "close ignored");
            }
        }
    }

    fn handle_shutdown(&mut self) {
        match self.phase {
            Phase::ShuttingDown => {}
            Phase::Connected { .. } => {
                self.report_disconnect(&DisconnectReason::Requested(PendingEvent::Shutdown));
                self.change_state(|_| Phase::ShuttingDown);
            }
            Phase::Idle | Phase::Listening { .. } => self.change_state(|_| Phase::ShuttingDown),
        }
    }

    /// Replaces the phase, running exit and entry hooks when the state changes.
    ///
    /// Sockets the new phase does not carry over are closed when the old
    /// phase is dropped.
    fn change_state(&mut self, transition: impl FnOnce(Phase) -> Phase) {
        let previous = mem::take(&mut self.phase);
        let from = previous.state();
        let next = transition(previous);
        let to = next.state();
        debug_assert!(
            from.can_transition_to(to),
            "illegal channel transition {from} -> {to}"
        );
        self.on_exit(from);
        self.phase = next;
        self.on_enter(to);
    }

    fn on_exit(&mut self, state: InterfaceState) {
        if state == InterfaceState::Connected {
            self.read_buffer.clear();
            self.response_buffer.clear();
        }
        self.reporter.state_exited(state);
    }

    fn on_enter(&mut self, state: InterfaceState) {
        self.reporter.state_entered(state);
        if state == InterfaceState::Connected {
            self.response_buffer.push_line(WELCOME_LINE);
        }
    }

    fn run_listening(&mut self) {
        let Phase::Listening { listener } = &self.phase else {
            return;
        };
        let (stream, peer) = match poll_accept(listener, self.settings.poll_interval) {
            Ok(Some(accepted)) => accepted,
            Ok(None) => return,
            Err(error) => {
                self.reporter.accept_failed(&error);
                return;
            }
        };
        match ClientConnection::new(stream, peer, self.settings.poll_interval) {
            Ok(client) => {
                self.reporter.client_accepted(peer);
                self.change_state(|phase| match phase {
                    Phase::Listening { listener } => Phase::Connected { listener, client },
                    other => other,
                });
            }
            Err(error) => self.reporter.accept_failed(&error),
        }
    }

    fn run_connected(&mut self) {
        if let Err(reason) = self.exchange() {
            self.report_disconnect(&reason);
            self.change_state(|phase| match phase {
                Phase::Connected { listener, .. } => Phase::Listening { listener },
                other => other,
            });
        }
    }

    /// One bounded write/read/dispatch/write pass over the client socket.
    fn exchange(&mut self) -> Result<(), DisconnectReason> {
        self.flush()?;

        let Phase::Connected { client, .. } = &mut self.phase else {
            return Ok(());
        };
        match client.read_available(&mut self.read_buffer) {
            ReadOutcome::Data(count) => {
                debug!(target: CHANNEL_TARGET, bytes = count, "data received from client");
            }
            ReadOutcome::Idle => return Ok(()),
            ReadOutcome::Closed => return Err(DisconnectReason::PeerClosed),
            ReadOutcome::Failed(error) => return Err(DisconnectReason::ReadFailed(error)),
        }

        while let Some(line) = self.read_buffer.next_line() {
            self.dispatcher.dispatch_line(&line, &mut self.response_buffer);
        }
        self.enforce_line_limit();
        self.flush()
    }

    fn enforce_line_limit(&mut self) {
        let limit = self.settings.max_line_bytes;
        if !self.read_buffer.is_discarding() && self.read_buffer.unconsumed_len() > limit {
            debug!(
                target: CHANNEL_TARGET,
                buffered = self.read_buffer.unconsumed_len(),
                limit,
                "discarding overlong input line"
            );
            self.read_buffer.discard_partial_line();
            self.response_buffer
                .push_line(&format!("{WIRE_PREFIX}.error: line exceeds {limit} bytes"));
        }
    }

    fn flush(&mut self) -> Result<(), DisconnectReason> {
        let Phase::Connected { client, .. } = &mut self.phase else {
            return Ok(());
        };
        client
            .write_pending(&mut self.response_buffer)
            .map(|_| ())
            .map_err(DisconnectReason::WriteFailed)
    }

    fn report_disconnect(&self, reason: &DisconnectReason) {
        if let Phase::Connected { client, .. } = &self.phase {
            self.reporter.client_disconnected(client.peer(), reason);
        }
    }
}
