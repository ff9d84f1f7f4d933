//! Harness shared by the channel suites: a recording reporter, a scripted
//! telnet client and a channel wired to a [`SimulatedHost`].

use std::ffi::OsString;
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ortho_config::{OrthoConfig, OrthoError};
use tsremote_config::Config;

use crate::bootstrap::ConfigLoader;
use crate::channel::{ChannelSettings, ControlChannel, DisconnectReason, InterfaceState};
use crate::health::ChannelReporter;
use crate::host::SimulatedHost;
use crate::transport::ListenerError;

/// Poll interval used by every socket-backed test.
pub const TEST_POLL: Duration = Duration::from_millis(20);

const MAX_TICKS: usize = 200;
const CLIENT_READ_TIMEOUT: Duration = Duration::from_millis(5);

/// Lifecycle events captured by [`RecordingChannelReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Entered(InterfaceState),
    Exited(InterfaceState),
    BindFailed,
    ClientAccepted,
    AcceptFailed,
    ClientDisconnected(String),
}

/// Records channel events for assertions.
#[derive(Debug, Default)]
pub struct RecordingChannelReporter {
    events: Mutex<Vec<ChannelEvent>>,
}

impl RecordingChannelReporter {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<ChannelEvent> {
        self.events
            .lock()
            .expect("channel reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: ChannelEvent) {
        self.events
            .lock()
            .expect("channel reporter mutex poisoned")
            .push(event);
    }
}

impl ChannelReporter for RecordingChannelReporter {
    fn state_entered(&self, state: InterfaceState) {
        self.record(ChannelEvent::Entered(state));
    }

    fn state_exited(&self, state: InterfaceState) {
        self.record(ChannelEvent::Exited(state));
    }

    fn bind_failed(&self, _error: &ListenerError) {
        self.record(ChannelEvent::BindFailed);
    }

    fn client_accepted(&self, _peer: SocketAddr) {
        self.record(ChannelEvent::ClientAccepted);
    }

    fn accept_failed(&self, _error: &io::Error) {
        self.record(ChannelEvent::AcceptFailed);
    }

    fn client_disconnected(&self, _peer: SocketAddr, reason: &DisconnectReason) {
        self.record(ChannelEvent::ClientDisconnected(reason.to_string()));
    }
}

/// Telnet-style client collecting `>`-framed response lines.
pub struct TestClient {
    stream: TcpStream,
    pending: Vec<u8>,
    closed: bool,
}

impl TestClient {
    /// Connects to `addr` with a short read timeout.
    pub fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).expect("connect to control channel");
        stream
            .set_read_timeout(Some(CLIENT_READ_TIMEOUT))
            .expect("set client read timeout");
        Self {
            stream,
            pending: Vec::new(),
            closed: false,
        }
    }

    /// Sends raw bytes.
    pub fn send(&mut self, bytes: &[u8]) {
        self.stream.write_all(bytes).expect("write to control channel");
        self.stream.flush().expect("flush control channel");
    }

    /// Reads whatever arrived and returns the complete lines, framing intact
    /// apart from the terminator.
    pub fn read_lines(&mut self) -> Vec<String> {
        let mut chunk = [0_u8; 1024];
        loop {
            match self.stream.read(&mut chunk) {
                Ok(0) => {
                    self.closed = true;
                    break;
                }
                Ok(count) => self.pending.extend_from_slice(&chunk[..count]),
                Err(error)
                    if matches!(
                        error.kind(),
                        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                    ) =>
                {
                    break;
                }
                Err(_) => {
                    self.closed = true;
                    break;
                }
            }
        }
        let mut lines = Vec::new();
        while let Some(end) = self.pending.windows(2).position(|pair| pair == b"\r\n") {
            let line: Vec<u8> = self.pending.drain(..end + 2).take(end).collect();
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }

    /// Whether the channel closed the connection.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Control channel over a [`SimulatedHost`] plus one scripted client.
pub struct ChannelHarness {
    pub host: Arc<SimulatedHost>,
    pub channel: ControlChannel<Arc<SimulatedHost>>,
    pub reporter: Arc<RecordingChannelReporter>,
    client: Option<TestClient>,
    received: Vec<String>,
}

impl ChannelHarness {
    /// Idle channel on an ephemeral loopback port.
    pub fn new() -> Self {
        Self::with_settings(ChannelSettings::loopback(TEST_POLL))
    }

    /// Idle channel with explicit settings.
    pub fn with_settings(settings: ChannelSettings) -> Self {
        let host = Arc::new(SimulatedHost::new());
        let reporter = Arc::new(RecordingChannelReporter::default());
        let channel = ControlChannel::with_reporter(settings, Arc::clone(&host), reporter.clone());
        host.attach(channel.handle());
        Self {
            host,
            channel,
            reporter,
            client: None,
            received: Vec::new(),
        }
    }

    /// Ticks until `state` is reached, returning whether it was.
    pub fn tick_until(&mut self, state: InterfaceState) -> bool {
        for _ in 0..MAX_TICKS {
            if self.channel.state() == state {
                return true;
            }
            self.tick();
        }
        self.channel.state() == state
    }

    /// One tick followed by a read on the client side.
    pub fn tick(&mut self) {
        self.channel.tick();
        if let Some(client) = self.client.as_mut() {
            self.received.extend(client.read_lines());
        }
    }

    /// Requests listening and runs the tick that binds.
    pub fn listen(&mut self) {
        self.channel.request_listen();
        self.channel.tick();
        assert_eq!(self.channel.state(), InterfaceState::Listening);
    }

    /// Connects the scripted client and ticks until it is accepted.
    ///
    /// Lines received by an earlier client are forgotten.
    pub fn open_client(&mut self) {
        let addr = self.channel.local_addr().expect("listening address");
        self.received.clear();
        self.client = Some(TestClient::connect(addr));
        assert!(self.tick_until(InterfaceState::Connected), "client not accepted");
    }

    /// Connects the scripted client and consumes the welcome line.
    pub fn connect_client(&mut self) {
        self.open_client();
        let welcome = self.await_lines(1);
        assert_eq!(
            welcome.first().map(String::as_str),
            Some(format!(">{}", crate::WELCOME_LINE).as_str()),
            "new session must open with the welcome line"
        );
        self.received.remove(0);
    }

    /// Drops the scripted client's socket.
    pub fn drop_client(&mut self) {
        self.client = None;
    }

    /// Sends raw bytes from the client.
    pub fn send(&mut self, bytes: &[u8]) {
        self.client
            .as_mut()
            .expect("client connected")
            .send(bytes);
    }

    /// Sends one `\r\n`-terminated line from the client.
    pub fn send_line(&mut self, line: &str) {
        self.send(format!("{line}\r\n").as_bytes());
    }

    /// Ticks until at least `count` lines arrived, returning them all.
    pub fn await_lines(&mut self, count: usize) -> Vec<String> {
        for _ in 0..MAX_TICKS {
            if self.received.len() >= count {
                break;
            }
            self.tick();
        }
        self.received.clone()
    }

    /// Ticks `count` times, collecting anything that arrives.
    pub fn pump(&mut self, count: usize) -> Vec<String> {
        for _ in 0..count {
            self.tick();
        }
        self.received.clone()
    }

    /// Received lines with the output marker removed.
    #[must_use]
    pub fn texts(&self) -> Vec<String> {
        self.received
            .iter()
            .map(|line| line.strip_prefix('>').unwrap_or(line).to_owned())
            .collect()
    }

    /// Forgets everything received so far.
    pub fn clear_received(&mut self) {
        self.received.clear();
    }

    /// Whether the channel closed the client's connection.
    #[must_use]
    pub fn client_closed(&self) -> bool {
        self.client.as_ref().is_some_and(TestClient::is_closed)
    }
}

impl Default for ChannelHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Loader that fails by passing a malformed port on the command line.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("tsremoted"),
            OsString::from("--listen-port"),
            OsString::from("not-a-port"),
        ];
        Config::load_from_iter(args)
    }
}
