//! `servers` category: connection management.

use tracing::{info, warn};

use crate::command::{Command, WIRE_PREFIX};
use crate::host::{
    ConnectRequest, ConnectionId, DEFAULT_CAPTURE_PROFILE, DEFAULT_PLAYBACK_PROFILE,
    DEFAULT_SOUND_PROFILE, HostApi,
};
use crate::transport::ResponseBuffer;

use super::errors::CommandError;
use super::router::{DISPATCH_TARGET, Dispatcher, acknowledge};

const SELECTED_MARKER: &str = "[*]";
const UNSELECTED_MARKER: &str = "[ ]";

impl<H> Dispatcher<H>
where
    H: HostApi,
{
    pub(super) fn route_servers(
        &self,
        command: &Command<'_>,
        out: &mut ResponseBuffer,
    ) -> Result<(), CommandError> {
        match command.action() {
            "connect" => self.connect(command, out),
            "disconnect" => self.disconnect(command, out),
            "list" => self.list(out),
            "select" => self.select(command, out),
            action => Err(CommandError::unsupported_action("servers", action)),
        }
    }

    fn connect(&self, command: &Command<'_>, out: &mut ResponseBuffer) -> Result<(), CommandError> {
        let request = parse_connect_request(command)?;
        let id = self.evaluate(self.host.connect(&request))?;
        if self.registry.create(id, &request.host).is_none() {
            warn!(target: DISPATCH_TARGET, %id, "server connection closed before it was recorded");
        }
        self.registry.set_active(id);
        info!(target: DISPATCH_TARGET, %id, host = %request.host, "server connection opened");

        acknowledge(command, out);
        out.push_line(&format!(
            "{WIRE_PREFIX}.info New connection to server has ID {id}"
        ));
        Ok(())
    }

    fn disconnect(
        &self,
        command: &Command<'_>,
        out: &mut ResponseBuffer,
    ) -> Result<(), CommandError> {
        let id = self.resolve_target(command)?;
        if !self.registry.contains(id) {
            return Err(CommandError::UnknownConnection);
        }
        self.evaluate(self.host.disconnect(id))?;
        acknowledge(command, out);
        Ok(())
    }

    fn list(&self, out: &mut ResponseBuffer) -> Result<(), CommandError> {
        let ids = self.evaluate(self.host.list_known_ids())?;
        let active = self.registry.active_id();
        for id in ids {
            let name = match self.host.display_name(id) {
                Ok(name) => name,
                Err(code) => {
                    warn!(
                        target: DISPATCH_TARGET,
                        %id,
                        code = %code,
                        description = %self.host.describe_error(code),
                        "skipping connection without a readable name"
                    );
                    continue;
                }
            };
            let marker = if active == Some(id) {
                SELECTED_MARKER
            } else {
                UNSELECTED_MARKER
            };
            out.push_line(&format!("{marker} {id}:{name}"));
        }
        Ok(())
    }

    fn select(&self, command: &Command<'_>, out: &mut ResponseBuffer) -> Result<(), CommandError> {
        let id = self.resolve_target(command)?;
        let known = self
            .evaluate(self.host.list_known_ids())
            .map_err(|_| CommandError::UnknownConnection)?;
        if !known.contains(&id) {
            return Err(CommandError::UnknownConnection);
        }
        self.registry.set_active(id);
        acknowledge(command, out);
        Ok(())
    }

    /// Explicit id argument, or the active selection when omitted.
    fn resolve_target(&self, command: &Command<'_>) -> Result<ConnectionId, CommandError> {
        match command.args().next() {
            Some(raw) => raw
                .parse::<ConnectionId>()
                .map_err(|_| CommandError::UnknownConnection),
            None => self
                .registry
                .active_id()
                .ok_or(CommandError::UnknownConnection),
        }
    }
}

fn parse_connect_request(command: &Command<'_>) -> Result<ConnectRequest, CommandError> {
    let mut args = command.args();
    let host = required(args.next(), "host")?;
    let identity = required(args.next(), "identity")?;
    let nickname = required(args.next(), "nickname")?;
    let capture_profile = args.next().unwrap_or(DEFAULT_CAPTURE_PROFILE);
    let playback_profile = args.next().unwrap_or(DEFAULT_PLAYBACK_PROFILE);
    let sound_profile = args.next().unwrap_or(DEFAULT_SOUND_PROFILE);
    let password = args.next().unwrap_or_default();

    Ok(ConnectRequest {
        host: host.to_owned(),
        identity: identity.to_owned(),
        nickname: nickname.to_owned(),
        password: password.to_owned(),
        capture_profile: capture_profile.to_owned(),
        playback_profile: playback_profile.to_owned(),
        sound_profile: sound_profile.to_owned(),
    })
}

fn required<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, CommandError> {
    value
        .filter(|value| !value.is_empty())
        .ok_or_else(|| CommandError::invalid_arguments(format!("{name} is required")))
}
