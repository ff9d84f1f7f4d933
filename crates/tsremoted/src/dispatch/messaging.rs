//! `messaging` category: text to the selected connection's channel.

use crate::command::Command;
use crate::host::HostApi;
use crate::transport::ResponseBuffer;

use super::errors::CommandError;
use super::router::{Dispatcher, acknowledge};

impl<H> Dispatcher<H>
where
    H: HostApi,
{
    pub(super) fn route_messaging(
        &self,
        command: &Command<'_>,
        out: &mut ResponseBuffer,
    ) -> Result<(), CommandError> {
        match command.action() {
            "send" => self.send(command, out),
            action => Err(CommandError::unsupported_action("messaging", action)),
        }
    }

    fn send(&self, command: &Command<'_>, out: &mut ResponseBuffer) -> Result<(), CommandError> {
        let text = command.rest_after(0);
        if text.trim().is_empty() {
            return Err(CommandError::invalid_arguments("message text is empty"));
        }
        let target = self
            .registry
            .active_id()
            .ok_or_else(|| CommandError::invalid_arguments("no connection selected"))?;
        self.evaluate(self.host.send_channel_message(target, text))?;
        acknowledge(command, out);
        Ok(())
    }
}
