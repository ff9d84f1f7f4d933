//! `identifier` category: identity management is outside the host API.

use crate::command::Command;
use crate::host::HostApi;
use crate::transport::ResponseBuffer;

use super::errors::CommandError;
use super::router::Dispatcher;

impl<H> Dispatcher<H>
where
    H: HostApi,
{
    pub(super) fn route_identifier(
        &self,
        command: &Command<'_>,
        out: &mut ResponseBuffer,
    ) -> Result<(), CommandError> {
        match command.action() {
            "add" | "remove" => {
                out.push_line(&format!(
                    "{} not available, as API does not support identity management",
                    command.word()
                ));
                Ok(())
            }
            action => Err(CommandError::unsupported_action("identifier", action)),
        }
    }
}
