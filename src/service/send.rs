use tracing::{debug, error};

use super::{ChatService, SendRequest, SenderPolicy};
use crate::{error::ChatError, identity::canonicalize};

impl ChatService {
    /// Validate `req` and append it to its room.
    ///
    /// Nothing is appended unless every check passes.
    pub async fn send(&self, req: SendRequest) -> Result<(), ChatError> {
        let SendRequest { chat, sender, text } = req;

        let room = canonicalize(&chat).inspect_err(|err| debug!("send rejected: {err}"))?;

        if sender.is_empty() {
            debug!(chat = %room, "send rejected: empty sender");
            return Err(ChatError::EmptySender);
        }

        if self.sender_policy == SenderPolicy::Participant && !room.has_participant(&sender) {
            debug!(chat = %room, %sender, "send rejected: sender not in chat");
            return Err(ChatError::SenderNotInChat {
                sender,
                chat: room.to_string(),
            });
        }

        let send_time = self
            .store
            .append(&room, &sender, &text)
            .await
            .inspect_err(|err| error!(chat = %room, "append failed: {err}"))?;

        debug!(chat = %room, %sender, send_time, "message appended");
        Ok(())
    }
}
