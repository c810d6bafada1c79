//! Send and pull over two-party rooms.
//!
//! [`ChatService`] owns the injected [`MessageStore`] and is cloned into every
//! request. Both operations are single-shot and stateless.

mod pull;
mod send;

pub use pull::{Page, PageWindow};

use std::{str::FromStr, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
    error::{CODE_OK, ChatError},
    store::{Message, MessageStore},
};

/// Whether a sender has to be one of the two names in the chat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SenderPolicy {
    #[default]
    Participant,
    Any,
}

impl FromStr for SenderPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "participant" => Ok(Self::Participant),
            "any" => Ok(Self::Any),
            other => Err(format!("expected `participant` or `any`, got `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendRequest {
    pub chat: String,
    pub sender: String,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub chat: String,
    pub cursor: i64,
    pub limit: i32,
    pub reverse: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendResponse {
    pub code: i32,
    pub msg: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullResponse {
    pub code: i32,
    pub msg: String,
    pub messages: Vec<Message>,
    pub has_more: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<i64>,
}

#[derive(Clone)]
pub struct ChatService {
    store: Arc<dyn MessageStore>,
    sender_policy: SenderPolicy,
}

impl ChatService {
    pub fn new(store: Arc<dyn MessageStore>, sender_policy: SenderPolicy) -> Self {
        Self {
            store,
            sender_policy,
        }
    }

    /// Send, folded into a `{code, msg}` response.
    pub async fn handle_send(&self, req: SendRequest) -> SendResponse {
        match self.send(req).await {
            Ok(()) => SendResponse {
                code: CODE_OK,
                msg: "Message sent successfully".to_owned(),
            },
            Err(err) => err.into(),
        }
    }

    /// Pull, folded into a `{code, msg, ...}` response.
    pub async fn handle_pull(&self, req: PullRequest) -> PullResponse {
        match self.pull(req).await {
            Ok(Page {
                messages,
                has_more,
                next_cursor,
            }) => PullResponse {
                code: CODE_OK,
                msg: "Messages retrieved successfully".to_owned(),
                messages,
                has_more,
                next_cursor,
            },
            Err(err) => PullResponse {
                code: err.code(),
                msg: err.to_string(),
                messages: Vec::new(),
                has_more: false,
                next_cursor: None,
            },
        }
    }
}

impl From<ChatError> for SendResponse {
    fn from(err: ChatError) -> Self {
        Self {
            code: err.code(),
            msg: err.to_string(),
        }
    }
}
