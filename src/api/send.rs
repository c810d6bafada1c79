use axum::{debug_handler, extract::{Query, State}, http::StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::{
    AppError, AppResult,
    error::CODE_OK,
    identity::SEPARATOR,
    service::{ChatService, SendRequest},
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct SendMessageQuery {
    sender: String,
    receiver: String,
    text: String,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn send(
    State(chat): State<ChatService>,
    Query(SendMessageQuery { sender, receiver, text }): Query<SendMessageQuery>,
) -> AppResult<StatusCode> {
    if sender.is_empty() || receiver.is_empty() {
        return Err(AppError::bad_request(
            "Sender name and receiver name cannot be empty",
        ));
    }
    if sender.contains(SEPARATOR) || receiver.contains(SEPARATOR) {
        return Err(AppError::bad_request(format!(
            "Sender name and receiver name cannot contain the character {SEPARATOR}"
        )));
    }

    let resp = chat
        .handle_send(SendRequest {
            chat: format!("{sender}{SEPARATOR}{receiver}"),
            sender,
            text,
        })
        .await;
    if resp.code != CODE_OK {
        debug!(code = resp.code, "send refused: {}", resp.msg);
        return Err(AppError::from_code(resp.code, resp.msg));
    }

    Ok(StatusCode::OK)
}
