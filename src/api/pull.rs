use axum::{Json, debug_handler, extract::{Query, State}};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    AppError, AppResult,
    error::CODE_OK,
    identity::SEPARATOR,
    service::{ChatService, PullRequest},
    store::Message,
};

pub(crate) const DEFAULT_CURSOR: i64 = 0;
pub(crate) const DEFAULT_LIMIT: i32 = 10;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct PullQuery {
    chat: String,
    cursor: String,
    limit: String,
    reverse: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct PullBody {
    messages: Vec<Message>,
    has_more: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_cursor: Option<i64>,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn pull(
    State(chat): State<ChatService>,
    Query(query): Query<PullQuery>,
) -> AppResult<Json<PullBody>> {
    let req = parse_query(query)?;

    let resp = chat.handle_pull(req).await;
    if resp.code != CODE_OK {
        debug!(code = resp.code, "pull refused: {}", resp.msg);
        return Err(AppError::from_code(resp.code, resp.msg));
    }

    Ok(Json(PullBody {
        messages: resp.messages,
        has_more: resp.has_more,
        next_cursor: resp.next_cursor,
    }))
}

fn parse_query(PullQuery { chat, cursor, limit, reverse }: PullQuery) -> AppResult<PullRequest> {
    if chat.matches(SEPARATOR).count() != 1 {
        return Err(AppError::bad_request(format!(
            "Chat parameter should be in the form <member1>{SEPARATOR}<member2>, denoting a chat between two users"
        )));
    }

    let cursor = if cursor.is_empty() {
        DEFAULT_CURSOR
    } else {
        cursor
            .parse::<i64>()
            .map_err(|_| AppError::bad_request(format!("Cursor of {cursor} is not an integer")))?
    };

    let limit = if limit.is_empty() {
        DEFAULT_LIMIT
    } else {
        limit
            .parse::<i32>()
            .map_err(|_| AppError::bad_request(format!("Limit of {limit} is not an integer")))?
    };

    let reverse = match reverse.to_lowercase().as_str() {
        "true" => true,
        "false" | "" => false,
        _ => {
            return Err(AppError::bad_request(
                "Invalid reverse parameter, it should be either true or false",
            ));
        }
    };

    Ok(PullRequest {
        chat,
        cursor,
        limit,
        reverse,
    })
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;

    fn query(chat: &str, cursor: &str, limit: &str, reverse: &str) -> PullQuery {
        PullQuery {
            chat: chat.into(),
            cursor: cursor.into(),
            limit: limit.into(),
            reverse: reverse.into(),
        }
    }

    #[test]
    fn blanks_take_defaults() {
        let req = parse_query(query("a:b", "", "", "")).unwrap();
        assert_eq!(req.cursor, DEFAULT_CURSOR);
        assert_eq!(req.limit, DEFAULT_LIMIT);
        assert!(!req.reverse);
    }

    #[test]
    fn reverse_is_case_insensitive() {
        assert!(parse_query(query("a:b", "0", "5", "TRUE")).unwrap().reverse);
        assert!(!parse_query(query("a:b", "0", "5", "False")).unwrap().reverse);
    }

    #[test]
    fn malformed_values_are_bad_requests() {
        for q in [
            query("ab", "", "", ""),
            query("a:b:c", "", "", ""),
            query("a:b", "one", "", ""),
            query("a:b", "", "1.5", ""),
            query("a:b", "", "99999999999", ""),
            query("a:b", "", "", "yes"),
        ] {
            let err = parse_query(q).unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn negative_numbers_pass_through_to_the_service() {
        let req = parse_query(query("a:b", "-1", "-2", "")).unwrap();
        assert_eq!((req.cursor, req.limit), (-1, -2));
    }
}
