mod ping;
mod pull;
mod send;

use axum::{
    Router,
    routing::{get, post},
};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ping", get(ping::ping))
        .route("/api/send", post(send::send))
        .route("/api/pull", get(pull::pull))
}
