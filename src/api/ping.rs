use axum::{Json, debug_handler};
use serde_json::{Value, json};

#[debug_handler]
pub(crate) async fn ping() -> Json<Value> {
    Json(json!({ "message": "pong" }))
}
