pub mod api;
pub mod appresult;
pub mod config;
pub mod error;
pub mod identity;
pub mod service;
pub mod store;

use axum::{Router, extract::FromRef};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use appresult::{AppError, AppResult};
pub use error::{ChatError, StoreError};
pub use identity::{ChatRoomKey, canonicalize};
pub use service::{ChatService, Page, PullRequest, SendRequest, SenderPolicy};
pub use store::{MemoryMessageStore, Message, MessageStore, Order, SqliteMessageStore};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub chat: ChatService,
}

/// The full HTTP app, shared by the server binary and the integration tests.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    api::router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
