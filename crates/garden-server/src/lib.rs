//! HTTP CRUD surface for garden flowers and wall messages.

pub mod config;
pub mod error;
pub mod routes;
pub mod store;
pub mod wilt;

pub use config::ServerConfig;
pub use error::ApiError;
pub use store::{GardenStore, MemoryStore, StoreError, WritePolicy};

use axum::middleware;
use axum::routing::{get, patch, post};
use axum::Router;
use routes::{flowers, messages, SharedStore};

pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route("/api/flowers", get(flowers::list).post(flowers::create))
        .route("/api/flowers/:id", patch(flowers::update))
        .route("/api/flowers/:id/revive", post(flowers::revive))
        .route("/api/messages", get(messages::list).post(messages::create))
        .route("/api/messages/stream", get(messages::stream))
        .route("/healthz", get(routes::healthz))
        .layer(middleware::map_response(routes::no_store))
        .with_state(store)
}
