pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::models::entry::now_timestamp;
use crate::store::EntryStore;

#[derive(Clone)]
pub struct AppState {
    pub store: EntryStore,
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "timestamp": now_timestamp() }))
}

/// Build the full Axum application router.
///
/// The store must already be migrated; see [`EntryStore::connect`].
pub fn build_app(store: EntryStore) -> Router {
    let state = AppState { store };

    Router::new()
        .route("/api/health", get(health))
        .merge(routes::entries::router())
        .merge(routes::search::router())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
