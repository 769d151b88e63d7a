//! Route handlers, one module per entity family.

pub mod ai;
pub mod auth;
pub mod categories;
pub mod events;
pub mod notes;
pub mod tasks;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .merge(auth::router())
        .merge(tasks::router())
        .merge(categories::router())
        .merge(events::router())
        .merge(notes::router())
        .merge(ai::router())
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Hello, World!" }))
}
