// handlers/public/mod.rs - Public handlers (no authentication required)

use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::app::AppState;

pub const GREETING: &str = "Hello from the Notes App Backend!";

/// GET / - static greeting
pub async fn root() -> &'static str {
    GREETING
}

/// GET /health - liveness check
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
        "store": state.notes.store_name(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
