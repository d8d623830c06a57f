use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

/// Sub-paths this router declares public, relative to its mount point
pub const PUBLIC_ROUTES: &[&str] = &["/", "/health"];

/// Mounted outside the context layer so probes answer even when context
/// construction would fail.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(alive))
        .route("/health", get(health))
}

/// Liveness probe, touches nothing
async fn alive() -> Json<Value> {
    Json(json!({
        "status": "alive",
        "timestamp": chrono::Utc::now(),
    }))
}

/// Readiness probe: pings both persistence providers and degrades to 503
/// with per-provider detail when either is unreachable
async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let now = chrono::Utc::now();

    let relational = state.rel_store.ping().await;
    let document = state.doc_store.ping().await;

    if relational.is_ok() && document.is_ok() {
        return (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "relational": "ok",
                "document": "ok",
            })),
        );
    }

    let relational = match relational {
        Ok(()) => "ok".to_string(),
        Err(e) => e.to_string(),
    };
    let document = match document {
        Ok(()) => "ok".to_string(),
        Err(e) => e.to_string(),
    };

    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({
            "status": "degraded",
            "timestamp": now,
            "relational": relational,
            "document": document,
        })),
    )
}
