use axum::{body::Bytes, extract::Extension, routing::post, Json, Router};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use crate::error::ApiError;
use crate::middleware::RequestContext;
use crate::state::AppState;

/// Sub-paths this router declares public: external providers deliver events
/// here unauthenticated
pub const PUBLIC_ROUTES: &[&str] = &["/"];

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(ingest_event))
}

/// Store the delivered event keyed by its content digest, so provider
/// redelivery of the same payload is harmless.
async fn ingest_event(
    Extension(ctx): Extension<RequestContext>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let payload: Value = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request(format!("Invalid webhook payload: {}", e)))?;

    let event_id = format!("{:x}", Sha256::digest(&body));

    let event = json!({
        "id": event_id,
        "received_at": chrono::Utc::now(),
        "payload": payload,
    });
    ctx.doc_store.put("webhook_event", &event_id, &event).await?;

    Ok(Json(json!({
        "received": true,
        "event_id": event_id,
    })))
}
