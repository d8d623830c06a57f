use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::state::AppState;

/// Response encryption interceptor. Layered outside every router mounted by
/// the orchestrator, so each outbound body, fault responses from inner
/// boundaries included, is sealed exactly once before it leaves the process.
/// Handlers keep emitting plaintext and never see this happen.
///
/// A cipher failure is deliberately not caught here; it surfaces as an
/// `Encryption` fault at this layer's own boundary, which is the last
/// resort, and that translated response is not re-encrypted.
pub async fn encrypt_response(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let response = next.run(request).await;
    let (mut parts, body) = response.into_parts();

    let plaintext = to_bytes(body, usize::MAX)
        .await
        .map_err(|e| ApiError::internal_server_error(format!("Failed to buffer response body: {}", e)))?;

    tracing::debug!(bytes = plaintext.len(), "starting response encryption");
    let sealed = state.cipher.seal(&plaintext)?;
    tracing::debug!(bytes = sealed.len(), "response encryption completed");

    // The sealed payload replaces the plaintext wholesale
    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );

    Ok(Response::from_parts(parts, Body::from(sealed)))
}
