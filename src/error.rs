// HTTP API Error Types
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::crypto::EncryptionError;
use crate::provider::ProviderError;

/// HTTP API error with appropriate status codes and client-friendly messages.
///
/// Every fault raised anywhere in the dispatch pipeline funnels into this
/// type; its `IntoResponse` impl is the terminal translation boundary and
/// is total over all variants.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 500, raised while sealing an outbound body
    Encryption(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Encryption(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::Encryption(_) => "Failed to prepare response",
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status(), self.message())
    }
}

impl std::error::Error for ApiError {}

// Convert other error types to ApiError
impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::ConfigMissing(_) | ProviderError::InvalidDatabaseUrl => {
                tracing::error!("Provider configuration error: {}", err);
                ApiError::service_unavailable("Persistence provider is not configured")
            }
            ProviderError::TenantInactive(tenant) => {
                ApiError::forbidden(format!("Tenant '{}' is not active or does not exist", tenant))
            }
            ProviderError::Sqlx(e) => {
                tracing::error!("Relational store error: {}", e);
                ApiError::service_unavailable("Relational store temporarily unavailable")
            }
            ProviderError::Redis(e) => {
                tracing::error!("Document store error: {}", e);
                ApiError::service_unavailable("Document store temporarily unavailable")
            }
            ProviderError::Serialize(e) => {
                tracing::error!("Document encoding error: {}", e);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<EncryptionError> for ApiError {
    fn from(err: EncryptionError) -> Self {
        ApiError::Encryption(err.to_string())
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::not_found("Record not found"),
            other => {
                // Log the real error but return a generic message
                tracing::error!("SQLx error: {}", other);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // The raw fault is logged here, at the translation boundary
        if status.is_server_error() {
            tracing::error!(fault = ?self, "request failed");
        } else {
            tracing::warn!(fault = ?self, "request rejected");
        }

        (status, Json(json!({ "message": self.message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_every_variant_to_a_finite_status() {
        let faults = vec![
            ApiError::bad_request("x"),
            ApiError::unauthorized("x"),
            ApiError::forbidden("x"),
            ApiError::not_found("x"),
            ApiError::conflict("x"),
            ApiError::internal_server_error("x"),
            ApiError::Encryption("nonce failure".to_string()),
            ApiError::service_unavailable("x"),
        ];

        for fault in faults {
            assert!(fault.status().as_u16() >= 400);
            assert!(!fault.message().is_empty());
        }
    }

    #[test]
    fn encryption_faults_hide_cipher_details() {
        let fault = ApiError::from(EncryptionError::EncryptionFailed);
        assert_eq!(fault.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!fault.message().contains("nonce"));
    }

    #[test]
    fn tenant_faults_map_to_forbidden() {
        let fault = ApiError::from(ProviderError::TenantInactive("acme".to_string()));
        assert_eq!(fault.status(), StatusCode::FORBIDDEN);
        assert!(fault.message().contains("acme"));
    }
}
