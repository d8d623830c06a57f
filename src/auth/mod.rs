use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;
use crate::error::ApiError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub tenant: String,
    pub user: String,
    pub access: String,
    pub user_id: Uuid,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(tenant: String, user: String, access: String, user_id: Uuid) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.jwt_expiry_hours;
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            tenant,
            user,
            access,
            user_id,
            exp,
            iat: now.timestamp(),
        }
    }
}

/// Authorization state resolved from the inbound request, carried by the
/// request context for downstream handlers
#[derive(Clone, Debug)]
pub struct Principal {
    pub tenant: String,
    pub user: String,
    pub access: String,
    pub user_id: Uuid,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            tenant: claims.tenant,
            user: claims.user,
            access: claims.access,
            user_id: claims.user_id,
        }
    }
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        matches!(self.access.as_str(), "admin" | "root")
    }
}

/// Resolve the caller's authorization state. A missing Authorization header
/// is not a fault (route policy is decided downstream); a present but
/// malformed or invalid one is.
pub fn resolve_principal(headers: &HeaderMap) -> Result<Option<Principal>, ApiError> {
    let header = match headers
        .get("authorization")
        .or_else(|| headers.get("Authorization"))
    {
        Some(header) => header,
        None => return Ok(None),
    };

    let auth_str = header
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid Authorization header format"))?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthorized("Authorization header must use Bearer token format"))?;

    if token.trim().is_empty() {
        return Err(ApiError::unauthorized("Empty JWT token"));
    }

    let claims = validate_jwt(token)?;
    Ok(Some(Principal::from(claims)))
}

/// Validate JWT token and extract claims
fn validate_jwt(token: &str) -> Result<Claims, ApiError> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err(ApiError::unauthorized("JWT secret not configured"));
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| ApiError::unauthorized(format!("Invalid JWT token: {}", e)))?;

    Ok(token_data.claims)
}

pub fn generate_jwt(claims: &Claims) -> Result<String, ApiError> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err(ApiError::internal_server_error("JWT secret not configured"));
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| ApiError::internal_server_error(format!("JWT generation error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    #[test]
    fn missing_header_resolves_to_no_principal() {
        let principal = resolve_principal(&HeaderMap::new()).unwrap();
        assert!(principal.is_none());
    }

    #[test]
    fn minted_token_resolves_back_to_principal() {
        let claims = Claims::new(
            "acme".to_string(),
            "alice".to_string(),
            "admin".to_string(),
            Uuid::new_v4(),
        );
        let token = generate_jwt(&claims).unwrap();

        let principal = resolve_principal(&bearer(&token)).unwrap().unwrap();
        assert_eq!(principal.tenant, "acme");
        assert_eq!(principal.user, "alice");
        assert!(principal.is_admin());
    }

    #[test]
    fn garbage_token_is_a_fault() {
        let result = resolve_principal(&bearer("not-a-jwt"));
        assert!(result.is_err());
    }

    #[test]
    fn non_bearer_scheme_is_a_fault() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic dXNlcg=="));
        assert!(resolve_principal(&headers).is_err());
    }

    #[test]
    fn read_access_is_not_admin() {
        let principal = Principal {
            tenant: "acme".to_string(),
            user: "bob".to_string(),
            access: "read".to_string(),
            user_id: Uuid::new_v4(),
        };
        assert!(!principal.is_admin());
    }
}
