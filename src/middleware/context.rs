use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, Method},
    middleware::Next,
    response::Response,
};

use crate::auth::{self, Principal};
use crate::error::ApiError;
use crate::provider::{DocumentStore, RelationalStore};
use crate::routes::RouteTable;
use crate::state::AppState;

/// Per-request execution context, attached to request extensions before any
/// business handler runs. Downstream handlers read route policy and borrow
/// the persistence providers through it.
#[derive(Clone)]
pub struct RequestContext {
    pub method: Method,
    pub path: String,
    pub principal: Option<Principal>,
    pub doc_store: DocumentStore,
    pub rel_store: RelationalStore,
    routes: Arc<RouteTable>,
}

impl RequestContext {
    pub async fn build(
        state: &AppState,
        method: Method,
        path: &str,
        headers: &HeaderMap,
    ) -> Result<Self, ApiError> {
        let principal = auth::resolve_principal(headers)?;

        // Admin routes re-check that the tenant behind the token is still live
        if let Some(principal) = &principal {
            if state.routes.is_admin(path) {
                state
                    .rel_store
                    .verify_tenant_active(&principal.tenant)
                    .await?;
            }
        }

        Ok(Self {
            method,
            path: path.to_string(),
            principal,
            doc_store: state.doc_store.clone(),
            rel_store: state.rel_store.clone(),
            routes: state.routes.clone(),
        })
    }

    pub fn is_public(&self) -> bool {
        self.routes.is_public(&self.path)
    }

    pub fn requires_admin(&self) -> bool {
        self.routes.is_admin(&self.path)
    }

    /// Gate called by admin handlers before touching storage
    pub fn authorize(&self) -> Result<(), ApiError> {
        if !self.requires_admin() {
            return Ok(());
        }

        match &self.principal {
            None => Err(ApiError::unauthorized(
                "Authentication required for this route",
            )),
            Some(principal) if !principal.is_admin() => Err(ApiError::forbidden(format!(
                "User '{}' does not have admin access",
                principal.user
            ))),
            Some(_) => Ok(()),
        }
    }
}

/// Universal context middleware. Runs for every path except the monitor
/// prefix; a construction fault is translated here and the business router
/// layer is never reached.
pub async fn build_context(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let ctx = RequestContext::build(&state, method, &path, request.headers()).await?;
    request.extensions_mut().insert(ctx);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use uuid::Uuid;

    fn test_state() -> AppState {
        AppState::from_config(&AppConfig::development()).expect("state")
    }

    fn context_for(path: &str, principal: Option<Principal>) -> RequestContext {
        let state = test_state();
        RequestContext {
            method: Method::GET,
            path: path.to_string(),
            principal,
            doc_store: state.doc_store.clone(),
            rel_store: state.rel_store.clone(),
            routes: state.routes.clone(),
        }
    }

    fn principal(access: &str) -> Principal {
        Principal {
            tenant: "acme".to_string(),
            user: "alice".to_string(),
            access: access.to_string(),
            user_id: Uuid::new_v4(),
        }
    }

    #[tokio::test]
    async fn builds_without_providers_for_anonymous_requests() {
        let state = test_state();
        let ctx = RequestContext::build(&state, Method::GET, "/receipt/42", &HeaderMap::new())
            .await
            .unwrap();

        assert!(ctx.principal.is_none());
        assert!(!ctx.is_public());
        assert!(!ctx.requires_admin());
    }

    #[test]
    fn admin_route_without_principal_is_unauthorized() {
        let ctx = context_for("/product/create", None);
        let err = ctx.authorize().unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn admin_route_with_read_principal_is_forbidden() {
        let ctx = context_for("/product/create", Some(principal("read")));
        let err = ctx.authorize().unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::FORBIDDEN);
    }

    #[test]
    fn admin_route_with_admin_principal_passes() {
        let ctx = context_for("/product/create", Some(principal("admin")));
        assert!(ctx.authorize().is_ok());
    }

    #[test]
    fn default_policy_routes_do_not_demand_a_principal() {
        let ctx = context_for("/subscription", None);
        assert!(ctx.authorize().is_ok());
    }

    #[test]
    fn public_routes_classify_as_public() {
        let ctx = context_for("/webhook", None);
        assert!(ctx.is_public());
        assert!(!ctx.requires_admin());
    }
}
