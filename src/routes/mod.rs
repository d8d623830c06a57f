pub mod monitor;
pub mod payment;
pub mod product;
pub mod receipt;
pub mod subscription;
pub mod webhook;

use axum::{
    extract::Extension,
    http::Uri,
    middleware::from_fn_with_state,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use thiserror::Error;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::ApiError;
use crate::middleware::{build_context, encrypt_response, RequestContext};
use crate::state::AppState;

/// Mount prefixes for every sub-router. Fixed at startup, never colliding.
pub mod prefix {
    pub const ROOT: &str = "/";
    pub const MONITOR: &str = "/monitor";
    pub const PAYMENT: &str = "/payment";
    pub const PRODUCT: &str = "/product";
    pub const WEBHOOK: &str = "/webhook";
    pub const RECEIPT: &str = "/receipt";
    pub const SUBSCRIPTION: &str = "/subscription";
}

/// Qualify a router's declared sub-paths against its mount prefix.
///
/// `"/"` marks the mount root itself; everything else is plain
/// concatenation. No normalization, de-duplication or glob expansion:
/// lookups later are exact string matches. Output order follows input
/// order so startup logs stay deterministic.
pub fn populate_routes(prefix: &str, sub_paths: &[&str]) -> Vec<String> {
    sub_paths
        .iter()
        .map(|sub| {
            if *sub == "/" {
                prefix.to_string()
            } else {
                format!("{}{}", prefix, sub)
            }
        })
        .collect()
}

#[derive(Debug, Error)]
pub enum RouteTableError {
    #[error("Route '{0}' is declared both public and admin")]
    Conflict(String),
}

/// Public/admin classification of every mounted route. Built once at
/// startup, owned immutably by the dispatch state afterwards.
#[derive(Debug)]
pub struct RouteTable {
    public: Vec<String>,
    admin: Vec<String>,
}

impl RouteTable {
    /// Collect the public/admin declarations of every mounted router.
    pub fn classify() -> Result<Self, RouteTableError> {
        let table = Self::build(
            &[
                (prefix::MONITOR, monitor::PUBLIC_ROUTES),
                (prefix::WEBHOOK, webhook::PUBLIC_ROUTES),
            ],
            &[
                (prefix::PRODUCT, product::ADMIN_ROUTES),
                (prefix::PAYMENT, payment::ADMIN_ROUTES),
            ],
        )?;

        tracing::info!(
            public = ?table.public,
            admin = ?table.admin,
            "route classification complete"
        );
        Ok(table)
    }

    /// A route claimed by both categories is a startup error, not a silent
    /// overlap.
    fn build(
        public_decls: &[(&str, &[&str])],
        admin_decls: &[(&str, &[&str])],
    ) -> Result<Self, RouteTableError> {
        let public: Vec<String> = public_decls
            .iter()
            .flat_map(|&(prefix, subs)| populate_routes(prefix, subs))
            .collect();

        let admin: Vec<String> = admin_decls
            .iter()
            .flat_map(|&(prefix, subs)| populate_routes(prefix, subs))
            .collect();

        if let Some(overlap) = admin.iter().find(|&route| public.contains(route)) {
            return Err(RouteTableError::Conflict(overlap.clone()));
        }

        Ok(Self { public, admin })
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.public.iter().any(|route| route == path)
    }

    pub fn is_admin(&self, path: &str) -> bool {
        self.admin.iter().any(|route| route == path)
    }

    pub fn public_routes(&self) -> &[String] {
        &self.public
    }

    pub fn admin_routes(&self) -> &[String] {
        &self.admin
    }
}

/// Assemble the full request pipeline.
///
/// Stage order is load-bearing: the monitor router stays outside the
/// context layer so probes keep working when context construction would
/// fail, and the encryption interceptor wraps everything mounted here,
/// translated fault responses from the inner boundaries included.
pub fn mount(state: AppState) -> Router {
    let business = Router::new()
        .route(prefix::ROOT, get(service_info))
        .nest(prefix::PAYMENT, payment::router())
        .nest(prefix::PRODUCT, product::router())
        .nest(prefix::WEBHOOK, webhook::router())
        .nest(prefix::RECEIPT, receipt::router())
        .nest(prefix::SUBSCRIPTION, subscription::router())
        .fallback(route_not_found)
        .layer(from_fn_with_state(state.clone(), build_context));

    Router::new()
        .nest(prefix::MONITOR, monitor::router())
        .merge(business)
        .layer(from_fn_with_state(state.clone(), encrypt_response))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn service_info(Extension(ctx): Extension<RequestContext>) -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Billing API (Rust)",
        "version": version,
        "endpoints": {
            "monitor": "/monitor, /monitor/health (public)",
            "product": "/product, /product/create (create is admin)",
            "payment": "/payment, /payment/refund (refund is admin)",
            "webhook": "/webhook (public)",
            "receipt": "/receipt/:id",
            "subscription": "/subscription[/:id]",
        },
        "request": {
            "method": ctx.method.as_str(),
            "path": ctx.path,
            "public": ctx.is_public(),
            "admin": ctx.requires_admin(),
            "user": ctx.principal.as_ref().map(|p| p.user.clone()),
        }
    }))
}

async fn route_not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("Route '{}' is not mounted", uri.path()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn populate_preserves_length_and_order() {
        let routes = populate_routes("/payment", &["/refund", "/", "/capture"]);
        assert_eq!(
            routes,
            vec!["/payment/refund", "/payment", "/payment/capture"]
        );
    }

    #[test]
    fn populate_maps_root_to_bare_prefix() {
        assert_eq!(populate_routes("/webhook", &["/"]), vec!["/webhook"]);
        assert_eq!(populate_routes("/webhook", &[]), Vec::<String>::new());
    }

    #[test]
    fn populate_does_not_normalize() {
        // Exact string semantics: trailing slashes survive as declared
        assert_eq!(
            populate_routes("/product", &["/create/"]),
            vec!["/product/create/"]
        );
    }

    #[test]
    fn classify_qualifies_product_create_as_admin() {
        let table = RouteTable::classify().unwrap();
        assert!(table
            .admin_routes()
            .contains(&"/product/create".to_string()));
        assert!(table.is_admin("/product/create"));
        assert!(!table.is_public("/product/create"));
    }

    #[test]
    fn classify_qualifies_monitor_and_webhook_as_public() {
        let table = RouteTable::classify().unwrap();
        assert!(table.is_public("/monitor"));
        assert!(table.is_public("/monitor/health"));
        assert!(table.is_public("/webhook"));
    }

    #[test]
    fn unclassified_routes_fall_to_default_policy() {
        let table = RouteTable::classify().unwrap();
        assert!(!table.is_public("/receipt/42"));
        assert!(!table.is_admin("/receipt/42"));
    }

    #[test]
    fn matching_is_exact_string_only() {
        let table = RouteTable::classify().unwrap();
        assert!(!table.is_admin("/product/create/"));
        assert!(!table.is_admin("/product/create/extra"));
    }

    #[test]
    fn overlapping_declarations_are_rejected() {
        let result = RouteTable::build(
            &[("/webhook", &["/", "/events"])],
            &[("/webhook", &["/events"])],
        );
        assert!(matches!(result, Err(RouteTableError::Conflict(route)) if route == "/webhook/events"));
    }

    #[test]
    fn disjoint_declarations_build() {
        let table = RouteTable::build(
            &[("/monitor", &["/"])],
            &[("/product", &["/create"])],
        )
        .unwrap();
        assert_eq!(table.public_routes().len(), 1);
        assert_eq!(table.admin_routes().len(), 1);
    }
}
