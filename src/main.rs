use tracing_subscriber::EnvFilter;

use billing_api_rust::provider;
use billing_api_rust::routes;
use billing_api_rust::state::AppState;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, REDIS_URL, etc.
    let _ = dotenvy::dotenv();

    let config = billing_api_rust::config::config();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config.api.enable_request_logging {
            EnvFilter::new("info,tower_http=debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting Billing API in {:?} mode", config.environment);

    let state = AppState::from_config(config).unwrap_or_else(|e| panic!("startup failed: {}", e));

    // Warm both providers without blocking startup. First requests may race
    // this and connect lazily on their own.
    let warmup = state.clone();
    tokio::spawn(async move {
        match provider::preload_all(&warmup.doc_store, &warmup.rel_store).await {
            Ok(()) => tracing::info!("DB preloads are completed"),
            Err(e) => tracing::warn!("DB preload failed: {}", e),
        }
    });

    let app = routes::mount(state);

    // Allow tests or deployments to override port via env
    let port = std::env::var("BILLING_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Billing API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
