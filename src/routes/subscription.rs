use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::RequestContext;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(start_subscription))
        .route("/:id", get(get_subscription))
}

#[derive(Debug, Deserialize)]
struct StartSubscription {
    customer_id: Uuid,
    plan: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Subscription {
    id: Uuid,
    customer_id: Uuid,
    plan: String,
    status: String,
    started_at: DateTime<Utc>,
}

async fn start_subscription(
    Extension(ctx): Extension<RequestContext>,
    Json(input): Json<StartSubscription>,
) -> Result<(StatusCode, Json<Subscription>), ApiError> {
    let subscription = Subscription {
        id: Uuid::new_v4(),
        customer_id: input.customer_id,
        plan: input.plan,
        status: "active".to_string(),
        started_at: Utc::now(),
    };

    ctx.doc_store
        .put("subscription", &subscription.id.to_string(), &subscription)
        .await?;

    Ok((StatusCode::CREATED, Json(subscription)))
}

async fn get_subscription(
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Result<Json<Subscription>, ApiError> {
    match ctx.doc_store.get::<Subscription>("subscription", &id).await? {
        Some(subscription) => Ok(Json(subscription)),
        None => Err(ApiError::not_found(format!(
            "Subscription '{}' not found",
            id
        ))),
    }
}
