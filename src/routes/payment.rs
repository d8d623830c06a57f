use axum::{extract::Extension, http::StatusCode, routing::post, Json, Router};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::RequestContext;
use crate::state::AppState;

/// Sub-paths this router declares admin-protected
pub const ADMIN_ROUTES: &[&str] = &["/refund"];

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(initiate_payment))
        .route("/refund", post(refund_payment))
}

#[derive(Debug, Deserialize)]
struct InitiatePayment {
    customer_id: Uuid,
    amount: Decimal,
    currency: String,
}

#[derive(Debug, Serialize)]
struct Payment {
    id: Uuid,
    customer_id: Uuid,
    amount: Decimal,
    currency: String,
    status: String,
    created_at: DateTime<Utc>,
}

async fn initiate_payment(
    Extension(ctx): Extension<RequestContext>,
    Json(input): Json<InitiatePayment>,
) -> Result<(StatusCode, Json<Payment>), ApiError> {
    if input.amount <= Decimal::ZERO {
        return Err(ApiError::bad_request("Payment amount must be positive"));
    }

    let payment = Payment {
        id: Uuid::new_v4(),
        customer_id: input.customer_id,
        amount: input.amount,
        currency: input.currency,
        status: "pending".to_string(),
        created_at: Utc::now(),
    };

    let pool = ctx.rel_store.pool().await?;
    sqlx::query(
        "INSERT INTO payments (id, customer_id, amount, currency, status, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(payment.id)
    .bind(payment.customer_id)
    .bind(payment.amount)
    .bind(&payment.currency)
    .bind(&payment.status)
    .bind(payment.created_at)
    .execute(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(payment)))
}

#[derive(Debug, Deserialize)]
struct RefundPayment {
    payment_id: Uuid,
}

async fn refund_payment(
    Extension(ctx): Extension<RequestContext>,
    Json(input): Json<RefundPayment>,
) -> Result<Json<Value>, ApiError> {
    ctx.authorize()?;

    let pool = ctx.rel_store.pool().await?;
    let result = sqlx::query(
        "UPDATE payments SET status = 'refunded', refunded_at = NOW() \
         WHERE id = $1 AND status <> 'refunded'",
    )
    .bind(input.payment_id)
    .execute(&pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found(format!(
            "Payment '{}' not found or already refunded",
            input.payment_id
        )));
    }

    Ok(Json(json!({
        "refunded": true,
        "payment_id": input.payment_id,
    })))
}
