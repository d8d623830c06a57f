use axum::{
    extract::Extension,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::Row;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::RequestContext;
use crate::state::AppState;

/// Sub-paths this router declares admin-protected
pub const ADMIN_ROUTES: &[&str] = &["/create"];

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/create", post(create_product))
}

#[derive(Debug, Serialize)]
struct Product {
    id: Uuid,
    name: String,
    amount: Decimal,
    currency: String,
}

#[derive(Debug, Deserialize)]
struct CreateProduct {
    name: String,
    amount: Decimal,
    currency: String,
}

async fn list_products(
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let pool = ctx.rel_store.pool().await?;

    let rows = sqlx::query(
        "SELECT id, name, amount, currency FROM products WHERE deleted_at IS NULL ORDER BY name",
    )
    .fetch_all(&pool)
    .await?;

    let products = rows
        .into_iter()
        .map(|row| {
            Ok(Product {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                amount: row.try_get("amount")?,
                currency: row.try_get("currency")?,
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()?;

    Ok(Json(products))
}

async fn create_product(
    Extension(ctx): Extension<RequestContext>,
    Json(input): Json<CreateProduct>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    ctx.authorize()?;

    let product = Product {
        id: Uuid::new_v4(),
        name: input.name,
        amount: input.amount,
        currency: input.currency,
    };

    let pool = ctx.rel_store.pool().await?;
    sqlx::query("INSERT INTO products (id, name, amount, currency) VALUES ($1, $2, $3, $4)")
        .bind(product.id)
        .bind(&product.name)
        .bind(product.amount)
        .bind(&product.currency)
        .execute(&pool)
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}
