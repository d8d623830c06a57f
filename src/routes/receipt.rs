use axum::{
    extract::{Extension, Path},
    routing::get,
    Json, Router,
};
use serde_json::Value;

use crate::error::ApiError;
use crate::middleware::RequestContext;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/:id", get(get_receipt))
}

async fn get_receipt(
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    match ctx.doc_store.get::<Value>("receipt", &id).await? {
        Some(receipt) => Ok(Json(receipt)),
        None => Err(ApiError::not_found(format!("Receipt '{}' not found", id))),
    }
}
