//! Product API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::models::{Product, ProductCreate};

use crate::core::ServerState;
use crate::utils::validation::validate_payload;
use crate::utils::{AppError, AppResult, ErrorCode};

/// GET /api/v1/products - 按 product_id 排序
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Product>>> {
    let products = state.products.find_all().await?;
    Ok(Json(products))
}

/// GET /api/v1/products/{product_id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(product_id): Path<i64>,
) -> AppResult<Json<Product>> {
    let product = state
        .products
        .find_by_product_id(product_id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::ProductNotFound,
                format!("Book with ID {product_id} not found."),
            )
        })?;
    Ok(Json(product))
}

/// POST /api/v1/products - 重复的 product_id 返回 AlreadyExists
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<(StatusCode, Json<Product>)> {
    if !payload.price.is_finite() || payload.price < 0.0 {
        return Err(AppError::with_message(
            ErrorCode::ProductInvalidPrice,
            "Price must be a non-negative number",
        )
        .with_detail("price", payload.price));
    }
    validate_payload(&payload)?;
    let product = state.products.create(payload).await?;
    tracing::info!(product_id = product.product_id, title = %product.title, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}
