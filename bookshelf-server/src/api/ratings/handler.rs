//! Rating API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::models::{Rating, RatingCreate};

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult};

/// POST /api/v1/ratings
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<RatingCreate>,
) -> AppResult<(StatusCode, ApiResponse<Rating>)> {
    let rating = state.ratings.add_rating(payload).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::success_with_message("Rating added successfully!", rating),
    ))
}

/// GET /api/v1/ratings/{product_id} - 最新的在前
pub async fn list_for_product(
    State(state): State<ServerState>,
    Path(product_id): Path<i64>,
) -> AppResult<Json<Vec<Rating>>> {
    Ok(Json(state.ratings.ratings_for_product(product_id).await?))
}
