//! Cart API Handlers
//!
//! Customers are identified by email, normalized before any lookup.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use shared::models::Cart;

use crate::api::EmailQuery;
use crate::core::ServerState;
use crate::utils::AppResult;
use crate::utils::validation::normalize_email;

/// Body of add / set-quantity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLineRequest {
    pub email: String,
    pub product_id: i64,
    #[serde(default = "one")]
    pub quantity: i32,
}

fn one() -> i32 {
    1
}

/// GET /api/v1/cart?email=
pub async fn get_cart(
    State(state): State<ServerState>,
    Query(query): Query<EmailQuery>,
) -> AppResult<Json<Cart>> {
    let customer = query.customer()?;
    Ok(Json(state.cart.get_cart(&customer).await?))
}

/// POST /api/v1/cart/items
pub async fn add_item(
    State(state): State<ServerState>,
    Json(req): Json<CartLineRequest>,
) -> AppResult<Json<Cart>> {
    let customer = normalize_email(&req.email)?;
    let cart = state
        .cart
        .add_item(&customer, req.product_id, req.quantity)
        .await?;
    Ok(Json(cart))
}

/// PUT /api/v1/cart/items
pub async fn set_quantity(
    State(state): State<ServerState>,
    Json(req): Json<CartLineRequest>,
) -> AppResult<Json<Cart>> {
    let customer = normalize_email(&req.email)?;
    let cart = state
        .cart
        .set_quantity(&customer, req.product_id, req.quantity)
        .await?;
    Ok(Json(cart))
}

/// DELETE /api/v1/cart/items/{product_id}?email=
pub async fn remove_item(
    State(state): State<ServerState>,
    Path(product_id): Path<i64>,
    Query(query): Query<EmailQuery>,
) -> AppResult<Json<Cart>> {
    let customer = query.customer()?;
    Ok(Json(state.cart.remove_item(&customer, product_id).await?))
}
