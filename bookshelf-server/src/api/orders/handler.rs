//! Order API Handlers

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use shared::models::{OrderLineItem, PaymentMode, ShippingAddress};
use validator::Validate;

use crate::api::EmailQuery;
use crate::core::ServerState;
use crate::orders::{OrderConfirmation, PlaceOrder};
use crate::utils::validation::{
    MAX_LINK_ID_LEN, normalize_email, validate_payload, validate_required_text,
};
use crate::utils::{ApiResponse, AppResult};

pub const ORDER_PLACED: &str = "Order placed successfully!";

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PlaceOrderRequest {
    pub email: String,
    #[validate(nested)]
    pub shipping_address: ShippingAddress,
    pub payment_mode: PaymentMode,
    #[serde(default)]
    pub payment_status: bool,
    /// Payment link id for prepaid orders
    #[serde(default)]
    pub order_id: Option<String>,
}

/// POST /api/v1/orders/place
///
/// 201 on a new placement, 200 when `order_id` was already committed.
pub async fn place(
    State(state): State<ServerState>,
    Json(req): Json<PlaceOrderRequest>,
) -> AppResult<(StatusCode, ApiResponse<OrderConfirmation>)> {
    validate_payload(&req)?;
    let customer_id = normalize_email(&req.email)?;

    let order_id = match req.order_id.as_deref().map(str::trim) {
        Some("") | None => None,
        Some(id) => {
            validate_required_text(id, "order_id", MAX_LINK_ID_LEN)?;
            Some(id.to_string())
        }
    };

    let confirmation = state
        .reconciler
        .place_order(PlaceOrder {
            customer_id,
            shipping_address: req.shipping_address,
            payment_mode: req.payment_mode,
            payment_status: req.payment_status,
            order_id,
        })
        .await?;

    let status = if confirmation.replayed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((
        status,
        ApiResponse::success_with_message(ORDER_PLACED, confirmation),
    ))
}

/// GET /api/v1/orders?email= - 没有订单时返回空列表
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<EmailQuery>,
) -> AppResult<Json<Vec<OrderLineItem>>> {
    let customer = query.customer()?;
    Ok(Json(state.reconciler.get_orders(&customer).await?))
}
