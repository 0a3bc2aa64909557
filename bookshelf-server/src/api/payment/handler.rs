//! Payment API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::payment::{LinkStatus, PaymentError, PaymentLink};
use crate::services::PaymentSync;
use crate::utils::validation::{MAX_LINK_ID_LEN, normalize_email, validate_required_text};
use crate::utils::{ApiResponse, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentLinkBody {
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkStatusQuery {
    #[serde(default)]
    pub link_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusBody {
    #[serde(default)]
    pub email: String,
}

/// POST /api/v1/payment/generate-payment-link
pub async fn generate_link(
    State(state): State<ServerState>,
    Json(body): Json<PaymentLinkBody>,
) -> AppResult<Json<PaymentLink>> {
    let link = state
        .payments
        .generate_payment_link(&body.mobile, body.amount)
        .await?;
    tracing::info!(order_id = %link.order_id, "Payment link created");
    Ok(Json(link))
}

/// GET /api/v1/payment/check-payment-status?link_id=
pub async fn check_status(
    State(state): State<ServerState>,
    Query(query): Query<LinkStatusQuery>,
) -> AppResult<Json<LinkStatus>> {
    if query.link_id.trim().is_empty() {
        return Err(PaymentError::MissingField("link_id").into());
    }
    validate_required_text(&query.link_id, "link_id", MAX_LINK_ID_LEN)?;
    Ok(Json(state.payments.check_payment_status(&query.link_id).await?))
}

/// POST /api/v1/payment/update-status
pub async fn update_status(
    State(state): State<ServerState>,
    Json(body): Json<UpdateStatusBody>,
) -> AppResult<ApiResponse<PaymentSync>> {
    if body.email.trim().is_empty() {
        return Err(PaymentError::MissingField("email").into());
    }
    let customer = normalize_email(&body.email)?;
    let sync = state.payments.update_payment_status(&customer).await?;
    Ok(ApiResponse::success_with_message(sync.message(), sync))
}
