//! Payment link flows and payment status sync

use std::sync::Arc;

use serde::Serialize;
use shared::models::PaymentMode;
use shared::now_millis;

use crate::audit_log;
use crate::orders::{OrderLedger, OrderLocks};
use crate::payment::{
    LinkStatus, PaymentError, PaymentGateway, PaymentLink, PaymentLinkRequest, format_phone_number,
};
use crate::utils::{AppError, AppResult, ErrorCode};

/// Outcome of syncing the latest order with the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PaymentSync {
    /// Latest line is cash on delivery or already paid
    NothingPending,
    StillPending { order_id: String },
    Paid { order_id: String, lines: usize },
}

impl PaymentSync {
    pub fn message(&self) -> &'static str {
        match self {
            Self::NothingPending => "No pending payments to check.",
            Self::StillPending { .. } => "Payment is still active or pending.",
            Self::Paid { .. } => "Payment status updated successfully!",
        }
    }
}

pub struct PaymentService {
    gateway: Arc<dyn PaymentGateway>,
    ledger: Arc<dyn OrderLedger>,
    locks: Arc<OrderLocks>,
}

impl PaymentService {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        ledger: Arc<dyn OrderLedger>,
        locks: Arc<OrderLocks>,
    ) -> Self {
        Self {
            gateway,
            ledger,
            locks,
        }
    }

    /// Create a provider link; its id (`ORDER_<millis>`) is the order id the
    /// client later passes to placement
    pub async fn generate_payment_link(
        &self,
        mobile: &str,
        amount: Option<f64>,
    ) -> Result<PaymentLink, PaymentError> {
        if mobile.trim().is_empty() {
            return Err(PaymentError::MissingField("mobile"));
        }
        let amount = amount.ok_or(PaymentError::MissingField("amount"))?;
        if !amount.is_finite() || amount <= 0.0 {
            return Err(PaymentError::InvalidAmount(amount));
        }

        let customer_phone = format_phone_number(mobile)
            .ok_or_else(|| PaymentError::InvalidPhone(mobile.to_string()))?;

        self.gateway
            .create_link(&PaymentLinkRequest {
                link_id: format!("ORDER_{}", now_millis()),
                amount,
                customer_phone,
                customer_ref: format!("CUST_{}", mobile.trim()),
            })
            .await
    }

    pub async fn check_payment_status(&self, link_id: &str) -> Result<LinkStatus, PaymentError> {
        if link_id.trim().is_empty() {
            return Err(PaymentError::MissingField("link_id"));
        }
        self.gateway.link_status(link_id.trim()).await
    }

    /// Sync the customer's most recent order line with the provider and mark
    /// every line of that order paid once the provider reports `PAID`
    pub async fn update_payment_status(&self, customer_id: &str) -> AppResult<PaymentSync> {
        let order = self
            .ledger
            .find_order(customer_id)
            .await?
            .filter(|order| !order.items.is_empty())
            .ok_or_else(|| {
                AppError::with_message(ErrorCode::OrderNotFound, "No orders found for this customer!")
            })?;

        let Some(latest) = order.latest_item() else {
            return Ok(PaymentSync::NothingPending);
        };
        if latest.payment_mode != PaymentMode::UpiOrCard || latest.payment_status {
            return Ok(PaymentSync::NothingPending);
        }
        let order_id = latest
            .order_id
            .clone()
            .ok_or_else(|| AppError::invalid_request("Order ID is missing."))?;

        // Provider round trip happens outside the customer lock
        let status = self.gateway.link_status(&order_id).await?;
        if !status.is_paid() {
            tracing::debug!(customer = %customer_id, order_id = %order_id, status = %status.status, "Payment not completed yet");
            return Ok(PaymentSync::StillPending { order_id });
        }

        let _guard = self.locks.customers.lock(&customer_id.to_string()).await;
        let lines = self.ledger.mark_paid(customer_id, &order_id).await?;

        audit_log!(
            customer_id,
            "payment_paid",
            format!("order:{order_id}"),
            format!("{lines} lines marked paid")
        );
        Ok(PaymentSync::Paid { order_id, lines })
    }
}
