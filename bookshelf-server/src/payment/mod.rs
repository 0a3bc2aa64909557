//! Payment links
//!
//! [`PaymentGateway`] is the provider boundary; [`CashfreeClient`] talks to
//! the Cashfree payment-links REST API.

pub mod cashfree;
pub mod phone;

pub use cashfree::CashfreeClient;
pub use phone::format_phone_number;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Provider status of a paid link
pub const LINK_STATUS_PAID: &str = "PAID";

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("{0} is required.")]
    MissingField(&'static str),

    #[error("Invalid mobile number format.")]
    InvalidPhone(String),

    #[error("Amount must be positive, got {0}")]
    InvalidAmount(f64),

    #[error("Payment link {0} not found")]
    LinkNotFound(String),

    #[error("Payment provider returned {status}: {body}")]
    Gateway { status: u16, body: String },

    #[error("Payment provider unreachable: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        let message = err.to_string();
        match err {
            PaymentError::MissingField(field) => {
                AppError::with_message(ErrorCode::RequiredField, message).with_detail("field", field)
            }
            PaymentError::InvalidPhone(_) => {
                AppError::with_message(ErrorCode::PaymentInvalidPhone, message)
            }
            PaymentError::InvalidAmount(_) => {
                AppError::with_message(ErrorCode::PaymentInvalidAmount, message)
            }
            PaymentError::LinkNotFound(link_id) => {
                AppError::with_message(ErrorCode::PaymentLinkNotFound, message)
                    .with_detail("link_id", link_id)
            }
            PaymentError::Gateway { status, body } => {
                tracing::error!(status, body = %body, "Payment provider rejected request");
                AppError::with_message(ErrorCode::PaymentGatewayError, "Payment provider error")
                    .with_detail("status", status)
            }
            PaymentError::Http(e) => {
                tracing::error!(error = %e, "Payment provider unreachable");
                AppError::with_message(ErrorCode::NetworkError, message)
            }
        }
    }
}

/// Link to create at the provider
#[derive(Debug, Clone)]
pub struct PaymentLinkRequest {
    pub link_id: String,
    pub amount: f64,
    /// E.164 phone number
    pub customer_phone: String,
    /// Provider-side customer reference
    pub customer_ref: String,
}

/// Created link; `order_id` doubles as the link id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentLink {
    pub order_id: String,
    pub payment_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkStatus {
    pub link_id: String,
    /// Provider status, e.g. `ACTIVE`, `PAID`, `EXPIRED`
    pub status: String,
    pub payment_method: String,
    pub amount_paid: f64,
    pub transaction_id: Option<String>,
    pub customer_email: Option<String>,
}

impl LinkStatus {
    pub fn is_paid(&self) -> bool {
        self.status == LINK_STATUS_PAID
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
    async fn create_link(&self, request: &PaymentLinkRequest) -> Result<PaymentLink, PaymentError>;

    async fn link_status(&self, link_id: &str) -> Result<LinkStatus, PaymentError>;
}
