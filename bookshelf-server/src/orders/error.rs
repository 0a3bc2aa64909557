use shared::error::{AppError, ErrorCode};
use thiserror::Error;

use crate::db::repository::RepoError;

/// Order placement errors
///
/// Everything except `Persistence` is raised before any write.
#[derive(Debug, Error)]
pub enum PlaceOrderError {
    #[error("Cart is empty!")]
    EmptyCart,

    #[error("Invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity { product_id: i64, quantity: i32 },

    #[error("Book with ID {product_id} not found.")]
    ProductNotFound { product_id: i64 },

    #[error("Book \"{title}\" is not available in the requested quantity.")]
    InsufficientStock {
        product_id: i64,
        title: String,
        requested: i32,
        available: i32,
    },

    #[error("Stock for product {product_id} kept changing, please retry")]
    StockContention { product_id: i64 },

    #[error("Persistence error: {0}")]
    Persistence(#[from] RepoError),
}

impl PlaceOrderError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::EmptyCart => ErrorCode::CartEmpty,
            Self::InvalidQuantity { .. } => ErrorCode::InvalidQuantity,
            Self::ProductNotFound { .. } => ErrorCode::ProductNotFound,
            Self::InsufficientStock { .. } => ErrorCode::ProductOutOfStock,
            Self::StockContention { .. } => ErrorCode::StockContention,
            Self::Persistence(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<PlaceOrderError> for AppError {
    fn from(err: PlaceOrderError) -> Self {
        let code = err.code();
        let message = err.to_string();
        match err {
            PlaceOrderError::EmptyCart => AppError::with_message(code, message),
            PlaceOrderError::InvalidQuantity {
                product_id,
                quantity,
            } => AppError::with_message(code, message)
                .with_detail("product_id", product_id)
                .with_detail("quantity", quantity),
            PlaceOrderError::ProductNotFound { product_id }
            | PlaceOrderError::StockContention { product_id } => {
                AppError::with_message(code, message).with_detail("product_id", product_id)
            }
            PlaceOrderError::InsufficientStock {
                product_id,
                title,
                requested,
                available,
            } => AppError::with_message(code, message)
                .with_detail("product_id", product_id)
                .with_detail("title", title)
                .with_detail("requested", requested)
                .with_detail("available", available),
            PlaceOrderError::Persistence(e) => {
                tracing::error!(error = %e, "Order placement failed in storage");
                AppError::with_message(code, message)
            }
        }
    }
}
