//! Unified error codes for the bookshelf backend
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Verification (OTP) errors
//! - 4xxx: Order and cart errors
//! - 5xxx: Payment errors
//! - 6xxx: Product and rating errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Serialized as a bare `u16` so clients can switch on the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,

    // ==================== 1xxx: Verification ====================
    /// Verification code does not match an active code
    VerificationCodeInvalid = 1101,
    /// Verification code has expired
    VerificationCodeExpired = 1102,

    // ==================== 4xxx: Order / Cart ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order already paid
    OrderAlreadyPaid = 4002,
    /// Cart is empty or missing
    CartEmpty = 4007,
    /// Cart line quantity is not a positive integer
    InvalidQuantity = 4008,
    /// Cart line not found
    CartItemNotFound = 4009,
    /// Stock kept changing underneath the placement
    StockContention = 4010,

    // ==================== 5xxx: Payment ====================
    /// Payment failed
    PaymentFailed = 5001,
    /// Payment amount must be positive
    PaymentInvalidAmount = 5002,
    /// Phone number cannot be used for a payment link
    PaymentInvalidPhone = 5003,
    /// Payment link not known to the provider
    PaymentLinkNotFound = 5004,
    /// Payment provider returned an error
    PaymentGatewayError = 5005,

    // ==================== 6xxx: Product ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Product price invalid
    ProductInvalidPrice = 6002,
    /// Not enough stock for the requested quantity
    ProductOutOfStock = 6003,
    /// Rating stars out of range
    RatingOutOfRange = 6101,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timed out
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Required field is missing",

            // Verification
            ErrorCode::VerificationCodeInvalid => "Invalid OTP",
            ErrorCode::VerificationCodeExpired => "OTP has expired",

            // Order / Cart
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderAlreadyPaid => "Order has already been paid",
            ErrorCode::CartEmpty => "Your cart is empty.",
            ErrorCode::InvalidQuantity => "Quantity must be a positive integer",
            ErrorCode::CartItemNotFound => "Item not found in cart",
            ErrorCode::StockContention => "Stock changed concurrently, please retry",

            // Payment
            ErrorCode::PaymentFailed => "Payment failed",
            ErrorCode::PaymentInvalidAmount => "Amount must be greater than zero",
            ErrorCode::PaymentInvalidPhone => "Invalid phone number format",
            ErrorCode::PaymentLinkNotFound => "Payment link not found",
            ErrorCode::PaymentGatewayError => "Payment provider error",

            // Product
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::ProductInvalidPrice => "Product price is invalid",
            ErrorCode::ProductOutOfStock => "Product is not available in the requested quantity",
            ErrorCode::RatingOutOfRange => "Rating must be between 1 and 5 stars",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            7 => Ok(ErrorCode::RequiredField),

            // Verification
            1101 => Ok(ErrorCode::VerificationCodeInvalid),
            1102 => Ok(ErrorCode::VerificationCodeExpired),

            // Order / Cart
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderAlreadyPaid),
            4007 => Ok(ErrorCode::CartEmpty),
            4008 => Ok(ErrorCode::InvalidQuantity),
            4009 => Ok(ErrorCode::CartItemNotFound),
            4010 => Ok(ErrorCode::StockContention),

            // Payment
            5001 => Ok(ErrorCode::PaymentFailed),
            5002 => Ok(ErrorCode::PaymentInvalidAmount),
            5003 => Ok(ErrorCode::PaymentInvalidPhone),
            5004 => Ok(ErrorCode::PaymentLinkNotFound),
            5005 => Ok(ErrorCode::PaymentGatewayError),

            // Product
            6001 => Ok(ErrorCode::ProductNotFound),
            6002 => Ok(ErrorCode::ProductInvalidPrice),
            6003 => Ok(ErrorCode::ProductOutOfStock),
            6101 => Ok(ErrorCode::RatingOutOfRange),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
