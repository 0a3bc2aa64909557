//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::OrderNotFound
            | Self::CartItemNotFound
            | Self::ProductNotFound
            | Self::PaymentLinkNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::OrderAlreadyPaid
            | Self::ProductOutOfStock
            | Self::StockContention => StatusCode::CONFLICT,

            // 502 Bad Gateway (upstream provider)
            Self::PaymentGatewayError => StatusCode::BAD_GATEWAY,

            // 503 Service Unavailable (transient, client can retry)
            Self::NetworkError | Self::TimeoutError => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::Unknown | Self::InternalError | Self::DatabaseError | Self::ConfigError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            // 400 Bad Request (validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placement_statuses() {
        assert_eq!(ErrorCode::CartEmpty.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::InvalidQuantity.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::ProductNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ErrorCode::ProductOutOfStock.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ErrorCode::StockContention.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ErrorCode::DatabaseError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_otp_failures_are_bad_requests() {
        assert_eq!(
            ErrorCode::VerificationCodeInvalid.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::VerificationCodeExpired.http_status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_payment_statuses() {
        assert_eq!(
            ErrorCode::PaymentInvalidPhone.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::PaymentGatewayError.http_status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ErrorCode::NetworkError.http_status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
