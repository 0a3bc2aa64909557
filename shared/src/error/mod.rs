//! Unified error system
//!
//! - [`ErrorCode`]: numeric codes shared with clients
//! - [`ErrorCategory`]: classification by code range
//! - [`AppError`]: error with code, message and optional details
//! - [`ApiResponse`]: the JSON envelope every endpoint returns
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! let err = AppError::with_message(ErrorCode::CartEmpty, "Your cart is empty.")
//!     .with_detail("customer_id", "reader@example.com");
//!
//! let response = ApiResponse::<()>::error(&err);
//! assert_eq!(response.code, Some(4007));
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
