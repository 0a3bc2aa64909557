//! Data models
//!
//! Shared between the server and API clients. Timestamps are Unix millis.
//! Customers are identified by email.

pub mod cart;
pub mod order;
pub mod otp;
pub mod product;
pub mod rating;

// Re-exports
pub use cart::*;
pub use order::*;
pub use otp::*;
pub use product::*;
pub use rating::*;
