//! Services Module
//!
//! Business operations sitting between the HTTP handlers and the stores.
//! Placement itself lives in [`crate::orders`].

pub mod cart;
pub mod otp;
pub mod payment;
pub mod ratings;

pub use cart::CartService;
pub use otp::{LogMailer, OtpMailer, OtpService};
pub use payment::{PaymentService, PaymentSync};
pub use ratings::RatingService;
