//! Shared types for the bookshelf backend
//!
//! Domain models (catalog, cart, order ledger, ratings, OTP) and the
//! unified error/response envelope used by the HTTP layer.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};
pub use util::now_millis;
