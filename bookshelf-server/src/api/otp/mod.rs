//! OTP API 模块

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub use handler::{OtpGenerateRequest, OtpVerifyRequest};

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/v1/otp/generate", post(handler::generate))
        .route("/api/v1/otp/verify", post(handler::verify))
}
