//! OTP API Handlers

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::utils::validation::normalize_email;
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpGenerateRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpVerifyRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub otp: String,
}

/// POST /api/v1/otp/generate
pub async fn generate(
    State(state): State<ServerState>,
    Json(req): Json<OtpGenerateRequest>,
) -> AppResult<ApiResponse<()>> {
    if req.email.trim().is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "Email is required",
        ));
    }
    let email = normalize_email(&req.email)?;
    state.otp.generate(&email).await?;
    Ok(ApiResponse::message("OTP sent successfully"))
}

/// POST /api/v1/otp/verify
pub async fn verify(
    State(state): State<ServerState>,
    Json(req): Json<OtpVerifyRequest>,
) -> AppResult<ApiResponse<()>> {
    if req.email.trim().is_empty() || req.otp.trim().is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "Missing fields",
        ));
    }
    let email = normalize_email(&req.email)?;
    state.otp.verify(&email, &req.otp).await?;
    Ok(ApiResponse::message("OTP verified successfully"))
}
