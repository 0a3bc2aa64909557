//! One-time password records

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpStatus {
    Active,
    Expired,
}

/// Stored OTP; only the sha256 hex digest of the code is persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpRecord {
    pub email: String,
    pub code_hash: String,
    pub expires_at: i64,
    pub status: OtpStatus,
    pub created_at: i64,
}

impl OtpRecord {
    pub fn is_expired_at(&self, now: i64) -> bool {
        now > self.expires_at
    }
}
