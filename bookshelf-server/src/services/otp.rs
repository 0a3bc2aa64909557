//! One-time password issue and verification
//!
//! Codes are six digits, stored only as sha256 hex, single use.

use std::sync::Arc;

use async_trait::async_trait;
use rand::Rng;
use sha2::{Digest, Sha256};
use shared::models::{OtpRecord, OtpStatus};
use shared::now_millis;

use crate::db::repository::OtpRepository;
use crate::orders::OrderLocks;
use crate::security_log;
use crate::utils::{AppError, AppResult, ErrorCode};

/// Delivers a freshly issued code to the customer
#[async_trait]
pub trait OtpMailer: Send + Sync + 'static {
    async fn send_code(&self, email: &str, code: &str, ttl_secs: u64) -> AppResult<()>;
}

/// Writes the delivery to the log instead of sending mail
pub struct LogMailer;

#[async_trait]
impl OtpMailer for LogMailer {
    async fn send_code(&self, email: &str, code: &str, ttl_secs: u64) -> AppResult<()> {
        tracing::info!(to = %email, ttl_secs, "OTP delivery requested");
        tracing::debug!(to = %email, code = %code, "OTP code");
        Ok(())
    }
}

pub fn generate_code() -> String {
    let code: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
    code.to_string()
}

pub fn hash_code(code: &str) -> String {
    hex::encode(Sha256::digest(code.trim().as_bytes()))
}

fn invalid_code(email: &str) -> AppError {
    security_log!(WARN, "otp_invalid", email = %email);
    AppError::with_message(ErrorCode::VerificationCodeInvalid, "Invalid OTP or OTP expired")
}

#[derive(Clone)]
pub struct OtpService {
    repo: OtpRepository,
    mailer: Arc<dyn OtpMailer>,
    locks: Arc<OrderLocks>,
    ttl_secs: u64,
}

impl OtpService {
    pub fn new(
        repo: OtpRepository,
        mailer: Arc<dyn OtpMailer>,
        locks: Arc<OrderLocks>,
        ttl_secs: u64,
    ) -> Self {
        Self {
            repo,
            mailer,
            locks,
            ttl_secs,
        }
    }

    /// Expire earlier codes, store a new one, hand it to the mailer
    ///
    /// Runs under the customer lock so at most one code per email is active.
    pub async fn generate(&self, email: &str) -> AppResult<()> {
        let _guard = self.locks.customers.lock(&email.to_string()).await;
        let superseded = self.repo.expire_active(email).await?;

        let code = generate_code();
        let now = now_millis();
        self.repo
            .create(OtpRecord {
                email: email.to_string(),
                code_hash: hash_code(&code),
                expires_at: now + (self.ttl_secs as i64) * 1000,
                status: OtpStatus::Active,
                created_at: now,
            })
            .await?;

        self.mailer.send_code(email, &code, self.ttl_secs).await?;

        tracing::info!(email = %email, superseded, "OTP issued");
        Ok(())
    }

    /// Check `code`; a matching code is consumed whether or not it expired
    pub async fn verify(&self, email: &str, code: &str) -> AppResult<()> {
        let code_hash = hash_code(code);
        let _guard = self.locks.customers.lock(&email.to_string()).await;

        let record = match self.repo.find_active(email, &code_hash).await? {
            Some(record) => record,
            None => return Err(invalid_code(email)),
        };
        // 条件更新失败说明已被另一个请求消费
        if !self.repo.consume(email, &code_hash).await? {
            return Err(invalid_code(email));
        }

        if record.is_expired_at(now_millis()) {
            security_log!(WARN, "otp_expired", email = %email);
            return Err(AppError::with_message(
                ErrorCode::VerificationCodeExpired,
                "OTP expired",
            ));
        }

        security_log!(INFO, "otp_verified", email = %email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_six_digits() {
        for _ in 0..200 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            assert_ne!(code.as_bytes()[0], b'0');
        }
    }

    #[test]
    fn hash_is_sha256_hex_and_ignores_whitespace() {
        let hash = hash_code("123456");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_code(" 123456\n"));
        assert_ne!(hash, hash_code("123457"));
    }
}
