//! OTP Repository
//!
//! Codes are looked up by `(email, code_hash)`; at most one per email is
//! active because issuing a new code expires the previous ones.

use shared::models::{OtpRecord, OtpStatus};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoResult};

#[derive(Clone)]
pub struct OtpRepository {
    base: BaseRepository,
}

impl OtpRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Expire every active code of `email`; returns how many were active
    pub async fn expire_active(&self, email: &str) -> RepoResult<usize> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE otp SET status = $expired WHERE email = $email AND status = $active \
                 RETURN VALUE email",
            )
            .bind(("email", email.to_string()))
            .bind(("active", OtpStatus::Active))
            .bind(("expired", OtpStatus::Expired))
            .await?;
        let expired: Vec<String> = result.take(0)?;
        Ok(expired.len())
    }

    pub async fn create(&self, record: OtpRecord) -> RepoResult<()> {
        self.base
            .db()
            .query("CREATE otp CONTENT $record RETURN NONE")
            .bind(("record", record))
            .await?
            .check()?;
        Ok(())
    }

    pub async fn find_active(&self, email: &str, code_hash: &str) -> RepoResult<Option<OtpRecord>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * OMIT id FROM otp \
                 WHERE email = $email AND code_hash = $code_hash AND status = $active LIMIT 1",
            )
            .bind(("email", email.to_string()))
            .bind(("code_hash", code_hash.to_string()))
            .bind(("active", OtpStatus::Active))
            .await?;
        let records: Vec<OtpRecord> = result.take(0)?;
        Ok(records.into_iter().next())
    }

    /// Flip one active code to expired; `false` when it was no longer active
    pub async fn consume(&self, email: &str, code_hash: &str) -> RepoResult<bool> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE otp SET status = $expired \
                 WHERE email = $email AND code_hash = $code_hash AND status = $active \
                 RETURN VALUE email",
            )
            .bind(("email", email.to_string()))
            .bind(("code_hash", code_hash.to_string()))
            .bind(("active", OtpStatus::Active))
            .bind(("expired", OtpStatus::Expired))
            .await?;
        let consumed: Vec<String> = result.take(0)?;
        Ok(!consumed.is_empty())
    }
}
