//! Database Module
//!
//! Embedded SurrealDB (RocksDB engine) and schema bootstrap.

pub mod repository;

use shared::error::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

/// Tables and indexes the repositories rely on.
///
/// Records are schemaless. `cart` and `customer_order` are keyed by customer
/// email, so there is at most one of each per customer.
const SCHEMA: &str = r#"
    DEFINE TABLE IF NOT EXISTS product SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS product_id_unique ON TABLE product FIELDS product_id UNIQUE;
    DEFINE TABLE IF NOT EXISTS cart SCHEMALESS;
    DEFINE TABLE IF NOT EXISTS customer_order SCHEMALESS;
    DEFINE TABLE IF NOT EXISTS rating SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS rating_product ON TABLE rating FIELDS product_id;
    DEFINE TABLE IF NOT EXISTS otp SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS otp_email ON TABLE otp FIELDS email, status;
"#;

/// Database service
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the database at `db_path` and bootstrap the schema
    pub async fn new(db_path: &str, namespace: &str, database: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        db.use_ns(namespace)
            .use_db(database)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        tracing::info!(path = %db_path, "Database connection established (SurrealDB RocksDB)");

        Self::bootstrap(&db).await?;
        Ok(Self { db })
    }

    /// Apply [`SCHEMA`]; every statement is idempotent
    pub async fn bootstrap(db: &Surreal<Db>) -> Result<(), AppError> {
        db.query(SCHEMA)
            .await
            .and_then(|response| response.check())
            .map_err(|e| AppError::database(format!("Failed to apply schema: {e}")))?;
        tracing::info!("Database schema applied");
        Ok(())
    }

    /// Liveness probe used by the health endpoint
    pub async fn ping(&self) -> Result<(), AppError> {
        self.db
            .query("RETURN true")
            .await
            .and_then(|response| response.check())
            .map(|_| ())
            .map_err(|e| AppError::database(e.to_string()))
    }
}
