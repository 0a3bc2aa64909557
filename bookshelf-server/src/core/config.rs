use std::path::PathBuf;
use std::str::FromStr;

use crate::core::error::ServerError;

/// Cashfree sandbox endpoint
pub const CASHFREE_SANDBOX_URL: &str = "https://sandbox.cashfree.com/pg";

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./work_dir | 工作目录 (数据库、日志) |
/// | HTTP_PORT | 8080 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_JSON | false | JSON 日志格式 |
/// | DB_NAMESPACE | bookshelf | SurrealDB namespace |
/// | DB_DATABASE | store | SurrealDB database |
/// | CASHFREE_BASE_URL | sandbox | 支付链接服务地址 |
/// | CASHFREE_APP_ID | - | 支付 client id (非开发环境必填) |
/// | CASHFREE_API_KEY | - | 支付 client secret (非开发环境必填) |
/// | OTP_TTL_SECS | 300 | 验证码有效期 (秒) |
/// | STOCK_RETRY_LIMIT | 3 | 库存 CAS 冲突重试次数 |
/// | LOCK_PRUNE_INTERVAL_SECS | 300 | 空闲锁清理间隔 (秒) |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/bookshelf HTTP_PORT=9000 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录
    pub work_dir: String,
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,
    pub db_namespace: String,
    pub db_database: String,
    pub cashfree_base_url: String,
    pub cashfree_app_id: String,
    pub cashfree_api_key: String,
    pub otp_ttl_secs: u64,
    /// Attempts at the stock compare-and-swap batch before giving up
    pub stock_retry_limit: u32,
    pub lock_prune_interval_secs: u64,
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Require a secret env var: must be set and non-empty outside development.
    fn require_secret(name: &str, environment: &str) -> Result<String, ServerError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(ServerError::Config(format!(
                        "{name} must be set in {environment} environment"
                    )));
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(ServerError::Config(format!(
                "{name} must not be empty in {environment} environment"
            )));
        }
        Ok(val)
    }

    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, ServerError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./work_dir".into()),
            http_port: env_or("HTTP_PORT", 8080),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_or("LOG_JSON", false),
            db_namespace: std::env::var("DB_NAMESPACE").unwrap_or_else(|_| "bookshelf".into()),
            db_database: std::env::var("DB_DATABASE").unwrap_or_else(|_| "store".into()),
            cashfree_base_url: std::env::var("CASHFREE_BASE_URL")
                .unwrap_or_else(|_| CASHFREE_SANDBOX_URL.into()),
            cashfree_app_id: Self::require_secret("CASHFREE_APP_ID", &environment)?,
            cashfree_api_key: Self::require_secret("CASHFREE_API_KEY", &environment)?,
            otp_ttl_secs: env_or("OTP_TTL_SECS", 300),
            stock_retry_limit: env_or("STOCK_RETRY_LIMIT", 3),
            lock_prune_interval_secs: env_or("LOCK_PRUNE_INTERVAL_SECS", 300),
            environment,
        };

        config.validate()?;
        Ok(config)
    }

    /// Development defaults rooted at `work_dir`, ignoring the environment
    ///
    /// 常用于测试场景
    pub fn with_work_dir(work_dir: impl Into<String>) -> Self {
        Self {
            work_dir: work_dir.into(),
            http_port: 0,
            environment: "development".into(),
            log_level: "info".into(),
            log_json: false,
            db_namespace: "bookshelf".into(),
            db_database: "store".into(),
            cashfree_base_url: CASHFREE_SANDBOX_URL.into(),
            cashfree_app_id: "dev-CASHFREE_APP_ID-not-for-production".into(),
            cashfree_api_key: "dev-CASHFREE_API_KEY-not-for-production".into(),
            otp_ttl_secs: 300,
            stock_retry_limit: 3,
            lock_prune_interval_secs: 300,
        }
    }

    fn validate(&self) -> Result<(), ServerError> {
        if self.stock_retry_limit == 0 {
            return Err(ServerError::Config(
                "STOCK_RETRY_LIMIT must be at least 1".into(),
            ));
        }
        if self.otp_ttl_secs == 0 {
            return Err(ServerError::Config("OTP_TTL_SECS must be positive".into()));
        }
        if self.lock_prune_interval_secs == 0 {
            return Err(ServerError::Config(
                "LOCK_PRUNE_INTERVAL_SECS must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// Embedded database location: `<work_dir>/database/bookshelf.db`
    pub fn database_path(&self) -> PathBuf {
        self.database_dir().join("bookshelf.db")
    }

    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.log_dir())?;
        Ok(())
    }
}
