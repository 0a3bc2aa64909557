//! 健康检查路由
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /health | GET | 存活 + 数据库检查 |
//!
//! ```json
//! { "status": "ok", "version": "0.1.0", "database": "ok" }
//! ```

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// ok | degraded
    pub status: String,
    pub version: String,
    /// ok | error
    pub database: String,
}

/// 数据库不可用时返回 503
async fn health(State(state): State<ServerState>) -> (StatusCode, Json<HealthResponse>) {
    let (status, code, database) = match state.db.ping().await {
        Ok(()) => ("ok", StatusCode::OK, "ok"),
        Err(e) => {
            tracing::error!(error = %e.message, "Health check: database unreachable");
            ("degraded", StatusCode::SERVICE_UNAVAILABLE, "error")
        }
    };

    (
        code,
        Json(HealthResponse {
            status: status.into(),
            version: env!("CARGO_PKG_VERSION").into(),
            database: database.into(),
        }),
    )
}
