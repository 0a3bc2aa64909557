//! 请求日志中间件
//!
//! 每个请求结束后在 `http_access` target 上记录一行

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

/// 记录请求 ID、方法、路由、状态码和耗时
///
/// 5xx 用 warn，其余用 info。
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();

    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let latency_ms = start.elapsed().as_millis() as u64;

    if response.status().is_server_error() {
        tracing::warn!(
            target: "http_access",
            request_id = %request_id,
            method = %method,
            path = %path,
            status,
            latency_ms,
            "Request failed"
        );
    } else {
        tracing::info!(
            target: "http_access",
            request_id = %request_id,
            method = %method,
            path = %path,
            status,
            latency_ms,
            "Request completed"
        );
    }

    response
}
