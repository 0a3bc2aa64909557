//! API 路由模块
//!
//! 所有业务接口挂在 `/api/v1` 下，健康检查在根路径。
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`products`] - 商品目录
//! - [`cart`] - 购物车
//! - [`orders`] - 下单与订单查询
//! - [`otp`] - 邮箱验证码
//! - [`ratings`] - 商品评分
//! - [`payment`] - 支付链接

pub mod cart;
pub mod health;
pub mod middleware;
pub mod orders;
pub mod otp;
pub mod payment;
pub mod products;
pub mod ratings;

use axum::Router;
use axum::middleware as axum_middleware;
use http::{HeaderName, HeaderValue};
use serde::Deserialize;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::core::ServerState;
use crate::utils::validation::normalize_email;
use crate::utils::AppResult;

// Re-export common types for handlers
pub use crate::utils::{ApiResponse, AppError};

pub const API_PREFIX: &str = "/api/v1";

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// `?email=` on customer-scoped reads
#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

impl EmailQuery {
    pub fn customer(&self) -> AppResult<String> {
        normalize_email(&self.email)
    }
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(products::router())
        .merge(cart::router())
        .merge(orders::router())
        .merge(otp::router())
        .merge(ratings::router())
        .merge(payment::router())
}

/// Build the fully layered application
///
/// Used by [`crate::core::Server`] and by the integration tests, which call
/// it as a `tower::Service`.
pub fn build_app(state: ServerState) -> Router {
    build_router()
        .with_state(state)
        // CORS - Handle cross-origin requests
        .layer(CorsLayer::permissive())
        // Compression - Gzip compress responses
        .layer(CompressionLayer::new())
        // Access log
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(TraceLayer::new_for_http())
        // Request ID - outermost, so the access log sees it
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
}
