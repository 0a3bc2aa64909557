//! Payment API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/v1/payment/generate-payment-link | POST | 创建支付链接 |
//! | /api/v1/payment/check-payment-status?link_id= | GET | 查询链接状态 |
//! | /api/v1/payment/update-status | POST | 同步最近一单的支付状态 |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub use handler::{LinkStatusQuery, PaymentLinkBody, UpdateStatusBody};

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/v1/payment", payment_routes())
}

fn payment_routes() -> Router<ServerState> {
    Router::new()
        .route("/generate-payment-link", post(handler::generate_link))
        .route("/check-payment-status", get(handler::check_status))
        .route("/update-status", post(handler::update_status))
}
