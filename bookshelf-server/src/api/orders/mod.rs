//! Order API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/v1/orders/place | POST | 购物车下单 (201) |
//! | /api/v1/orders?email= | GET | 订单明细 |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub use handler::PlaceOrderRequest;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/v1/orders", order_routes())
}

fn order_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/place", post(handler::place))
}
