//! Rating API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/v1/ratings", post(handler::create))
        .route("/api/v1/ratings/{product_id}", get(handler::list_for_product))
}
