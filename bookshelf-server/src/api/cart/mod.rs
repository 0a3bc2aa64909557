//! Cart API 模块

mod handler;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::core::ServerState;

pub use handler::CartLineRequest;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/v1/cart", cart_routes())
}

fn cart_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::get_cart))
        .route("/items", post(handler::add_item).put(handler::set_quantity))
        .route("/items/{product_id}", delete(handler::remove_item))
}
