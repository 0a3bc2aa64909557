//! Store boundaries consumed by the reconciler
//!
//! Each trait has a SurrealDB implementation in [`crate::db::repository`] and
//! an in-process one in [`super::memory::MemoryStore`].

use async_trait::async_trait;
use shared::models::{Cart, CartItem, CustomerOrder, OrderLineItem, Product};

use crate::db::repository::RepoResult;

/// Conditional stock write for one product
///
/// Applied only if the stored `available_count` still equals `expected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockChange {
    pub product_id: i64,
    pub expected: i32,
    pub available_count: i32,
    pub is_available: bool,
}

impl StockChange {
    /// Decrement `expected` by `quantity`
    pub fn decrement(product_id: i64, expected: i32, quantity: i32) -> Self {
        let available_count = expected - quantity;
        Self {
            product_id,
            expected,
            available_count,
            is_available: available_count > 0,
        }
    }

    /// The write that undoes this one
    pub fn inverse(&self) -> Self {
        Self {
            product_id: self.product_id,
            expected: self.available_count,
            available_count: self.expected,
            is_available: self.expected > 0,
        }
    }
}

/// Per-item outcome of a stock batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockWrite {
    Applied,
    /// Stored count no longer matched `expected` (or the product vanished)
    Conflict,
}

#[async_trait]
pub trait CartStore: Send + Sync + 'static {
    async fn get_cart(&self, customer_id: &str) -> RepoResult<Option<Cart>>;

    /// Replace the whole cart document
    async fn save_cart(&self, cart: Cart) -> RepoResult<Cart>;

    /// Remove exactly `lines`; lines added or changed since they were read survive
    async fn remove_lines(&self, customer_id: &str, lines: &[CartItem]) -> RepoResult<()>;
}

#[async_trait]
pub trait ProductCatalog: Send + Sync + 'static {
    async fn get_products_by_ids(&self, ids: &[i64]) -> RepoResult<Vec<Product>>;

    /// Issue all changes together as independent compare-and-swap writes.
    ///
    /// Returns one [`StockWrite`] per change, in order.
    async fn apply_stock_changes(&self, changes: &[StockChange]) -> RepoResult<Vec<StockWrite>>;
}

#[async_trait]
pub trait OrderLedger: Send + Sync + 'static {
    async fn find_order(&self, customer_id: &str) -> RepoResult<Option<CustomerOrder>>;

    async fn append_items(&self, customer_id: &str, items: &[OrderLineItem]) -> RepoResult<()>;

    async fn create_order(&self, customer_id: &str, items: &[OrderLineItem]) -> RepoResult<()>;

    /// Remove previously appended lines; a document left empty is deleted
    async fn retract_items(&self, customer_id: &str, items: &[OrderLineItem]) -> RepoResult<()>;

    /// Flip `payment_status` to true on every line stamped with `order_id`.
    ///
    /// Returns how many lines changed.
    async fn mark_paid(&self, customer_id: &str, order_id: &str) -> RepoResult<usize>;
}
