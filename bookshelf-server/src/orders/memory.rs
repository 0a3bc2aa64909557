//! In-process store implementing all three store traits
//!
//! Used by tests and for embedding the reconciler without a database.
//! Supports fault injection to exercise the compensation paths.

use async_trait::async_trait;
use shared::models::{Cart, CartItem, CustomerOrder, OrderLineItem, Product};
use shared::now_millis;
use std::collections::{BTreeMap, HashMap, HashSet};
use tokio::sync::Mutex;

use super::traits::{CartStore, OrderLedger, ProductCatalog, StockChange, StockWrite};
use crate::db::repository::{RepoError, RepoResult};

/// Operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    /// A stock batch that decrements counts
    StockWrite,
    /// A stock batch that restores counts
    StockRevert,
    LedgerAppend,
    LedgerCreate,
    LedgerRetract,
    CartClear,
}

#[derive(Default)]
struct MemoryState {
    products: BTreeMap<i64, Product>,
    carts: HashMap<String, Cart>,
    orders: HashMap<String, CustomerOrder>,
    fail_points: HashSet<FailPoint>,
    forced_conflicts: HashMap<i64, u32>,
    external_sales: HashMap<i64, i32>,
    writes: usize,
}

impl MemoryState {
    fn check(&self, point: FailPoint) -> RepoResult<()> {
        if self.fail_points.contains(&point) {
            return Err(RepoError::Database(format!("injected failure at {point:?}")));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Seeding & inspection (not counted as writes) ==========

    pub async fn insert_product(&self, product: Product) {
        let mut state = self.state.lock().await;
        state.products.insert(product.product_id, product);
    }

    pub async fn put_cart(&self, cart: Cart) {
        let mut state = self.state.lock().await;
        state.carts.insert(cart.customer_id.clone(), cart);
    }

    pub async fn product(&self, product_id: i64) -> Option<Product> {
        self.state.lock().await.products.get(&product_id).cloned()
    }

    pub async fn cart(&self, customer_id: &str) -> Option<Cart> {
        self.state.lock().await.carts.get(customer_id).cloned()
    }

    pub async fn order(&self, customer_id: &str) -> Option<CustomerOrder> {
        self.state.lock().await.orders.get(customer_id).cloned()
    }

    /// Number of mutations performed through the store traits
    pub async fn write_count(&self) -> usize {
        self.state.lock().await.writes
    }

    // ========== Fault injection ==========

    pub async fn fail_on(&self, point: FailPoint) {
        self.state.lock().await.fail_points.insert(point);
    }

    pub async fn clear_failures(&self) {
        self.state.lock().await.fail_points.clear();
    }

    /// Report the next `times` CAS writes on `product_id` as conflicts
    pub async fn force_conflicts(&self, product_id: i64, times: u32) {
        self.state
            .lock()
            .await
            .forced_conflicts
            .insert(product_id, times);
    }

    /// Simulate another process selling `quantity` units right before the
    /// next CAS write on `product_id`
    pub async fn inject_external_sale(&self, product_id: i64, quantity: i32) {
        self.state
            .lock()
            .await
            .external_sales
            .insert(product_id, quantity);
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn get_cart(&self, customer_id: &str) -> RepoResult<Option<Cart>> {
        Ok(self.state.lock().await.carts.get(customer_id).cloned())
    }

    async fn save_cart(&self, mut cart: Cart) -> RepoResult<Cart> {
        let mut state = self.state.lock().await;
        cart.updated_at = now_millis();
        state.carts.insert(cart.customer_id.clone(), cart.clone());
        state.writes += 1;
        Ok(cart)
    }

    async fn remove_lines(&self, customer_id: &str, lines: &[CartItem]) -> RepoResult<()> {
        let mut state = self.state.lock().await;
        state.check(FailPoint::CartClear)?;
        if let Some(cart) = state.carts.get_mut(customer_id) {
            cart.remove_lines(lines);
            cart.updated_at = now_millis();
        }
        state.writes += 1;
        Ok(())
    }
}

#[async_trait]
impl ProductCatalog for MemoryStore {
    async fn get_products_by_ids(&self, ids: &[i64]) -> RepoResult<Vec<Product>> {
        let state = self.state.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.products.get(id).cloned())
            .collect())
    }

    async fn apply_stock_changes(&self, changes: &[StockChange]) -> RepoResult<Vec<StockWrite>> {
        let mut state = self.state.lock().await;
        let restoring = changes.iter().all(|c| c.available_count > c.expected);
        state.check(if restoring {
            FailPoint::StockRevert
        } else {
            FailPoint::StockWrite
        })?;

        let mut results = Vec::with_capacity(changes.len());
        for change in changes {
            if let Some(quantity) = state.external_sales.remove(&change.product_id)
                && let Some(product) = state.products.get_mut(&change.product_id)
            {
                product.available_count -= quantity;
                product.is_available = product.available_count > 0;
            }

            if let Some(left) = state.forced_conflicts.get_mut(&change.product_id)
                && *left > 0
            {
                *left -= 1;
                results.push(StockWrite::Conflict);
                continue;
            }

            match state.products.get_mut(&change.product_id) {
                Some(product) if product.available_count == change.expected => {
                    product.available_count = change.available_count;
                    product.is_available = change.is_available;
                    results.push(StockWrite::Applied);
                }
                _ => results.push(StockWrite::Conflict),
            }
        }
        state.writes += 1;
        Ok(results)
    }
}

#[async_trait]
impl OrderLedger for MemoryStore {
    async fn find_order(&self, customer_id: &str) -> RepoResult<Option<CustomerOrder>> {
        Ok(self.state.lock().await.orders.get(customer_id).cloned())
    }

    async fn append_items(&self, customer_id: &str, items: &[OrderLineItem]) -> RepoResult<()> {
        let mut state = self.state.lock().await;
        state.check(FailPoint::LedgerAppend)?;
        let order = state
            .orders
            .get_mut(customer_id)
            .ok_or_else(|| RepoError::NotFound(format!("Order for {customer_id} not found")))?;
        order.items.extend_from_slice(items);
        order.updated_at = now_millis();
        state.writes += 1;
        Ok(())
    }

    async fn create_order(&self, customer_id: &str, items: &[OrderLineItem]) -> RepoResult<()> {
        let mut state = self.state.lock().await;
        state.check(FailPoint::LedgerCreate)?;
        if state.orders.contains_key(customer_id) {
            return Err(RepoError::Duplicate(format!(
                "Order for {customer_id} already exists"
            )));
        }
        let now = now_millis();
        state.orders.insert(
            customer_id.to_string(),
            CustomerOrder {
                customer_id: customer_id.to_string(),
                items: items.to_vec(),
                created_at: now,
                updated_at: now,
            },
        );
        state.writes += 1;
        Ok(())
    }

    async fn retract_items(&self, customer_id: &str, items: &[OrderLineItem]) -> RepoResult<()> {
        let mut state = self.state.lock().await;
        state.check(FailPoint::LedgerRetract)?;
        let emptied = match state.orders.get_mut(customer_id) {
            Some(order) => {
                order
                    .items
                    .retain(|line| !items.iter().any(|i| i.line_id == line.line_id));
                order.items.is_empty()
            }
            None => false,
        };
        if emptied {
            state.orders.remove(customer_id);
        }
        state.writes += 1;
        Ok(())
    }

    async fn mark_paid(&self, customer_id: &str, order_id: &str) -> RepoResult<usize> {
        let mut state = self.state.lock().await;
        let Some(order) = state.orders.get_mut(customer_id) else {
            return Ok(0);
        };
        let mut changed = 0;
        for line in order
            .items
            .iter_mut()
            .filter(|line| line.order_id.as_deref() == Some(order_id) && !line.payment_status)
        {
            line.payment_status = true;
            changed += 1;
        }
        if changed > 0 {
            order.updated_at = now_millis();
            state.writes += 1;
        }
        Ok(changed)
    }
}
