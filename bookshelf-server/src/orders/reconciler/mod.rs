//! Order Reconciliation Engine
//!
//! # 下单流程
//!
//! ```text
//! customer lock
//!   ├─ replay guard (order_id already committed?)
//!   ├─ cart load + quantity check
//!   └─ product locks (ascending)
//!        ├─ snapshot ─▶ validate ─▶ CAS batch   (retry on conflict)
//!        ├─ ledger append / create
//!        └─ cart remove_lines
//! ```
//!
//! Validation failures happen before any write. After the stock batch every
//! failing step runs the compensations of the steps before it.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared::models::{
    CartItem, CustomerOrder, OrderLineItem, PaymentMode, Product, ShippingAddress,
};
use shared::now_millis;

use super::error::PlaceOrderError;
use super::locks::OrderLocks;
use super::money;
use super::traits::{CartStore, OrderLedger, ProductCatalog, StockChange, StockWrite};
use crate::audit_log;
use crate::db::repository::{RepoError, RepoResult};

#[cfg(test)]
mod tests;

/// Placement request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrder {
    /// Customer email
    pub customer_id: String,
    pub shipping_address: ShippingAddress,
    pub payment_mode: PaymentMode,
    pub payment_status: bool,
    /// External payment order id; also the idempotency key when present
    pub order_id: Option<String>,
}

/// Result of a successful placement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub customer_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    pub items: Vec<OrderLineItem>,
    pub total_amount: f64,
    /// True when `order_id` had already been committed and nothing was written
    pub replayed: bool,
}

/// Stock decremented for one placement
struct Reservation {
    products: HashMap<i64, Product>,
    changes: Vec<StockChange>,
}

pub struct OrderReconciler {
    carts: Arc<dyn CartStore>,
    catalog: Arc<dyn ProductCatalog>,
    ledger: Arc<dyn OrderLedger>,
    locks: Arc<OrderLocks>,
    stock_retry_limit: u32,
}

impl OrderReconciler {
    pub fn new(
        carts: Arc<dyn CartStore>,
        catalog: Arc<dyn ProductCatalog>,
        ledger: Arc<dyn OrderLedger>,
        locks: Arc<OrderLocks>,
        stock_retry_limit: u32,
    ) -> Self {
        Self {
            carts,
            catalog,
            ledger,
            locks,
            stock_retry_limit: stock_retry_limit.max(1),
        }
    }

    pub fn locks(&self) -> &Arc<OrderLocks> {
        &self.locks
    }

    /// Convert the customer's cart into committed order line items
    pub async fn place_order(
        &self,
        request: PlaceOrder,
    ) -> Result<OrderConfirmation, PlaceOrderError> {
        let customer_id = request.customer_id.as_str();
        let _customer_guard = self.locks.customers.lock(&request.customer_id).await;

        // Ledger writes for this customer happen under the customer lock,
        // so this read stays valid until the append below.
        let existing = self.ledger.find_order(customer_id).await?;

        if let (Some(order_id), Some(order)) = (request.order_id.as_deref(), existing.as_ref()) {
            let committed: Vec<OrderLineItem> = order.items_for_order(order_id).cloned().collect();
            if !committed.is_empty() {
                tracing::info!(customer = %customer_id, order_id = %order_id, "Order already committed, replaying confirmation");
                return self.replay(&request, committed).await;
            }
        }

        let lines = self.load_cart_lines(customer_id).await?;

        let demand = aggregate_demand(&lines)?;
        let _product_guards = self.locks.products.lock_many(demand.keys().copied()).await;

        let reservation = self.reserve_stock(customer_id, &lines, &demand).await?;

        let placed_at = now_millis();
        let items: Vec<OrderLineItem> = lines
            .iter()
            .map(|line| OrderLineItem {
                line_id: uuid::Uuid::new_v4().to_string(),
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: reservation.products.get(&line.product_id).map(|p| p.price),
                payment_mode: request.payment_mode,
                payment_status: request.payment_status,
                order_id: request.order_id.clone(),
                shipping_address: request.shipping_address.clone(),
                date: placed_at,
            })
            .collect();

        if let Err(e) = self.commit_items(customer_id, existing.as_ref(), &items).await {
            tracing::warn!(customer = %customer_id, error = %e, "Ledger write failed, reverting stock");
            self.compensate(customer_id, &reservation.changes, None).await?;
            return Err(e.into());
        }

        if let Err(e) = self.carts.remove_lines(customer_id, &lines).await {
            tracing::warn!(customer = %customer_id, error = %e, "Cart clear failed, rolling back placement");
            self.compensate(customer_id, &reservation.changes, Some(&items))
                .await?;
            return Err(e.into());
        }

        let total_amount = total_for(&items, &reservation.products);

        audit_log!(
            customer_id,
            "place_order",
            format!(
                "order:{}",
                request.order_id.as_deref().unwrap_or("cash_on_delivery")
            ),
            format!("{} lines, total {:.2}", items.len(), total_amount)
        );

        Ok(OrderConfirmation {
            customer_id: request.customer_id.clone(),
            order_id: request.order_id.clone(),
            items,
            total_amount,
            replayed: false,
        })
    }

    /// All committed line items of a customer, oldest appended first
    pub async fn get_orders(&self, customer_id: &str) -> RepoResult<Vec<OrderLineItem>> {
        Ok(self
            .ledger
            .find_order(customer_id)
            .await?
            .map(|order| order.items)
            .unwrap_or_default())
    }

    async fn load_cart_lines(&self, customer_id: &str) -> Result<Vec<CartItem>, PlaceOrderError> {
        let lines = match self.carts.get_cart(customer_id).await? {
            Some(cart) if !cart.is_empty() => cart.items,
            _ => return Err(PlaceOrderError::EmptyCart),
        };

        if let Some(bad) = lines.iter().find(|line| line.quantity < 1) {
            return Err(PlaceOrderError::InvalidQuantity {
                product_id: bad.product_id,
                quantity: bad.quantity,
            });
        }

        Ok(lines)
    }

    /// Validate against a fresh snapshot and apply the CAS batch.
    ///
    /// On conflict the applied part is reverted and the whole round repeats,
    /// so a retry may end in `InsufficientStock`.
    async fn reserve_stock(
        &self,
        customer_id: &str,
        lines: &[CartItem],
        demand: &BTreeMap<i64, i32>,
    ) -> Result<Reservation, PlaceOrderError> {
        let ids: Vec<i64> = demand.keys().copied().collect();
        let mut attempt = 0;

        loop {
            attempt += 1;

            let snapshot = self.catalog.get_products_by_ids(&ids).await?;
            let products: HashMap<i64, Product> = snapshot
                .into_iter()
                .map(|product| (product.product_id, product))
                .collect();

            validate_against_snapshot(lines, demand, &products)?;

            let changes: Vec<StockChange> = demand
                .iter()
                .map(|(id, quantity)| {
                    let current = products.get(id).map_or(0, |p| p.available_count);
                    StockChange::decrement(*id, current, *quantity)
                })
                .collect();

            let results = match self.catalog.apply_stock_changes(&changes).await {
                Ok(results) => results,
                Err(e) => {
                    // Outcome unknown: the inverse CAS only matches writes that landed
                    tracing::warn!(customer = %customer_id, error = %e, "Stock batch failed, reverting");
                    self.revert_stock(customer_id, &changes, false).await?;
                    return Err(e.into());
                }
            };

            let mut applied = Vec::with_capacity(changes.len());
            let mut conflicted = None;
            for (change, result) in changes.iter().zip(results.iter()) {
                match result {
                    StockWrite::Applied => applied.push(*change),
                    StockWrite::Conflict => {
                        conflicted.get_or_insert(change.product_id);
                    }
                }
            }

            let Some(product_id) = conflicted else {
                if results.len() != changes.len() {
                    self.revert_stock(customer_id, &applied, true).await?;
                    return Err(RepoError::Database(format!(
                        "Stock batch returned {} results for {} writes",
                        results.len(),
                        changes.len()
                    ))
                    .into());
                }
                return Ok(Reservation { products, changes });
            };

            self.revert_stock(customer_id, &applied, true).await?;

            if attempt >= self.stock_retry_limit {
                tracing::warn!(customer = %customer_id, product_id, attempt, "Stock contention, giving up");
                return Err(PlaceOrderError::StockContention { product_id });
            }
            tracing::debug!(customer = %customer_id, product_id, attempt, "Stock changed underneath, retrying");
        }
    }

    async fn commit_items(
        &self,
        customer_id: &str,
        existing: Option<&CustomerOrder>,
        items: &[OrderLineItem],
    ) -> RepoResult<()> {
        match existing {
            Some(_) => self.ledger.append_items(customer_id, items).await,
            None => self.ledger.create_order(customer_id, items).await,
        }
    }

    /// Undo a partially applied placement: retract `items` from the ledger,
    /// then restore stock for `changes`.
    ///
    /// A failed compensation is recorded on the audit log and returned as
    /// `Persistence`; the caller then reports it instead of the original error.
    async fn compensate(
        &self,
        customer_id: &str,
        changes: &[StockChange],
        items: Option<&[OrderLineItem]>,
    ) -> Result<(), PlaceOrderError> {
        if let Some(items) = items
            && let Err(e) = self.ledger.retract_items(customer_id, items).await
        {
            tracing::error!(
                target: "audit",
                customer = %customer_id,
                error = %e,
                lines = items.len(),
                "Compensation failed: order lines could not be retracted"
            );
            return Err(e.into());
        }

        let restored = self.revert_stock(customer_id, changes, true).await?;
        tracing::info!(
            target: "audit",
            customer = %customer_id,
            restored,
            retracted = items.map_or(0, <[OrderLineItem]>::len),
            "Placement compensated"
        );
        Ok(())
    }

    /// Apply the inverse of `changes`.
    ///
    /// With `strict`, every change is known to have landed and an inverse
    /// that conflicts is a failure. Otherwise conflicts mark writes that
    /// never landed and are skipped.
    async fn revert_stock(
        &self,
        customer_id: &str,
        changes: &[StockChange],
        strict: bool,
    ) -> Result<usize, PlaceOrderError> {
        if changes.is_empty() {
            return Ok(0);
        }

        let inverse: Vec<StockChange> = changes.iter().map(StockChange::inverse).collect();
        let results = match self.catalog.apply_stock_changes(&inverse).await {
            Ok(results) => results,
            Err(e) => {
                tracing::error!(
                    target: "audit",
                    customer = %customer_id,
                    error = %e,
                    "Compensation failed: stock could not be restored"
                );
                return Err(e.into());
            }
        };

        let stuck: Vec<i64> = inverse
            .iter()
            .zip(results.iter())
            .filter(|(_, result)| **result == StockWrite::Conflict)
            .map(|(change, _)| change.product_id)
            .collect();

        if strict && !stuck.is_empty() {
            tracing::error!(
                target: "audit",
                customer = %customer_id,
                products = ?stuck,
                "Compensation failed: stock changed before it could be restored"
            );
            return Err(RepoError::Database(format!(
                "Stock for products {stuck:?} could not be restored"
            ))
            .into());
        }

        Ok(results.len() - stuck.len())
    }

    /// Rebuild the confirmation of an already committed order
    ///
    /// The total comes from the prices recorded on the lines; the catalog
    /// is consulted only for lines that carry none.
    async fn replay(
        &self,
        request: &PlaceOrder,
        items: Vec<OrderLineItem>,
    ) -> Result<OrderConfirmation, PlaceOrderError> {
        let mut ids: Vec<i64> = items
            .iter()
            .filter(|item| item.unit_price.is_none())
            .map(|item| item.product_id)
            .collect();
        ids.sort_unstable();
        ids.dedup();

        let products: HashMap<i64, Product> = if ids.is_empty() {
            HashMap::new()
        } else {
            self.catalog
                .get_products_by_ids(&ids)
                .await?
                .into_iter()
                .map(|product| (product.product_id, product))
                .collect()
        };

        Ok(OrderConfirmation {
            customer_id: request.customer_id.clone(),
            order_id: request.order_id.clone(),
            total_amount: total_for(&items, &products),
            items,
            replayed: true,
        })
    }
}

/// Requested quantity per product (a cart holds one line per product, but
/// duplicates are summed rather than trusted away)
fn aggregate_demand(lines: &[CartItem]) -> Result<BTreeMap<i64, i32>, PlaceOrderError> {
    let mut demand = BTreeMap::new();
    for line in lines {
        let total = demand.entry(line.product_id).or_insert(0i32);
        *total = total
            .checked_add(line.quantity)
            .ok_or(PlaceOrderError::InvalidQuantity {
                product_id: line.product_id,
                quantity: line.quantity,
            })?;
    }
    Ok(demand)
}

/// Every product must exist before any stock is checked; stock is checked
/// against the snapshot, never incrementally.
fn validate_against_snapshot(
    lines: &[CartItem],
    demand: &BTreeMap<i64, i32>,
    products: &HashMap<i64, Product>,
) -> Result<(), PlaceOrderError> {
    if let Some(missing) = lines
        .iter()
        .find(|line| !products.contains_key(&line.product_id))
    {
        return Err(PlaceOrderError::ProductNotFound {
            product_id: missing.product_id,
        });
    }

    for line in lines {
        let Some(product) = products.get(&line.product_id) else {
            continue;
        };
        let requested = demand.get(&line.product_id).copied().unwrap_or(line.quantity);
        if product.available_count < requested {
            return Err(PlaceOrderError::InsufficientStock {
                product_id: product.product_id,
                title: product.title.clone(),
                requested,
                available: product.available_count,
            });
        }
    }

    Ok(())
}

fn total_for(items: &[OrderLineItem], products: &HashMap<i64, Product>) -> f64 {
    money::order_total(items.iter().map(|item| {
        let price = item
            .unit_price
            .or_else(|| products.get(&item.product_id).map(|p| p.price))
            .unwrap_or(0.0);
        (price, item.quantity)
    }))
}
