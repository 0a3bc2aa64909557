//! Order Repository
//!
//! One ledger document per customer: `customer_order:⟨email⟩`.

use async_trait::async_trait;
use shared::models::{CustomerOrder, OrderLineItem};
use shared::now_millis;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoError, RepoResult};
use crate::orders::traits::OrderLedger;

const TABLE: &str = "customer_order";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    fn record(customer_id: &str) -> RecordId {
        RecordId::from_table_key(TABLE, customer_id)
    }
}

#[async_trait]
impl OrderLedger for OrderRepository {
    async fn find_order(&self, customer_id: &str) -> RepoResult<Option<CustomerOrder>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * OMIT id FROM $record")
            .bind(("record", Self::record(customer_id)))
            .await?;
        let orders: Vec<CustomerOrder> = result.take(0)?;
        Ok(orders.into_iter().next())
    }

    async fn append_items(&self, customer_id: &str, items: &[OrderLineItem]) -> RepoResult<()> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $record SET items = array::concat(items, $items), updated_at = $now \
                 RETURN VALUE customer_id",
            )
            .bind(("record", Self::record(customer_id)))
            .bind(("items", items.to_vec()))
            .bind(("now", now_millis()))
            .await?;
        let updated: Vec<String> = result.take(0)?;
        if updated.is_empty() {
            return Err(RepoError::NotFound(format!(
                "Order for {customer_id} not found"
            )));
        }
        Ok(())
    }

    /// Fails with `Duplicate` when the document already exists
    async fn create_order(&self, customer_id: &str, items: &[OrderLineItem]) -> RepoResult<()> {
        let now = now_millis();
        let order = CustomerOrder {
            customer_id: customer_id.to_string(),
            items: items.to_vec(),
            created_at: now,
            updated_at: now,
        };
        self.base
            .db()
            .query("CREATE $record CONTENT $order RETURN NONE")
            .bind(("record", Self::record(customer_id)))
            .bind(("order", order))
            .await?
            .check()?;
        Ok(())
    }

    async fn retract_items(&self, customer_id: &str, items: &[OrderLineItem]) -> RepoResult<()> {
        let line_ids: Vec<String> = items.iter().map(|item| item.line_id.clone()).collect();
        self.base
            .db()
            .query(
                "UPDATE $record SET items = items[WHERE line_id NOTINSIDE $line_ids], \
                 updated_at = $now RETURN NONE;
                 DELETE $record WHERE array::len(items) = 0 RETURN NONE;",
            )
            .bind(("record", Self::record(customer_id)))
            .bind(("line_ids", line_ids))
            .bind(("now", now_millis()))
            .await?
            .check()?;
        Ok(())
    }

    /// Read-modify-write; callers hold the customer lock
    async fn mark_paid(&self, customer_id: &str, order_id: &str) -> RepoResult<usize> {
        let Some(mut order) = self.find_order(customer_id).await? else {
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
        if changed == 0 {
            return Ok(0);
        }

        self.base
            .db()
            .query("UPDATE $record SET items = $items, updated_at = $now RETURN NONE")
            .bind(("record", Self::record(customer_id)))
            .bind(("items", order.items))
            .bind(("now", now_millis()))
            .await?
            .check()?;
        Ok(changed)
    }
}
