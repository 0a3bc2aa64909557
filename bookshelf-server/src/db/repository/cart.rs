//! Cart Repository
//!
//! One record per customer: `cart:⟨email⟩`.

use async_trait::async_trait;
use shared::models::{Cart, CartItem};
use shared::now_millis;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoResult};
use crate::orders::traits::CartStore;

const TABLE: &str = "cart";

#[derive(Clone)]
pub struct CartRepository {
    base: BaseRepository,
}

impl CartRepository {
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
impl CartStore for CartRepository {
    async fn get_cart(&self, customer_id: &str) -> RepoResult<Option<Cart>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * OMIT id FROM $record")
            .bind(("record", Self::record(customer_id)))
            .await?;
        let carts: Vec<Cart> = result.take(0)?;
        Ok(carts.into_iter().next())
    }

    async fn save_cart(&self, mut cart: Cart) -> RepoResult<Cart> {
        cart.updated_at = now_millis();
        self.base
            .db()
            .query("UPSERT $record CONTENT $cart RETURN NONE")
            .bind(("record", Self::record(&cart.customer_id)))
            .bind(("cart", cart.clone()))
            .await?
            .check()?;
        Ok(cart)
    }

    /// `array::complement` keeps every stored line that is not exactly one
    /// of `lines`, so a line re-added or re-sized meanwhile stays.
    async fn remove_lines(&self, customer_id: &str, lines: &[CartItem]) -> RepoResult<()> {
        self.base
            .db()
            .query(
                "UPDATE $record SET items = array::complement(items, $lines), \
                 updated_at = $now RETURN NONE",
            )
            .bind(("record", Self::record(customer_id)))
            .bind(("lines", lines.to_vec()))
            .bind(("now", now_millis()))
            .await?
            .check()?;
        Ok(())
    }
}
