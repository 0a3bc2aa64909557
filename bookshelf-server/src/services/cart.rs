//! Cart operations
//!
//! Every write takes the customer lock, so cart edits never interleave with
//! a placement reading and clearing the same cart.

use std::sync::Arc;

use shared::models::{Cart, CartItem};
use shared::now_millis;

use crate::orders::{CartStore, OrderLocks, ProductCatalog};
use crate::utils::{AppError, AppResult, ErrorCode};

pub struct CartService {
    carts: Arc<dyn CartStore>,
    catalog: Arc<dyn ProductCatalog>,
    locks: Arc<OrderLocks>,
}

impl CartService {
    pub fn new(
        carts: Arc<dyn CartStore>,
        catalog: Arc<dyn ProductCatalog>,
        locks: Arc<OrderLocks>,
    ) -> Self {
        Self {
            carts,
            catalog,
            locks,
        }
    }

    /// The customer's cart; an empty one when none is stored
    pub async fn get_cart(&self, customer_id: &str) -> AppResult<Cart> {
        Ok(self
            .carts
            .get_cart(customer_id)
            .await?
            .unwrap_or_else(|| Cart::new(customer_id)))
    }

    /// Add `quantity` of a product; an existing line is incremented
    pub async fn add_item(&self, customer_id: &str, product_id: i64, quantity: i32) -> AppResult<Cart> {
        check_quantity(product_id, quantity)?;
        self.ensure_product(product_id).await?;

        let _guard = self.locks.customers.lock(&customer_id.to_string()).await;
        let mut cart = self.get_cart(customer_id).await?;

        match cart.items.iter_mut().find(|item| item.product_id == product_id) {
            Some(item) => {
                item.quantity = item.quantity.checked_add(quantity).ok_or_else(|| {
                    AppError::with_message(ErrorCode::InvalidQuantity, "Quantity too large")
                        .with_detail("product_id", product_id)
                })?;
            }
            None => cart.items.push(CartItem {
                product_id,
                quantity,
                added_at: now_millis(),
            }),
        }

        tracing::debug!(customer = %customer_id, product_id, quantity, "Cart item added");
        Ok(self.carts.save_cart(cart).await?)
    }

    /// Replace the quantity of an existing line
    pub async fn set_quantity(
        &self,
        customer_id: &str,
        product_id: i64,
        quantity: i32,
    ) -> AppResult<Cart> {
        check_quantity(product_id, quantity)?;

        let _guard = self.locks.customers.lock(&customer_id.to_string()).await;
        let mut cart = self.get_cart(customer_id).await?;

        let item = cart
            .items
            .iter_mut()
            .find(|item| item.product_id == product_id)
            .ok_or_else(|| line_not_found(product_id))?;
        item.quantity = quantity;

        Ok(self.carts.save_cart(cart).await?)
    }

    pub async fn remove_item(&self, customer_id: &str, product_id: i64) -> AppResult<Cart> {
        let _guard = self.locks.customers.lock(&customer_id.to_string()).await;
        let mut cart = self.get_cart(customer_id).await?;

        let before = cart.items.len();
        cart.items.retain(|item| item.product_id != product_id);
        if cart.items.len() == before {
            return Err(line_not_found(product_id));
        }

        Ok(self.carts.save_cart(cart).await?)
    }

    async fn ensure_product(&self, product_id: i64) -> AppResult<()> {
        let found = self.catalog.get_products_by_ids(&[product_id]).await?;
        if found.is_empty() {
            return Err(
                AppError::with_message(
                    ErrorCode::ProductNotFound,
                    format!("Book with ID {product_id} not found."),
                )
                .with_detail("product_id", product_id),
            );
        }
        Ok(())
    }
}

fn check_quantity(product_id: i64, quantity: i32) -> AppResult<()> {
    if quantity < 1 {
        return Err(AppError::with_message(
            ErrorCode::InvalidQuantity,
            format!("Quantity must be at least 1, got {quantity}"),
        )
        .with_detail("product_id", product_id));
    }
    Ok(())
}

fn line_not_found(product_id: i64) -> AppError {
    AppError::with_message(
        ErrorCode::CartItemNotFound,
        format!("Product {product_id} is not in the cart"),
    )
    .with_detail("product_id", product_id)
}
