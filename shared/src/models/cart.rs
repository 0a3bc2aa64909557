//! Cart Model

use serde::{Deserialize, Serialize};

/// One requested product in a cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: i64,
    pub quantity: i32,
    #[serde(default)]
    pub added_at: i64,
}

/// Per-customer staging area, unique by `product_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    /// Customer email
    pub customer_id: String,
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub updated_at: i64,
}

impl Cart {
    pub fn new(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            items: Vec::new(),
            updated_at: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find(&self, product_id: i64) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    /// Drop every line that equals one of `lines`.
    ///
    /// A line whose quantity was changed since `lines` was read survives.
    pub fn remove_lines(&mut self, lines: &[CartItem]) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !lines.contains(item));
        before - self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(product_id: i64, quantity: i32) -> CartItem {
        CartItem {
            product_id,
            quantity,
            added_at: 1,
        }
    }

    #[test]
    fn remove_lines_keeps_changed_and_new_lines() {
        let mut cart = Cart::new("a@example.com");
        cart.items = vec![item(1, 1), item(2, 3), item(3, 1)];

        let snapshot = vec![item(1, 1), item(2, 2)];
        let removed = cart.remove_lines(&snapshot);

        assert_eq!(removed, 1);
        assert_eq!(cart.items, vec![item(2, 3), item(3, 1)]);
    }
}
