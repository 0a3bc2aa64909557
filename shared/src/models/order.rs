//! Order Model
//!
//! One order document per customer holding an append-only list of line items.

use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// How the customer pays for a placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMode {
    #[serde(rename = "cashOnDelivery")]
    CashOnDelivery,
    #[serde(rename = "upiorcard")]
    UpiOrCard,
}

impl PaymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CashOnDelivery => "cashOnDelivery",
            Self::UpiOrCard => "upiorcard",
        }
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ShippingAddress {
    #[validate(length(min = 1, max = 500))]
    pub address: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 1, max = 20))]
    pub postal_code: String,
    #[validate(length(min = 1, max = 100))]
    pub country: String,
}

/// Committed purchase of one product
///
/// Immutable once written, except `payment_status` which only flips from
/// false to true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineItem {
    /// Unique line id (uuid v4), used to retract lines on compensation
    pub line_id: String,
    pub product_id: i64,
    pub quantity: i32,
    /// Catalog price when the line was placed; absent on lines written
    /// before prices were recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    pub payment_mode: PaymentMode,
    pub payment_status: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    pub shipping_address: ShippingAddress,
    /// Placement time (Unix millis)
    pub date: i64,
}

/// Per-customer order ledger document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerOrder {
    /// Customer email
    pub customer_id: String,
    #[serde(default)]
    pub items: Vec<OrderLineItem>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl CustomerOrder {
    /// Line items stamped with `order_id`
    pub fn items_for_order<'a>(
        &'a self,
        order_id: &'a str,
    ) -> impl Iterator<Item = &'a OrderLineItem> + 'a {
        self.items
            .iter()
            .filter(move |item| item.order_id.as_deref() == Some(order_id))
    }

    /// Most recent line item by placement date
    pub fn latest_item(&self) -> Option<&OrderLineItem> {
        // max_by_key returns the last maximum, so equal dates resolve to the
        // most recently appended line
        self.items.iter().max_by_key(|item| item.date)
    }
}
