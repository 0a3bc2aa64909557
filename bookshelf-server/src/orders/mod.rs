//! Order Reconciliation
//!
//! Turns a customer's cart into committed order line items:
//!
//! ```text
//! Cart ─▶ validate ─▶ stock CAS batch ─▶ ledger append ─▶ cart clear
//!                          │                  │               │
//!                          └──── revert ◀─────┴── retract ◀───┘
//! ```
//!
//! - [`traits`]: store boundaries (cart, catalog, ledger)
//! - [`reconciler`]: placement saga and read side
//! - [`locks`]: per-customer and per-product async locks
//! - [`memory`]: in-process store with fault injection

pub mod error;
pub mod locks;
pub mod memory;
pub mod money;
pub mod reconciler;
pub mod traits;

pub use error::PlaceOrderError;
pub use locks::{KeyedLocks, OrderLocks};
pub use memory::{FailPoint, MemoryStore};
pub use reconciler::{OrderConfirmation, OrderReconciler, PlaceOrder};
pub use traits::{CartStore, OrderLedger, ProductCatalog, StockChange, StockWrite};
