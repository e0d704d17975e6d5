//! Versioned state store trait.
//!
//! Records are stored together with a monotonically increasing version
//! (0 = absent). A `commit` is a batch of writes applied atomically: every
//! expectation is checked before any write applies, so a failed batch leaves
//! no partial state. `ExpectedVersion::Exact` on a `Put` gives the
//! compare-and-set semantics payment confirmation relies on.

use thiserror::Error;

use storefront_catalog::Product;
use storefront_core::{DomainError, ExpectedVersion, OrderId, OrderItemId, ProductId};
use storefront_orders::Order;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// An `ExpectedVersion` check failed (stale read or concurrent writer).
    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    /// A delete targeted a record that does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },

    /// The batch itself is unusable (e.g. poisoned lock).
    #[error("invalid write: {0}")]
    InvalidWrite(String),
}

impl From<StoreError> for DomainError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Concurrency(msg) => DomainError::Conflict(msg),
            StoreError::NotFound { entity, id } => DomainError::NotFound { entity, id },
            StoreError::InvalidWrite(msg) => DomainError::Storage(msg),
        }
    }
}

/// One write in a commit batch.
#[derive(Debug, Clone)]
pub enum Write {
    PutProduct {
        expected: ExpectedVersion,
        product: Product,
    },
    DeleteProduct {
        id: ProductId,
    },
    PutOrder {
        expected: ExpectedVersion,
        order: Order,
    },
    DeleteOrder {
        id: OrderId,
    },
}

/// Storage seam for products and orders.
///
/// Reads return the record together with its current version; `commit`
/// applies a batch all-or-nothing. Implementations must make the version
/// check and the write a single atomic step.
pub trait StateStore: Send + Sync {
    fn allocate_product_id(&self) -> ProductId;
    fn allocate_order_id(&self) -> OrderId;
    fn allocate_item_id(&self) -> OrderItemId;

    fn product(&self, id: ProductId) -> Option<(Product, u64)>;
    fn order(&self, id: OrderId) -> Option<(Order, u64)>;

    /// Products whose id is in `ids`, ordered by id.
    fn products_by_ids(&self, ids: &[ProductId]) -> Vec<Product>;
    /// All products in stable id order.
    fn list_products(&self) -> Vec<Product>;
    /// All orders in stable id order.
    fn list_orders(&self) -> Vec<Order>;

    fn commit(&self, writes: Vec<Write>) -> Result<(), StoreError>;
}
