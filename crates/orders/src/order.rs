use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, OrderId, OrderItemId, ProductId};

/// Payment status lifecycle.
///
/// A closed two-state enum; everything that branches on status matches it
/// exhaustively, so adding a state is a compile-time-visible change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Unpaid,
    Paid,
}

impl OrderStatus {
    pub fn is_paid(self) -> bool {
        matches!(self, OrderStatus::Paid)
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            OrderStatus::Unpaid => f.write_str("unpaid"),
            OrderStatus::Paid => f.write_str("paid"),
        }
    }
}

/// A (product, quantity) line belonging to exactly one order.
///
/// Holds only the owning order's id, never a reference back to the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub count: u32,
}

/// Unvalidated line-item input: (product, quantity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub count: i64,
}

/// A purchase request composed of one or more line items.
///
/// Item order matters only for display; within an order there is at most one
/// line item per product id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
}

/// Result of an item upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A line item for the product existed; its count was replaced.
    Replaced { previous: u32 },
    /// A new line item was appended.
    Inserted,
}

impl Order {
    /// Build a new unpaid order from validated inputs.
    ///
    /// `allocate_item_id` is called once per line item. Fails validation on
    /// an empty item list, a non-positive count, or a duplicate product id.
    pub fn create(
        id: OrderId,
        items: &[NewOrderItem],
        mut allocate_item_id: impl FnMut() -> OrderItemId,
    ) -> DomainResult<Self> {
        if items.is_empty() {
            return Err(DomainError::validation(
                "items",
                "an order must contain at least one item",
            ));
        }

        let mut order = Order {
            id,
            status: OrderStatus::Unpaid,
            items: Vec::with_capacity(items.len()),
        };
        for item in items {
            if order.item_for(item.product_id).is_some() {
                return Err(DomainError::validation(
                    "items",
                    format!("duplicate line item for product {}", item.product_id),
                ));
            }
            order.items.push(OrderItem {
                id: allocate_item_id(),
                order_id: id,
                product_id: item.product_id,
                count: validate_item_count(item.count)?,
            });
        }
        Ok(order)
    }

    pub fn item_for(&self, product_id: ProductId) -> Option<&OrderItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    /// Replace the count of the line item for `product_id`, or append a new
    /// one with an id from `allocate_item_id`.
    pub fn upsert_item(
        &mut self,
        product_id: ProductId,
        count: i64,
        allocate_item_id: impl FnOnce() -> OrderItemId,
    ) -> DomainResult<UpsertOutcome> {
        let count = validate_item_count(count)?;
        match self.items.iter_mut().find(|i| i.product_id == product_id) {
            Some(existing) => {
                let previous = existing.count;
                existing.count = count;
                Ok(UpsertOutcome::Replaced { previous })
            }
            None => {
                self.items.push(OrderItem {
                    id: allocate_item_id(),
                    order_id: self.id,
                    product_id,
                    count,
                });
                Ok(UpsertOutcome::Inserted)
            }
        }
    }
}

fn validate_item_count(count: i64) -> DomainResult<u32> {
    if count <= 0 {
        return Err(DomainError::validation("count", "count must be positive"));
    }
    u32::try_from(count)
        .map_err(|_| DomainError::validation("count", "count is too large"))
}
