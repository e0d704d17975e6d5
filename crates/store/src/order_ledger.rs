use std::sync::Arc;

use tracing::{debug, info, warn};

use storefront_core::{DomainError, DomainResult, ExpectedVersion, OrderId, ProductId};
use storefront_orders::{NewOrderItem, Order, OrderStatus, UpsertOutcome};

use super::MAX_COMMIT_ATTEMPTS;
use super::state_store::{StateStore, StoreError, Write};

/// Order operations: creation with line items, lookup, line-item upsert,
/// deletion, status transition.
#[derive(Debug)]
pub struct OrderLedger<S> {
    store: Arc<S>,
}

impl<S> Clone for OrderLedger<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: StateStore> OrderLedger<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Create an order and its items in one atomic write, initially unpaid.
    ///
    /// Product existence and stock are deliberately not checked here;
    /// resolution happens at read time.
    pub fn create_order(&self, items: &[NewOrderItem]) -> DomainResult<Order> {
        let id = self.store.allocate_order_id();
        let order = Order::create(id, items, || self.store.allocate_item_id())?;
        self.store.commit(vec![Write::PutOrder {
            expected: ExpectedVersion::Exact(0),
            order: order.clone(),
        }])?;
        info!(id = id.value(), items = order.items.len(), "order created");
        Ok(order)
    }

    pub fn order(&self, id: OrderId) -> Option<Order> {
        self.store.order(id).map(|(order, _)| order)
    }

    /// Remove an order and, with it, its items. Unknown ids are reported,
    /// not errored.
    pub fn delete_order(&self, id: OrderId) -> (bool, String) {
        if self.store.order(id).is_none() {
            warn!(id = id.value(), "order not found for deletion");
            return (false, format!("order {id} not found"));
        }

        match self.store.commit(vec![Write::DeleteOrder { id }]) {
            Ok(()) => {
                info!(id = id.value(), "order deleted");
                (true, format!("deleted order {id}"))
            }
            Err(StoreError::NotFound { .. }) => (false, format!("order {id} not found")),
            Err(e) => {
                warn!(id = id.value(), error = %e, "order deletion failed");
                (false, format!("failed to delete order {id}: {e}"))
            }
        }
    }

    /// Replace the count of the line item for `product_id`, or append a new
    /// one. Atomic per order.
    pub fn upsert_item(
        &self,
        order_id: OrderId,
        product_id: ProductId,
        count: i64,
    ) -> DomainResult<Order> {
        for attempt in 0..MAX_COMMIT_ATTEMPTS {
            let (mut order, version) = self
                .store
                .order(order_id)
                .ok_or_else(|| DomainError::not_found("order", order_id))?;
            let outcome =
                order.upsert_item(product_id, count, || self.store.allocate_item_id())?;

            match self.store.commit(vec![Write::PutOrder {
                expected: ExpectedVersion::Exact(version),
                order: order.clone(),
            }]) {
                Ok(()) => {
                    match outcome {
                        UpsertOutcome::Replaced { previous } => info!(
                            order_id = order_id.value(),
                            product_id = product_id.value(),
                            previous,
                            count,
                            "order item count replaced"
                        ),
                        UpsertOutcome::Inserted => info!(
                            order_id = order_id.value(),
                            product_id = product_id.value(),
                            count,
                            "order item added"
                        ),
                    }
                    return Ok(order);
                }
                Err(StoreError::Concurrency(msg)) => {
                    debug!(order_id = order_id.value(), attempt, %msg, "upsert conflicted, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(DomainError::conflict(format!(
            "item upsert on order {order_id} kept conflicting"
        )))
    }

    /// Persist a status change.
    ///
    /// An equal status is a logged no-op. This does not apply inventory
    /// effects: payment confirmation goes through the reconciler, which
    /// flips the status and decrements stock in one commit. A paid→unpaid
    /// change persists with a warning and no restock.
    pub fn set_status(&self, order_id: OrderId, status: OrderStatus) -> DomainResult<()> {
        for attempt in 0..MAX_COMMIT_ATTEMPTS {
            let (mut order, version) = self
                .store
                .order(order_id)
                .ok_or_else(|| DomainError::not_found("order", order_id))?;

            if order.status == status {
                info!(
                    order_id = order_id.value(),
                    status = %status,
                    "order already has requested status"
                );
                return Ok(());
            }

            match (order.status, status) {
                (OrderStatus::Unpaid, OrderStatus::Paid) => {}
                (OrderStatus::Paid, OrderStatus::Unpaid) => warn!(
                    order_id = order_id.value(),
                    "reverting paid order to unpaid; stock is not restored"
                ),
                // Equal pairs returned above.
                (OrderStatus::Unpaid, OrderStatus::Unpaid)
                | (OrderStatus::Paid, OrderStatus::Paid) => unreachable!(),
            }

            order.status = status;
            match self.store.commit(vec![Write::PutOrder {
                expected: ExpectedVersion::Exact(version),
                order,
            }]) {
                Ok(()) => {
                    info!(order_id = order_id.value(), status = %status, "order status changed");
                    return Ok(());
                }
                Err(StoreError::Concurrency(msg)) => {
                    debug!(order_id = order_id.value(), attempt, %msg, "status change conflicted, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(DomainError::conflict(format!(
            "status change on order {order_id} kept conflicting"
        )))
    }

    /// All orders in stable id order.
    pub fn list_orders(&self) -> Vec<Order> {
        self.store.list_orders()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::in_memory::InMemoryStateStore;

    fn ledger() -> OrderLedger<InMemoryStateStore> {
        OrderLedger::new(Arc::new(InMemoryStateStore::new()))
    }

    fn item(product: u64, count: i64) -> NewOrderItem {
        NewOrderItem {
            product_id: ProductId::new(product),
            count,
        }
    }

    #[test]
    fn create_then_get_round_trips_items() {
        let ledger = ledger();
        let created = ledger.create_order(&[item(1, 3), item(2, 1)]).unwrap();
        assert_eq!(created.status, OrderStatus::Unpaid);

        let fetched = ledger.order(created.id).unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.items.len(), 2);
    }

    #[test]
    fn create_with_empty_items_always_fails() {
        let ledger = ledger();
        let err = ledger.create_order(&[]).unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "items", .. }));
    }

    #[test]
    fn get_unknown_order_is_none() {
        assert!(ledger().order(OrderId::new(9999)).is_none());
    }

    #[test]
    fn delete_cascades_items_and_reports_unknown_ids() {
        let ledger = ledger();
        let (removed, message) = ledger.delete_order(OrderId::new(7));
        assert!(!removed);
        assert!(message.contains("not found"));

        let created = ledger.create_order(&[item(1, 3)]).unwrap();
        let (removed, _) = ledger.delete_order(created.id);
        assert!(removed);
        assert!(ledger.order(created.id).is_none());
    }

    #[test]
    fn upsert_replaces_or_appends() {
        let ledger = ledger();
        let created = ledger.create_order(&[item(1, 3)]).unwrap();

        let updated = ledger.upsert_item(created.id, ProductId::new(1), 5).unwrap();
        assert_eq!(updated.items.len(), 1);
        assert_eq!(updated.items[0].count, 5);

        let updated = ledger.upsert_item(created.id, ProductId::new(2), 2).unwrap();
        assert_eq!(updated.items.len(), 2);

        let err = ledger
            .upsert_item(OrderId::new(404), ProductId::new(1), 1)
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "order", .. }));
    }

    #[test]
    fn set_status_is_a_no_op_when_equal() {
        let ledger = ledger();
        let created = ledger.create_order(&[item(1, 1)]).unwrap();
        ledger.set_status(created.id, OrderStatus::Unpaid).unwrap();
        assert_eq!(ledger.order(created.id).unwrap().status, OrderStatus::Unpaid);
    }

    #[test]
    fn set_status_persists_transitions_both_ways() {
        let ledger = ledger();
        let created = ledger.create_order(&[item(1, 1)]).unwrap();

        ledger.set_status(created.id, OrderStatus::Paid).unwrap();
        assert_eq!(ledger.order(created.id).unwrap().status, OrderStatus::Paid);

        ledger.set_status(created.id, OrderStatus::Unpaid).unwrap();
        assert_eq!(ledger.order(created.id).unwrap().status, OrderStatus::Unpaid);
    }

    #[test]
    fn set_status_on_unknown_order_is_not_found() {
        let err = ledger()
            .set_status(OrderId::new(9999), OrderStatus::Paid)
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "order", .. }));
    }
}
