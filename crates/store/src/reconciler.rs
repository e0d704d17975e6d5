use std::sync::Arc;

use tracing::{debug, info, warn};

use storefront_core::{DomainError, DomainResult, ExpectedVersion, OrderId};
use storefront_orders::{Order, OrderStatus};

use super::MAX_COMMIT_ATTEMPTS;
use super::state_store::{StateStore, StoreError, Write};

/// Applies the inventory side effect of an order's payment confirmation.
///
/// When an order goes unpaid→paid, each referenced product's stock is
/// decremented by the line-item quantity exactly once per order, however
/// many times and from however many threads confirmation is requested.
#[derive(Debug)]
pub struct InventoryReconciler<S> {
    store: Arc<S>,
}

impl<S> Clone for InventoryReconciler<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: StateStore> InventoryReconciler<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Mark `order_id` paid and decrement stock for its line items.
    ///
    /// The status flip and every stock decrement go into one commit batch,
    /// carrying the versions read beforehand. The compare-and-set on the
    /// order's version serializes concurrent confirmations: exactly one
    /// commits, the rest re-read, observe the paid status, and return the
    /// order unchanged. Already-paid orders return immediately, so the call
    /// is idempotent and safe to retry.
    pub fn confirm_payment(&self, order_id: OrderId) -> DomainResult<Order> {
        for attempt in 0..MAX_COMMIT_ATTEMPTS {
            let (order, order_version) = self
                .store
                .order(order_id)
                .ok_or_else(|| DomainError::not_found("order", order_id))?;

            if order.status.is_paid() {
                info!(
                    order_id = order_id.value(),
                    "order already paid; stock left untouched"
                );
                return Ok(order);
            }

            let mut paid = order.clone();
            paid.status = OrderStatus::Paid;

            let mut writes = vec![Write::PutOrder {
                expected: ExpectedVersion::Exact(order_version),
                order: paid.clone(),
            }];

            for item in &order.items {
                let Some((mut product, product_version)) = self.store.product(item.product_id)
                else {
                    // The product was deleted after the order was placed; its
                    // stock can no longer be adjusted.
                    warn!(
                        order_id = order_id.value(),
                        product_id = item.product_id.value(),
                        count = item.count,
                        "line item references a missing product; skipping"
                    );
                    continue;
                };

                if product.count < item.count {
                    warn!(
                        order_id = order_id.value(),
                        product_id = item.product_id.value(),
                        stock = product.count,
                        ordered = item.count,
                        "ordered quantity exceeds stock; clamping at zero"
                    );
                }
                product.count = product.count.saturating_sub(item.count);
                writes.push(Write::PutProduct {
                    expected: ExpectedVersion::Exact(product_version),
                    product,
                });
            }

            match self.store.commit(writes) {
                Ok(()) => {
                    info!(
                        order_id = order_id.value(),
                        items = order.items.len(),
                        "payment confirmed; stock decremented"
                    );
                    return Ok(paid);
                }
                Err(StoreError::Concurrency(msg)) => {
                    debug!(order_id = order_id.value(), attempt, %msg, "confirmation conflicted, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(DomainError::conflict(format!(
            "payment confirmation of order {order_id} kept conflicting"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    use storefront_catalog::NewProduct;
    use storefront_core::ProductId;
    use storefront_orders::NewOrderItem;

    use crate::catalog_store::CatalogStore;
    use crate::in_memory::InMemoryStateStore;
    use crate::order_ledger::OrderLedger;

    struct Fixture {
        catalog: CatalogStore<InMemoryStateStore>,
        ledger: OrderLedger<InMemoryStateStore>,
        reconciler: InventoryReconciler<InMemoryStateStore>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStateStore::new());
        Fixture {
            catalog: CatalogStore::new(Arc::clone(&store)),
            ledger: OrderLedger::new(Arc::clone(&store)),
            reconciler: InventoryReconciler::new(store),
        }
    }

    fn widget(count: i64) -> NewProduct {
        NewProduct {
            title: "Widget".to_string(),
            image: String::new(),
            price: 9.99,
            count,
            description: String::new(),
        }
    }

    fn order_item(product: ProductId, count: i64) -> NewOrderItem {
        NewOrderItem {
            product_id: product,
            count,
        }
    }

    #[test]
    fn confirmation_decrements_stock_and_marks_paid() {
        let f = fixture();
        let product = f.catalog.create_product(widget(10)).unwrap();
        let order = f.ledger.create_order(&[order_item(product.id, 3)]).unwrap();

        let confirmed = f.reconciler.confirm_payment(order.id).unwrap();
        assert_eq!(confirmed.status, OrderStatus::Paid);
        assert_eq!(f.catalog.product(product.id).unwrap().count, 7);
        assert_eq!(f.ledger.order(order.id).unwrap().status, OrderStatus::Paid);
    }

    #[test]
    fn confirmation_is_idempotent() {
        let f = fixture();
        let product = f.catalog.create_product(widget(10)).unwrap();
        let order = f.ledger.create_order(&[order_item(product.id, 3)]).unwrap();

        f.reconciler.confirm_payment(order.id).unwrap();
        let second = f.reconciler.confirm_payment(order.id).unwrap();

        assert_eq!(second.status, OrderStatus::Paid);
        assert_eq!(f.catalog.product(product.id).unwrap().count, 7);
    }

    #[test]
    fn concurrent_confirmations_decrement_once() {
        for _ in 0..50 {
            let f = fixture();
            let product = f.catalog.create_product(widget(10)).unwrap();
            let order = f.ledger.create_order(&[order_item(product.id, 3)]).unwrap();

            let threads: Vec<_> = (0..4)
                .map(|_| {
                    let reconciler = f.reconciler.clone();
                    let order_id = order.id;
                    thread::spawn(move || reconciler.confirm_payment(order_id))
                })
                .collect();
            for t in threads {
                t.join().unwrap().unwrap();
            }

            assert_eq!(f.catalog.product(product.id).unwrap().count, 7);
            assert_eq!(f.ledger.order(order.id).unwrap().status, OrderStatus::Paid);
        }
    }

    #[test]
    fn missing_products_are_skipped() {
        let f = fixture();
        let kept = f.catalog.create_product(widget(10)).unwrap();
        let deleted = f.catalog.create_product(widget(5)).unwrap();
        let order = f
            .ledger
            .create_order(&[order_item(kept.id, 2), order_item(deleted.id, 1)])
            .unwrap();

        let (removed, _) = f.catalog.delete_product(deleted.id);
        assert!(removed);

        let confirmed = f.reconciler.confirm_payment(order.id).unwrap();
        assert_eq!(confirmed.status, OrderStatus::Paid);
        assert_eq!(f.catalog.product(kept.id).unwrap().count, 8);
    }

    #[test]
    fn stock_never_goes_negative() {
        let f = fixture();
        let product = f.catalog.create_product(widget(2)).unwrap();
        let order = f.ledger.create_order(&[order_item(product.id, 5)]).unwrap();

        f.reconciler.confirm_payment(order.id).unwrap();
        assert_eq!(f.catalog.product(product.id).unwrap().count, 0);
    }

    #[test]
    fn confirming_unknown_order_is_not_found() {
        let f = fixture();
        let err = f.reconciler.confirm_payment(OrderId::new(9999)).unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "order", .. }));
    }

    #[test]
    fn concurrent_confirmations_of_overlapping_orders_both_apply() {
        let f = fixture();
        let product = f.catalog.create_product(widget(10)).unwrap();
        let first = f.ledger.create_order(&[order_item(product.id, 3)]).unwrap();
        let second = f.ledger.create_order(&[order_item(product.id, 2)]).unwrap();

        let threads: Vec<_> = [first.id, second.id]
            .into_iter()
            .map(|order_id| {
                let reconciler = f.reconciler.clone();
                thread::spawn(move || reconciler.confirm_payment(order_id))
            })
            .collect();
        for t in threads {
            t.join().unwrap().unwrap();
        }

        assert_eq!(f.catalog.product(product.id).unwrap().count, 5);
        assert!(f.ledger.order(first.id).unwrap().status.is_paid());
        assert!(f.ledger.order(second.id).unwrap().status.is_paid());
    }
}
