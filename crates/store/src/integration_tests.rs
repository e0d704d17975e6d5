//! Integration tests across the store and its services.
//!
//! Tests: catalog + ledger + reconciler against one shared store.
//!
//! Verifies:
//! - the end-to-end purchase scenarios
//! - exactly-once stock decrement under duplicate and concurrent confirmation
//! - atomicity of multi-record commits

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use storefront_catalog::{NewProduct, ProductPatch};
    use storefront_core::{DomainError, OrderId};
    use storefront_orders::{NewOrderItem, OrderStatus};

    use crate::catalog_store::CatalogStore;
    use crate::in_memory::InMemoryStateStore;
    use crate::order_ledger::OrderLedger;
    use crate::reconciler::InventoryReconciler;

    fn services() -> (
        CatalogStore<InMemoryStateStore>,
        OrderLedger<InMemoryStateStore>,
        InventoryReconciler<InMemoryStateStore>,
    ) {
        let store = Arc::new(InMemoryStateStore::new());
        (
            CatalogStore::new(Arc::clone(&store)),
            OrderLedger::new(Arc::clone(&store)),
            InventoryReconciler::new(store),
        )
    }

    fn new_product(title: &str, price: f64, count: i64) -> NewProduct {
        NewProduct {
            title: title.to_string(),
            image: String::new(),
            price,
            count,
            description: String::new(),
        }
    }

    #[test]
    fn purchase_flow_decrements_stock_once() {
        let (catalog, ledger, reconciler) = services();

        let widget = catalog
            .create_product(new_product("Widget", 9.99, 10))
            .unwrap();
        assert_eq!(widget.id.value(), 1);

        let order = ledger
            .create_order(&[NewOrderItem {
                product_id: widget.id,
                count: 3,
            }])
            .unwrap();
        assert_eq!(order.status, OrderStatus::Unpaid);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].count, 3);

        let confirmed = reconciler.confirm_payment(order.id).unwrap();
        assert_eq!(confirmed.status, OrderStatus::Paid);
        assert_eq!(catalog.product(widget.id).unwrap().count, 7);

        // A repeated confirmation succeeds without touching stock again.
        let again = reconciler.confirm_payment(order.id).unwrap();
        assert_eq!(again.status, OrderStatus::Paid);
        assert_eq!(catalog.product(widget.id).unwrap().count, 7);
    }

    #[test]
    fn hammered_confirmation_still_decrements_once() {
        let (catalog, ledger, reconciler) = services();
        let widget = catalog
            .create_product(new_product("Widget", 9.99, 100))
            .unwrap();
        let order = ledger
            .create_order(&[NewOrderItem {
                product_id: widget.id,
                count: 4,
            }])
            .unwrap();

        let threads: Vec<_> = (0..8)
            .map(|_| {
                let reconciler = reconciler.clone();
                let order_id = order.id;
                thread::spawn(move || {
                    for _ in 0..10 {
                        reconciler.confirm_payment(order_id).unwrap();
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        assert_eq!(catalog.product(widget.id).unwrap().count, 96);
        assert_eq!(ledger.order(order.id).unwrap().status, OrderStatus::Paid);
    }

    #[test]
    fn invalid_update_does_not_leak_into_the_store() {
        let (catalog, _, _) = services();
        let widget = catalog
            .create_product(new_product("Widget", 9.99, 10))
            .unwrap();

        let err = catalog
            .update_product(
                widget.id,
                ProductPatch {
                    price: Some(-5.0),
                    ..ProductPatch::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "price", .. }));
        assert_eq!(catalog.product(widget.id).unwrap(), widget);
    }

    #[test]
    fn unknown_order_lookup_is_not_found() {
        let (_, ledger, _) = services();
        assert!(ledger.order(OrderId::new(9999)).is_none());
    }

    #[test]
    fn paid_to_unpaid_leaves_stock_alone() {
        let (catalog, ledger, reconciler) = services();
        let widget = catalog
            .create_product(new_product("Widget", 9.99, 10))
            .unwrap();
        let order = ledger
            .create_order(&[NewOrderItem {
                product_id: widget.id,
                count: 3,
            }])
            .unwrap();

        reconciler.confirm_payment(order.id).unwrap();
        assert_eq!(catalog.product(widget.id).unwrap().count, 7);

        ledger.set_status(order.id, OrderStatus::Unpaid).unwrap();
        assert_eq!(ledger.order(order.id).unwrap().status, OrderStatus::Unpaid);
        assert_eq!(catalog.product(widget.id).unwrap().count, 7);

        // Re-confirming a reverted order applies the decrement again: the
        // revert did not restock, and the order is unpaid once more.
        reconciler.confirm_payment(order.id).unwrap();
        assert_eq!(catalog.product(widget.id).unwrap().count, 4);
    }

    #[test]
    fn mixed_mutations_under_contention_keep_bounds() {
        let (catalog, ledger, reconciler) = services();
        let widget = catalog
            .create_product(new_product("Widget", 1.00, 1_000))
            .unwrap();

        let orders: Vec<_> = (0..8)
            .map(|_| {
                ledger
                    .create_order(&[NewOrderItem {
                        product_id: widget.id,
                        count: 5,
                    }])
                    .unwrap()
            })
            .collect();

        let threads: Vec<_> = orders
            .iter()
            .map(|order| {
                let reconciler = reconciler.clone();
                let order_id = order.id;
                thread::spawn(move || reconciler.confirm_payment(order_id).unwrap())
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        assert_eq!(catalog.product(widget.id).unwrap().count, 1_000 - 8 * 5);
        for order in &orders {
            assert!(ledger.order(order.id).unwrap().status.is_paid());
        }
    }
}
