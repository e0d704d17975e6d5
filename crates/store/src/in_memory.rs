use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use storefront_catalog::Product;
use storefront_core::{OrderId, OrderItemId, ProductId};
use storefront_orders::Order;

use super::state_store::{StateStore, StoreError, Write};

#[derive(Debug, Clone)]
struct Versioned<T> {
    state: T,
    version: u64,
}

#[derive(Debug, Default)]
struct StoreState {
    products: BTreeMap<u64, Versioned<Product>>,
    orders: BTreeMap<u64, Versioned<Order>>,
}

/// In-memory versioned state store.
///
/// A single `RwLock` guards both record maps, so a commit batch that spans
/// products and orders is one atomic step. `BTreeMap` keys give the stable
/// id iteration order the listing reads rely on.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    state: RwLock<StoreState>,
    next_product_id: AtomicU64,
    next_order_id: AtomicU64,
    next_item_id: AtomicU64,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(counter: &AtomicU64) -> u64 {
        counter.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl StateStore for InMemoryStateStore {
    fn allocate_product_id(&self) -> ProductId {
        ProductId::new(Self::next(&self.next_product_id))
    }

    fn allocate_order_id(&self) -> OrderId {
        OrderId::new(Self::next(&self.next_order_id))
    }

    fn allocate_item_id(&self) -> OrderItemId {
        OrderItemId::new(Self::next(&self.next_item_id))
    }

    fn product(&self, id: ProductId) -> Option<(Product, u64)> {
        let state = self.state.read().ok()?;
        state
            .products
            .get(&id.value())
            .map(|v| (v.state.clone(), v.version))
    }

    fn order(&self, id: OrderId) -> Option<(Order, u64)> {
        let state = self.state.read().ok()?;
        state
            .orders
            .get(&id.value())
            .map(|v| (v.state.clone(), v.version))
    }

    fn products_by_ids(&self, ids: &[ProductId]) -> Vec<Product> {
        let Ok(state) = self.state.read() else {
            return Vec::new();
        };
        let mut wanted: Vec<u64> = ids.iter().map(|id| id.value()).collect();
        wanted.sort_unstable();
        wanted.dedup();
        wanted
            .into_iter()
            .filter_map(|id| state.products.get(&id).map(|v| v.state.clone()))
            .collect()
    }

    fn list_products(&self) -> Vec<Product> {
        let Ok(state) = self.state.read() else {
            return Vec::new();
        };
        state.products.values().map(|v| v.state.clone()).collect()
    }

    fn list_orders(&self) -> Vec<Order> {
        let Ok(state) = self.state.read() else {
            return Vec::new();
        };
        state.orders.values().map(|v| v.state.clone()).collect()
    }

    fn commit(&self, writes: Vec<Write>) -> Result<(), StoreError> {
        if writes.is_empty() {
            return Ok(());
        }

        let mut state = self
            .state
            .write()
            .map_err(|_| StoreError::InvalidWrite("lock poisoned".to_string()))?;

        // Validate every expectation before any write applies.
        for write in &writes {
            match write {
                Write::PutProduct { expected, product } => {
                    let current = state
                        .products
                        .get(&product.id.value())
                        .map(|v| v.version)
                        .unwrap_or(0);
                    if !expected.matches(current) {
                        return Err(StoreError::Concurrency(format!(
                            "product {}: expected {expected:?}, found {current}",
                            product.id
                        )));
                    }
                }
                Write::DeleteProduct { id } => {
                    if !state.products.contains_key(&id.value()) {
                        return Err(StoreError::NotFound {
                            entity: "product",
                            id: id.value(),
                        });
                    }
                }
                Write::PutOrder { expected, order } => {
                    let current = state
                        .orders
                        .get(&order.id.value())
                        .map(|v| v.version)
                        .unwrap_or(0);
                    if !expected.matches(current) {
                        return Err(StoreError::Concurrency(format!(
                            "order {}: expected {expected:?}, found {current}",
                            order.id
                        )));
                    }
                }
                Write::DeleteOrder { id } => {
                    if !state.orders.contains_key(&id.value()) {
                        return Err(StoreError::NotFound {
                            entity: "order",
                            id: id.value(),
                        });
                    }
                }
            }
        }

        for write in writes {
            match write {
                Write::PutProduct { product, .. } => {
                    let key = product.id.value();
                    let version = state.products.get(&key).map(|v| v.version).unwrap_or(0) + 1;
                    state.products.insert(
                        key,
                        Versioned {
                            state: product,
                            version,
                        },
                    );
                }
                Write::DeleteProduct { id } => {
                    state.products.remove(&id.value());
                }
                Write::PutOrder { order, .. } => {
                    let key = order.id.value();
                    let version = state.orders.get(&key).map(|v| v.version).unwrap_or(0) + 1;
                    state.orders.insert(
                        key,
                        Versioned {
                            state: order,
                            version,
                        },
                    );
                }
                Write::DeleteOrder { id } => {
                    state.orders.remove(&id.value());
                }
            }
        }

        Ok(())
    }
}
