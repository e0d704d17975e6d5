use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use std::sync::Arc;

use storefront_catalog::NewProduct;
use storefront_orders::NewOrderItem;
use storefront_store::{CatalogStore, InMemoryStateStore, InventoryReconciler, OrderLedger};

fn new_product(i: u64) -> NewProduct {
    NewProduct {
        title: format!("product-{i}"),
        image: String::new(),
        price: 9.99,
        count: 100_000,
        description: String::new(),
    }
}

fn bench_product_creation(c: &mut Criterion) {
    let mut group = c.benchmark_group("catalog_create");
    group.throughput(Throughput::Elements(1));
    group.bench_function("create_product", |b| {
        let catalog = CatalogStore::new(Arc::new(InMemoryStateStore::new()));
        let mut i = 0u64;
        b.iter(|| {
            i += 1;
            black_box(catalog.create_product(new_product(i)).unwrap());
        });
    });
    group.finish();
}

fn bench_confirm_payment(c: &mut Criterion) {
    let mut group = c.benchmark_group("confirm_payment");

    for items in [1usize, 5, 20] {
        group.throughput(Throughput::Elements(items as u64));
        group.bench_with_input(BenchmarkId::from_parameter(items), &items, |b, &items| {
            let store = Arc::new(InMemoryStateStore::new());
            let catalog = CatalogStore::new(Arc::clone(&store));
            let ledger = OrderLedger::new(Arc::clone(&store));
            let reconciler = InventoryReconciler::new(store);

            let products: Vec<_> = (0..items)
                .map(|i| catalog.create_product(new_product(i as u64)).unwrap())
                .collect();
            let line_items: Vec<_> = products
                .iter()
                .map(|p| NewOrderItem {
                    product_id: p.id,
                    count: 1,
                })
                .collect();

            b.iter(|| {
                let order = ledger.create_order(&line_items).unwrap();
                black_box(reconciler.confirm_payment(order.id).unwrap());
            });
        });
    }
    group.finish();
}

fn bench_idempotent_reconfirmation(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconfirm_paid_order");
    group.throughput(Throughput::Elements(1));
    group.bench_function("confirm_payment_noop", |b| {
        let store = Arc::new(InMemoryStateStore::new());
        let catalog = CatalogStore::new(Arc::clone(&store));
        let ledger = OrderLedger::new(Arc::clone(&store));
        let reconciler = InventoryReconciler::new(store);

        let product = catalog.create_product(new_product(1)).unwrap();
        let order = ledger
            .create_order(&[NewOrderItem {
                product_id: product.id,
                count: 1,
            }])
            .unwrap();
        reconciler.confirm_payment(order.id).unwrap();

        b.iter(|| {
            black_box(reconciler.confirm_payment(order.id).unwrap());
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_product_creation,
    bench_confirm_payment,
    bench_idempotent_reconfirmation
);
criterion_main!(benches);
