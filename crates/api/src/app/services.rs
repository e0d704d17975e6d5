use std::path::PathBuf;
use std::sync::Arc;

use storefront_reporting::{
    AggregationReporter, ReportWorker, ReportWorkerConfig, ReportWorkerHandle,
};
use storefront_store::{CatalogStore, InMemoryStateStore, InventoryReconciler, OrderLedger};

/// Service wiring shared by all handlers.
///
/// Everything operates on one shared in-memory store; the report worker runs
/// on its own thread and only reads.
pub struct AppServices {
    pub catalog: CatalogStore<InMemoryStateStore>,
    pub ledger: OrderLedger<InMemoryStateStore>,
    pub reconciler: InventoryReconciler<InMemoryStateStore>,
    pub reporter: AggregationReporter<InMemoryStateStore>,
    pub report_worker: ReportWorkerHandle,
    pub report_path: PathBuf,
}

pub fn build_services(report_path: PathBuf) -> AppServices {
    let store = Arc::new(InMemoryStateStore::new());
    let catalog = CatalogStore::new(Arc::clone(&store));
    let ledger = OrderLedger::new(Arc::clone(&store));
    let reconciler = InventoryReconciler::new(store);
    let reporter = AggregationReporter::new(catalog.clone(), ledger.clone());

    let report_worker = ReportWorker::new(
        reporter.clone(),
        ReportWorkerConfig::default().with_output_path(report_path.clone()),
    )
    .spawn();

    AppServices {
        catalog,
        ledger,
        reconciler,
        reporter,
        report_worker,
        report_path,
    }
}
