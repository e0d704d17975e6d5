use std::collections::HashMap;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use storefront_core::money;
use storefront_core::{OrderId, ProductId};
use storefront_orders::Order;
use storefront_store::{CatalogStore, OrderLedger, StateStore};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report artifact: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of a successful report run.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub run_id: Uuid,
    pub rows: usize,
    pub revenue_minor: u64,
    pub path: PathBuf,
    pub generated_at: DateTime<Utc>,
}

/// Derives revenue and per-order totals from the ledger and catalog.
///
/// Reads snapshots and tolerates concurrent order mutations: the output
/// reflects "approximately now". Holds no write access to either service.
#[derive(Debug)]
pub struct AggregationReporter<S> {
    catalog: CatalogStore<S>,
    ledger: OrderLedger<S>,
}

impl<S> Clone for AggregationReporter<S> {
    fn clone(&self) -> Self {
        Self {
            catalog: self.catalog.clone(),
            ledger: self.ledger.clone(),
        }
    }
}

impl<S: StateStore> AggregationReporter<S> {
    pub fn new(catalog: CatalogStore<S>, ledger: OrderLedger<S>) -> Self {
        Self { catalog, ledger }
    }

    /// Total of `price × count` over the order's line items, in minor units.
    ///
    /// Products are resolved in one batch fetch; items whose product no
    /// longer exists are skipped.
    pub fn order_total(&self, order: &Order) -> u64 {
        let ids: Vec<ProductId> = order.items.iter().map(|i| i.product_id).collect();
        let prices: HashMap<ProductId, u64> = self
            .catalog
            .products(&ids)
            .into_iter()
            .map(|p| (p.id, p.price_minor))
            .collect();

        let mut total = 0u64;
        for item in &order.items {
            match prices.get(&item.product_id) {
                Some(price) => total += price * u64::from(item.count),
                None => warn!(
                    order_id = order.id.value(),
                    product_id = item.product_id.value(),
                    "line item references a missing product; excluded from total"
                ),
            }
        }
        total
    }

    pub fn order_total_by_id(&self, id: OrderId) -> Option<u64> {
        self.ledger.order(id).map(|order| self.order_total(&order))
    }

    /// Total revenue: the sum of order totals over paid orders only.
    pub fn revenue(&self) -> u64 {
        self.ledger
            .list_orders()
            .iter()
            .filter(|order| order.status.is_paid())
            .map(|order| self.order_total(order))
            .sum()
    }

    /// Write the report artifact to `path`.
    ///
    /// One CSV row per order (`order_id,order_total,status`) plus a trailing
    /// summary row with total revenue. The artifact is written to a unique
    /// temp file next to `path` and renamed into place, so a failed run
    /// leaves any previous artifact intact.
    pub fn generate_report(&self, path: &Path) -> Result<ReportSummary, ReportError> {
        let run_id = Uuid::now_v7();
        let orders = self.ledger.list_orders();

        let mut revenue_minor = 0u64;
        let mut body = String::from("order_id,order_total,status\n");
        for order in &orders {
            let total = self.order_total(order);
            if order.status.is_paid() {
                revenue_minor += total;
            }
            body.push_str(&format!(
                "{},{},{}\n",
                order.id,
                money::format_major(total),
                order.status
            ));
        }
        body.push_str(&format!("revenue,{},\n", money::format_major(revenue_minor)));

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = temp_path(path, run_id);
        let write_result = (|| {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(body.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp, path)
        })();
        if let Err(e) = write_result {
            // Best effort: do not leave temp files behind.
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        let summary = ReportSummary {
            run_id,
            rows: orders.len(),
            revenue_minor,
            path: path.to_path_buf(),
            generated_at: Utc::now(),
        };
        info!(
            run_id = %summary.run_id,
            rows = summary.rows,
            revenue = %money::format_major(summary.revenue_minor),
            path = %path.display(),
            "report generated"
        );
        Ok(summary)
    }
}

fn temp_path(path: &Path, run_id: Uuid) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    path.with_file_name(format!(".{file_name}.{run_id}.tmp"))
}
