//! Revenue aggregation and report generation.
//!
//! Read-only: derives per-order totals and total revenue from the ledger and
//! catalog, and writes a tabular report artifact off the request-serving
//! path.

pub mod report;
pub mod worker;

pub use report::{AggregationReporter, ReportError, ReportSummary};
pub use worker::{ReportWorker, ReportWorkerConfig, ReportWorkerHandle, WorkerStats};
