//! Background report generation.
//!
//! Report runs read the whole ledger and write an artifact, which is too slow
//! for the request-serving path. The worker owns a dedicated thread that runs
//! on an interval and on demand, and publishes each artifact atomically.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use storefront_store::StateStore;

use super::report::AggregationReporter;

/// Report worker configuration.
#[derive(Debug, Clone)]
pub struct ReportWorkerConfig {
    /// How often to regenerate the report; `None` means on-demand only.
    pub interval: Option<Duration>,
    /// Where the published artifact lives.
    pub output_path: PathBuf,
    /// Name for logging and the worker thread.
    pub name: String,
}

impl Default for ReportWorkerConfig {
    fn default() -> Self {
        Self {
            interval: None,
            output_path: PathBuf::from("data/report.csv"),
            name: "report-worker".to_string(),
        }
    }
}

impl ReportWorkerConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }
}

/// Worker runtime statistics.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct WorkerStats {
    pub runs: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub last_run_at: Option<DateTime<Utc>>,
    pub last_revenue_minor: Option<u64>,
}

enum WorkerMessage {
    Trigger,
    Shutdown,
}

/// Handle to control a running report worker.
#[derive(Debug)]
pub struct ReportWorkerHandle {
    tx: mpsc::Sender<WorkerMessage>,
    join: Option<thread::JoinHandle<()>>,
    stats: Arc<Mutex<WorkerStats>>,
}

impl ReportWorkerHandle {
    /// Request an on-demand run. Returns false if the worker is gone.
    pub fn trigger(&self) -> bool {
        self.tx.send(WorkerMessage::Trigger).is_ok()
    }

    /// Request graceful shutdown and wait for the thread to finish.
    pub fn shutdown(mut self) {
        let _ = self.tx.send(WorkerMessage::Shutdown);
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }

    /// Current worker statistics.
    pub fn stats(&self) -> WorkerStats {
        self.stats
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

/// Background report generator.
pub struct ReportWorker<S> {
    reporter: AggregationReporter<S>,
    config: ReportWorkerConfig,
}

impl<S: StateStore + 'static> ReportWorker<S> {
    pub fn new(reporter: AggregationReporter<S>, config: ReportWorkerConfig) -> Self {
        Self { reporter, config }
    }

    /// Spawn the worker on its own thread.
    pub fn spawn(self) -> ReportWorkerHandle {
        let (tx, rx) = mpsc::channel::<WorkerMessage>();
        let stats = Arc::new(Mutex::new(WorkerStats::default()));
        let stats_clone = Arc::clone(&stats);

        let name = self.config.name.clone();
        let join = thread::Builder::new()
            .name(name)
            .spawn(move || worker_loop(self.reporter, self.config, rx, stats_clone))
            .expect("failed to spawn report worker thread");

        ReportWorkerHandle {
            tx,
            join: Some(join),
            stats,
        }
    }
}

fn worker_loop<S: StateStore>(
    reporter: AggregationReporter<S>,
    config: ReportWorkerConfig,
    rx: mpsc::Receiver<WorkerMessage>,
    stats: Arc<Mutex<WorkerStats>>,
) {
    info!(
        name = %config.name,
        path = %config.output_path.display(),
        interval_secs = config.interval.map(|i| i.as_secs()),
        "report worker started"
    );

    // On-demand-only workers park until a message arrives.
    let poll = config.interval.unwrap_or(Duration::from_secs(3600));

    loop {
        match rx.recv_timeout(poll) {
            Ok(WorkerMessage::Trigger) => {
                debug!(name = %config.name, "report run triggered");
                run_once(&reporter, &config, &stats);
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                if config.interval.is_some() {
                    run_once(&reporter, &config, &stats);
                }
            }
            Ok(WorkerMessage::Shutdown) | Err(mpsc::RecvTimeoutError::Disconnected) => {
                info!(name = %config.name, "report worker stopping");
                break;
            }
        }
    }
}

fn run_once<S: StateStore>(
    reporter: &AggregationReporter<S>,
    config: &ReportWorkerConfig,
    stats: &Arc<Mutex<WorkerStats>>,
) {
    let result = reporter.generate_report(&config.output_path);

    if let Ok(mut stats) = stats.lock() {
        stats.runs += 1;
        stats.last_run_at = Some(Utc::now());
        match &result {
            Ok(summary) => {
                stats.succeeded += 1;
                stats.last_revenue_minor = Some(summary.revenue_minor);
            }
            Err(_) => stats.failed += 1,
        }
    }

    if let Err(e) = result {
        error!(name = %config.name, error = %e, "report run failed");
    }
}
