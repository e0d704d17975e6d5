//! Storage layer and the services built on top of it.
//!
//! The store holds versioned product/order records behind an all-or-nothing
//! `commit`; the services (`CatalogStore`, `OrderLedger`,
//! `InventoryReconciler`) implement the operation set callers use.

pub mod catalog_store;
pub mod in_memory;
pub mod order_ledger;
pub mod reconciler;
pub mod state_store;

mod integration_tests;

pub use catalog_store::CatalogStore;
pub use in_memory::InMemoryStateStore;
pub use order_ledger::OrderLedger;
pub use reconciler::InventoryReconciler;
pub use state_store::{StateStore, StoreError, Write};

/// Upper bound on optimistic-concurrency retries in the services.
///
/// Exhaustion surfaces as `DomainError::Conflict`; retrying the operation is
/// safe for callers (the reconciler in particular is idempotent).
pub(crate) const MAX_COMMIT_ATTEMPTS: u32 = 8;
