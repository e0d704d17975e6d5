//! Orders domain module.
//!
//! This crate contains the business rules for orders and their line items,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no
//! storage).

pub mod order;

pub use order::{NewOrderItem, Order, OrderItem, OrderStatus, UpsertOutcome};
