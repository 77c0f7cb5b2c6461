//! Client-side aggregation over transaction lists.
//!
//! # Responsibility
//! - Totals, balance and per-category breakdowns.
//! - Period filters and recency projections for overview screens.
//! - Cached in-memory ledger and budget book.

pub mod aggregate;
pub mod budget;
pub mod ledger;
