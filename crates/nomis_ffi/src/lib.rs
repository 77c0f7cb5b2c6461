//! Flutter-facing bindings for the nomis ledger core.

pub mod api;
