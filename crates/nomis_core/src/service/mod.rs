//! Ledger use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into membership-checked use-cases.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod auth_service;
pub mod category_service;
pub mod error;
pub mod group_service;
pub mod snapshot_service;
pub mod transaction_service;
