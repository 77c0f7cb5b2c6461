//! Core domain logic for the nomis shared expense ledger.
//! This crate is the single source of truth for ledger invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod summary;

pub use config::CoreConfig;
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::amount::Amount;
pub use model::category::{Category, CategoryColor, CategoryId, OTHER_CATEGORY_ID};
pub use model::group::{Group, GroupId};
pub use model::transaction::{Transaction, TransactionId, TransactionKind};
pub use model::user::{User, UserId};
pub use model::ValidationError;
pub use repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
pub use repo::group_repo::{GroupRepository, SqliteGroupRepository};
pub use repo::snapshot_repo::{SnapshotRepository, SqliteSnapshotRepository};
pub use repo::transaction_repo::{
    SqliteTransactionRepository, TransactionListQuery, TransactionRepository,
};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::auth_service::{
    validate_sign_in, validate_sign_up, AuthAccount, AuthError, AuthErrorCode, AuthProvider,
    AuthService, CredentialError, ProviderError,
};
pub use service::category_service::{CategoryService, NewCategory};
pub use service::error::{ServiceError, ServiceResult};
pub use service::group_service::GroupService;
pub use service::snapshot_service::{export_transactions_json, SnapshotService};
pub use service::transaction_service::{NewTransaction, TransactionService};
pub use summary::aggregate::{CategoryExpense, DatePeriod, LedgerSummary};
pub use summary::budget::{BudgetBook, BudgetStatus};
pub use summary::ledger::TransactionLedger;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
