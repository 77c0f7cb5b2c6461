//! Offline snapshots and data export.
//!
//! # Responsibility
//! - Persist a group's transaction list and the budget book as JSON
//!   payloads in the device-local key-value store.
//! - Produce the pretty-printed JSON export of a transaction list.
//!
//! # Invariants
//! - Missing snapshots load as empty values.
//! - Corrupt payloads are reported as `InvalidData`, never silently dropped.

use crate::model::amount::Amount;
use crate::model::group::GroupId;
use crate::model::transaction::Transaction;
use crate::repo::snapshot_repo::SnapshotRepository;
use crate::repo::RepoError;
use crate::service::error::ServiceResult;
use crate::summary::budget::BudgetBook;
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

const BUDGETS_KEY: &str = "budgets";
const TRANSACTIONS_KEY_PREFIX: &str = "transactions:";

fn transactions_key(group_id: GroupId) -> String {
    format!("{TRANSACTIONS_KEY_PREFIX}{group_id}")
}

/// Pretty-printed JSON array of `transactions`.
pub fn export_transactions_json(transactions: &[Transaction]) -> ServiceResult<String> {
    serde_json::to_string_pretty(transactions)
        .map_err(|err| RepoError::Serialization(err).into())
}

pub struct SnapshotService<S: SnapshotRepository> {
    snapshots: S,
}

impl<S: SnapshotRepository> SnapshotService<S> {
    pub fn new(snapshots: S) -> Self {
        Self { snapshots }
    }

    pub fn save_transactions(
        &self,
        group_id: GroupId,
        transactions: &[Transaction],
    ) -> ServiceResult<()> {
        self.put(&transactions_key(group_id), &transactions)?;
        info!(
            "event=snapshot_save module=service status=ok kind=transactions count={}",
            transactions.len()
        );
        Ok(())
    }

    pub fn load_transactions(&self, group_id: GroupId) -> ServiceResult<Vec<Transaction>> {
        Ok(self
            .get::<Vec<Transaction>>(&transactions_key(group_id))?
            .unwrap_or_default())
    }

    pub fn save_budgets(&self, budgets: &BudgetBook) -> ServiceResult<()> {
        self.put(BUDGETS_KEY, budgets)
    }

    pub fn load_budgets(&self) -> ServiceResult<BudgetBook> {
        Ok(self.get::<BudgetBook>(BUDGETS_KEY)?.unwrap_or_default())
    }

    /// Sets one budget limit and persists the whole book.
    pub fn set_budget(&self, category_id: &str, limit: Amount) -> ServiceResult<BudgetBook> {
        let mut budgets = self.load_budgets()?;
        budgets.set_budget(category_id, limit)?;
        self.save_budgets(&budgets)?;
        Ok(budgets)
    }

    /// Removes every snapshot (transactions and budgets).
    pub fn clear_all(&self) -> ServiceResult<usize> {
        let removed = self.snapshots.clear_snapshots()?;
        info!("event=snapshot_clear module=service status=ok removed={removed}");
        Ok(removed)
    }

    fn put<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> ServiceResult<()> {
        let payload = serde_json::to_string(value).map_err(RepoError::Serialization)?;
        self.snapshots.put_snapshot(key, &payload)?;
        Ok(())
    }

    fn get<T: DeserializeOwned>(&self, key: &str) -> ServiceResult<Option<T>> {
        let Some(payload) = self.snapshots.get_snapshot(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&payload) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                warn!(
                    "event=snapshot_load module=service status=error key={key} error_code=corrupt_payload"
                );
                Err(RepoError::InvalidData(format!("snapshot `{key}`: {err}")).into())
            }
        }
    }
}
