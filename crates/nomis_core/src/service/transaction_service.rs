//! Transaction use-case service.
//!
//! # Responsibility
//! - Record, edit and remove group transactions on behalf of a member.
//! - Load ledgers and summaries for overview screens.
//!
//! # Invariants
//! - Every operation checks group membership first.
//! - New and edited transactions must reference a category that resolves
//!   exactly (a default or one of the group's custom categories).
//! - A transaction never moves between groups.

use crate::model::amount::Amount;
use crate::model::category::{Category, CategoryId};
use crate::model::group::GroupId;
use crate::model::transaction::{Transaction, TransactionId, TransactionKind};
use crate::repo::category_repo::CategoryRepository;
use crate::repo::group_repo::GroupRepository;
use crate::repo::transaction_repo::{TransactionListQuery, TransactionRepository};
use crate::repo::RepoError;
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::group_service::require_member;
use crate::summary::aggregate::{filter_by_period, DatePeriod, LedgerSummary};
use crate::summary::ledger::TransactionLedger;
use log::{error, info};
use uuid::Uuid;

/// Input for recording a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub group_id: GroupId,
    pub title: String,
    pub amount: Amount,
    /// Unix epoch milliseconds.
    pub date: i64,
    pub category_id: CategoryId,
    pub kind: TransactionKind,
    pub note: Option<String>,
}

pub struct TransactionService<T, G, C>
where
    T: TransactionRepository,
    G: GroupRepository,
    C: CategoryRepository,
{
    transactions: T,
    groups: G,
    categories: C,
}

impl<T, G, C> TransactionService<T, G, C>
where
    T: TransactionRepository,
    G: GroupRepository,
    C: CategoryRepository,
{
    pub fn new(transactions: T, groups: G, categories: C) -> Self {
        Self {
            transactions,
            groups,
            categories,
        }
    }

    pub fn add_transaction(
        &self,
        actor: &str,
        draft: NewTransaction,
    ) -> ServiceResult<Transaction> {
        require_member(&self.groups, draft.group_id, actor)?;

        let transaction = Transaction {
            id: Uuid::new_v4(),
            group_id: draft.group_id,
            title: draft.title.trim().to_string(),
            amount: draft.amount,
            date: draft.date,
            category_id: draft.category_id.trim().to_string(),
            kind: draft.kind,
            note: draft
                .note
                .map(|note| note.trim().to_string())
                .filter(|note| !note.is_empty()),
        };
        transaction.validate()?;
        self.require_category(transaction.group_id, &transaction.category_id)?;

        if let Err(err) = self.transactions.create_transaction(&transaction) {
            error!(
                "event=transaction_create module=service status=error group_id={} error={err}",
                transaction.group_id
            );
            return Err(err.into());
        }
        info!(
            "event=transaction_create module=service status=ok group_id={} transaction_id={} kind={}",
            transaction.group_id,
            transaction.id,
            transaction.kind.as_str()
        );
        Ok(transaction)
    }

    /// Replaces an existing transaction's fields.
    pub fn update_transaction(
        &self,
        actor: &str,
        transaction: &Transaction,
    ) -> ServiceResult<Transaction> {
        let existing = self.require_existing(transaction.id)?;
        if existing.group_id != transaction.group_id {
            return Err(ServiceError::PermissionDenied(
                "transactions cannot move between groups",
            ));
        }
        require_member(&self.groups, existing.group_id, actor)?;
        transaction.validate()?;
        self.require_category(transaction.group_id, &transaction.category_id)?;

        self.transactions
            .update_transaction(transaction)
            .map_err(|err| not_found_as_transaction(err, transaction.id))?;
        info!(
            "event=transaction_update module=service status=ok group_id={} transaction_id={}",
            transaction.group_id, transaction.id
        );
        self.require_existing(transaction.id)
    }

    pub fn delete_transaction(
        &self,
        actor: &str,
        group_id: GroupId,
        id: TransactionId,
    ) -> ServiceResult<()> {
        require_member(&self.groups, group_id, actor)?;
        let existing = self.require_existing(id)?;
        if existing.group_id != group_id {
            return Err(ServiceError::TransactionNotFound(id));
        }
        self.transactions
            .delete_transaction(id)
            .map_err(|err| not_found_as_transaction(err, id))?;
        info!(
            "event=transaction_delete module=service status=ok group_id={group_id} transaction_id={id}"
        );
        Ok(())
    }

    /// All transactions of the group, newest first.
    pub fn list_transactions(
        &self,
        actor: &str,
        group_id: GroupId,
    ) -> ServiceResult<Vec<Transaction>> {
        self.query(actor, &TransactionListQuery::for_group(group_id))
    }

    pub fn query(
        &self,
        actor: &str,
        query: &TransactionListQuery,
    ) -> ServiceResult<Vec<Transaction>> {
        require_member(&self.groups, query.group_id, actor)?;
        Ok(self.transactions.list_transactions(query)?)
    }

    /// Transactions in the calendar `period` around `now_ms`, newest first.
    pub fn list_in_period(
        &self,
        actor: &str,
        group_id: GroupId,
        period: DatePeriod,
        now_ms: i64,
    ) -> ServiceResult<Vec<Transaction>> {
        let transactions = self.list_transactions(actor, group_id)?;
        Ok(filter_by_period(&transactions, period, now_ms))
    }

    pub fn load_ledger(&self, actor: &str, group_id: GroupId) -> ServiceResult<TransactionLedger> {
        Ok(TransactionLedger::new(
            self.list_transactions(actor, group_id)?,
        ))
    }

    pub fn summary(&self, actor: &str, group_id: GroupId) -> ServiceResult<LedgerSummary> {
        let transactions = self.list_transactions(actor, group_id)?;
        Ok(LedgerSummary::from_transactions(&transactions))
    }

    fn require_existing(&self, id: TransactionId) -> ServiceResult<Transaction> {
        self.transactions
            .get_transaction(id)?
            .ok_or(ServiceError::TransactionNotFound(id))
    }

    fn require_category(&self, group_id: GroupId, category_id: &str) -> ServiceResult<()> {
        if Category::is_default_id(category_id) {
            return Ok(());
        }
        match self.categories.get_category(group_id, category_id)? {
            Some(_) => Ok(()),
            None => Err(ServiceError::CategoryNotFound(category_id.to_string())),
        }
    }
}

fn not_found_as_transaction(err: RepoError, id: TransactionId) -> ServiceError {
    match err {
        RepoError::NotFound(_) => ServiceError::TransactionNotFound(id),
        other => other.into(),
    }
}
