//! In-memory transaction list with cached aggregates.
//!
//! # Invariants
//! - Every mutation drops the cached summary.
//! - The cached summary, when present, equals
//!   `LedgerSummary::from_transactions(&self.transactions)`.

use crate::model::transaction::{Transaction, TransactionId};
use crate::summary::aggregate::{
    filter_by_period, recent_titles, recent_transactions, DatePeriod, LedgerSummary,
};
use once_cell::unsync::OnceCell;

#[derive(Debug, Default)]
pub struct TransactionLedger {
    transactions: Vec<Transaction>,
    cached_summary: OnceCell<LedgerSummary>,
}

impl TransactionLedger {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self {
            transactions,
            cached_summary: OnceCell::new(),
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Returns aggregates, computing them at most once per mutation.
    pub fn summary(&self) -> &LedgerSummary {
        self.cached_summary
            .get_or_init(|| LedgerSummary::from_transactions(&self.transactions))
    }

    pub fn is_summary_cached(&self) -> bool {
        self.cached_summary.get().is_some()
    }

    pub fn replace_all(&mut self, transactions: Vec<Transaction>) {
        self.transactions = transactions;
        self.invalidate();
    }

    pub fn push(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
        self.invalidate();
    }

    /// Replaces the entry with the same id; returns `false` when absent.
    pub fn update(&mut self, transaction: Transaction) -> bool {
        let Some(slot) = self
            .transactions
            .iter_mut()
            .find(|existing| existing.id == transaction.id)
        else {
            return false;
        };
        *slot = transaction;
        self.invalidate();
        true
    }

    /// Removes one entry by id; returns the removed record.
    pub fn remove(&mut self, id: TransactionId) -> Option<Transaction> {
        let index = self
            .transactions
            .iter()
            .position(|transaction| transaction.id == id)?;
        let removed = self.transactions.remove(index);
        self.invalidate();
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.transactions.clear();
        self.invalidate();
    }

    pub fn filter_by_period(&self, period: DatePeriod, now_ms: i64) -> Vec<Transaction> {
        filter_by_period(&self.transactions, period, now_ms)
    }

    pub fn recent_transactions(&self, limit: usize) -> Vec<Transaction> {
        recent_transactions(&self.transactions, limit)
    }

    pub fn recent_titles(&self, category_id: &str, limit: usize) -> Vec<String> {
        recent_titles(&self.transactions, category_id, limit)
    }

    fn invalidate(&mut self) {
        self.cached_summary.take();
    }
}

impl From<Vec<Transaction>> for TransactionLedger {
    fn from(value: Vec<Transaction>) -> Self {
        Self::new(value)
    }
}
