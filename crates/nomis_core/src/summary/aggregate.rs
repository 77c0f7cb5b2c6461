//! Pure aggregation over transaction lists.
//!
//! # Responsibility
//! - Compute income/expense totals, balance and per-category breakdowns.
//! - Filter and order lists for overview projections.
//!
//! # Invariants
//! - `balance == total_income - total_expenses` for every input.
//! - Category breakdown is sorted by amount descending, then category id
//!   ascending.
//! - Empty input yields zero totals and an empty breakdown.

use crate::model::amount::Amount;
use crate::model::category::CategoryId;
use crate::model::transaction::{Transaction, TransactionKind};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

pub const RECENT_TRANSACTIONS_DEFAULT_LIMIT: usize = 10;
pub const RECENT_TITLES_DEFAULT_LIMIT: usize = 5;

/// Summed expenses for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryExpense {
    pub category_id: CategoryId,
    pub amount: Amount,
}

/// Aggregated totals for one transaction list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub total_income: Amount,
    pub total_expenses: Amount,
    pub balance: Amount,
    pub category_expenses: Vec<CategoryExpense>,
}

impl LedgerSummary {
    /// Builds every aggregate in one pass over `transactions`.
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let mut total_income = Amount::ZERO;
        let mut total_expenses = Amount::ZERO;
        let mut by_category: BTreeMap<&str, Amount> = BTreeMap::new();

        for transaction in transactions {
            match transaction.kind {
                TransactionKind::Income => total_income += transaction.amount,
                TransactionKind::Expense => {
                    total_expenses += transaction.amount;
                    *by_category
                        .entry(transaction.category_id.as_str())
                        .or_default() += transaction.amount;
                }
            }
        }

        Self {
            total_income,
            total_expenses,
            balance: total_income - total_expenses,
            category_expenses: sorted_breakdown(by_category),
        }
    }

    /// Summed expenses for one category, zero when absent.
    pub fn expenses_for(&self, category_id: &str) -> Amount {
        self.category_expenses
            .iter()
            .find(|entry| entry.category_id == category_id)
            .map_or(Amount::ZERO, |entry| entry.amount)
    }
}

pub fn total_income(transactions: &[Transaction]) -> Amount {
    transactions
        .iter()
        .filter(|transaction| transaction.is_income())
        .map(|transaction| transaction.amount)
        .sum()
}

pub fn total_expenses(transactions: &[Transaction]) -> Amount {
    transactions
        .iter()
        .filter(|transaction| transaction.is_expense())
        .map(|transaction| transaction.amount)
        .sum()
}

pub fn balance(transactions: &[Transaction]) -> Amount {
    transactions
        .iter()
        .map(Transaction::signed_amount)
        .sum()
}

/// Group-by-category expense sums, largest first.
pub fn category_expenses(transactions: &[Transaction]) -> Vec<CategoryExpense> {
    LedgerSummary::from_transactions(transactions).category_expenses
}

pub fn expenses_for_category(transactions: &[Transaction], category_id: &str) -> Amount {
    transactions
        .iter()
        .filter(|transaction| transaction.is_expense() && transaction.category_id == category_id)
        .map(|transaction| transaction.amount)
        .sum()
}

fn sorted_breakdown(by_category: BTreeMap<&str, Amount>) -> Vec<CategoryExpense> {
    let mut breakdown = by_category
        .into_iter()
        .map(|(category_id, amount)| CategoryExpense {
            category_id: category_id.to_string(),
            amount,
        })
        .collect::<Vec<_>>();
    // BTreeMap yields ids ascending; a stable sort keeps that order on ties.
    breakdown.sort_by(|left, right| right.amount.cmp(&left.amount));
    breakdown
}

/// Calendar window used by overview filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePeriod {
    Week,
    #[default]
    Month,
    Year,
    All,
}

impl DatePeriod {
    /// Whether `date_ms` falls in the same period as `now_ms` (UTC calendar).
    pub fn contains(self, date_ms: i64, now_ms: i64) -> bool {
        if self == Self::All {
            return true;
        }
        let (Some(date), Some(now)) = (to_utc(date_ms), to_utc(now_ms)) else {
            return false;
        };
        match self {
            Self::Week => date.iso_week() == now.iso_week(),
            Self::Month => date.year() == now.year() && date.month() == now.month(),
            Self::Year => date.year() == now.year(),
            Self::All => true,
        }
    }
}

fn to_utc(epoch_ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(epoch_ms)
}

/// Keeps transactions inside `period` relative to `now_ms`, newest first.
pub fn filter_by_period(
    transactions: &[Transaction],
    period: DatePeriod,
    now_ms: i64,
) -> Vec<Transaction> {
    let mut filtered = transactions
        .iter()
        .filter(|transaction| period.contains(transaction.date, now_ms))
        .cloned()
        .collect::<Vec<_>>();
    sort_newest_first(&mut filtered);
    filtered
}

/// Newest `limit` transactions.
pub fn recent_transactions(transactions: &[Transaction], limit: usize) -> Vec<Transaction> {
    let mut sorted = transactions.to_vec();
    sort_newest_first(&mut sorted);
    sorted.truncate(limit);
    sorted
}

/// Distinct titles among the newest `limit` transactions of one category.
///
/// Order follows recency; later duplicates are dropped.
pub fn recent_titles(transactions: &[Transaction], category_id: &str, limit: usize) -> Vec<String> {
    let mut in_category = transactions
        .iter()
        .filter(|transaction| transaction.category_id == category_id)
        .collect::<Vec<_>>();
    in_category.sort_by(|left, right| {
        right
            .date
            .cmp(&left.date)
            .then_with(|| left.id.cmp(&right.id))
    });

    let mut seen = HashSet::new();
    in_category
        .into_iter()
        .take(limit)
        .filter(|transaction| seen.insert(transaction.title.as_str()))
        .map(|transaction| transaction.title.clone())
        .collect()
}

/// Sorts by date descending, then id ascending.
pub fn sort_newest_first(transactions: &mut [Transaction]) {
    transactions.sort_by(|left, right| {
        right
            .date
            .cmp(&left.date)
            .then_with(|| left.id.cmp(&right.id))
    });
}
