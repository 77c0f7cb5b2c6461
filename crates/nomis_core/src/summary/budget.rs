//! Per-category budget limits.
//!
//! Budgets are device-local settings; they are persisted as a snapshot, not
//! as ledger documents.

use crate::model::amount::Amount;
use crate::model::category::CategoryId;
use crate::model::ValidationError;
use crate::summary::aggregate::LedgerSummary;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Budget usage for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetStatus {
    pub category_id: CategoryId,
    pub limit: Amount,
    pub spent: Amount,
    /// `limit - spent`; negative once the budget is exceeded.
    pub remaining: Amount,
    pub is_over: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BudgetBook {
    budgets: BTreeMap<CategoryId, Amount>,
}

impl BudgetBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets or replaces the limit for one category.
    pub fn set_budget(
        &mut self,
        category_id: impl Into<CategoryId>,
        limit: Amount,
    ) -> Result<(), ValidationError> {
        let category_id = category_id.into();
        if category_id.trim().is_empty() {
            return Err(ValidationError::InvalidId("category"));
        }
        if !limit.is_positive() {
            return Err(ValidationError::NonPositiveAmount(limit));
        }
        self.budgets.insert(category_id, limit);
        Ok(())
    }

    pub fn budget_for(&self, category_id: &str) -> Option<Amount> {
        self.budgets.get(category_id).copied()
    }

    pub fn clear_budget(&mut self, category_id: &str) -> Option<Amount> {
        self.budgets.remove(category_id)
    }

    pub fn clear(&mut self) {
        self.budgets.clear();
    }

    pub fn len(&self) -> usize {
        self.budgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.budgets.is_empty()
    }

    /// Usage of every budgeted category, ordered by category id.
    pub fn statuses(&self, summary: &LedgerSummary) -> Vec<BudgetStatus> {
        self.budgets
            .iter()
            .map(|(category_id, limit)| {
                let spent = summary.expenses_for(category_id);
                let remaining = *limit - spent;
                BudgetStatus {
                    category_id: category_id.clone(),
                    limit: *limit,
                    spent,
                    remaining,
                    is_over: remaining.is_negative(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::BudgetBook;
    use crate::model::amount::Amount;
    use crate::model::transaction::{Transaction, TransactionKind};
    use crate::summary::aggregate::LedgerSummary;
    use uuid::Uuid;

    #[test]
    fn set_budget_rejects_non_positive_limits() {
        let mut book = BudgetBook::new();
        assert!(book.set_budget("food", Amount::ZERO).is_err());
        assert!(book.set_budget("", Amount::from_major(1)).is_err());
        assert!(book.is_empty());
    }

    #[test]
    fn statuses_report_remaining_and_overruns() {
        let mut book = BudgetBook::new();
        book.set_budget("food", Amount::from_major(100)).unwrap();
        book.set_budget("transport", Amount::from_major(50)).unwrap();

        let transactions = vec![
            Transaction::new(
                Uuid::nil(),
                "groceries",
                Amount::from_major(80),
                0,
                "food",
                TransactionKind::Expense,
            ),
            Transaction::new(
                Uuid::nil(),
                "taxi",
                Amount::from_major(70),
                0,
                "transport",
                TransactionKind::Expense,
            ),
        ];
        let statuses = book.statuses(&LedgerSummary::from_transactions(&transactions));

        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].category_id, "food");
        assert_eq!(statuses[0].remaining, Amount::from_major(20));
        assert!(!statuses[0].is_over);
        assert_eq!(statuses[1].category_id, "transport");
        assert_eq!(statuses[1].remaining, Amount::from_major(-20));
        assert!(statuses[1].is_over);
    }

    #[test]
    fn budget_book_serializes_as_plain_map() {
        let mut book = BudgetBook::new();
        book.set_budget("food", Amount::from_minor(5_000)).unwrap();
        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json["food"], 5_000);
    }
}
