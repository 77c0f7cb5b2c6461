//! Income/expense transaction record.
//!
//! # Invariants
//! - `amount` is strictly positive; the sign comes from `kind`.
//! - `title` is never blank after validation.
//! - Every transaction references a category id and belongs to one group.

use crate::model::amount::Amount;
use crate::model::category::CategoryId;
use crate::model::group::GroupId;
use crate::model::ValidationError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

pub type TransactionId = Uuid;

/// Direction of money flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(ValidationError::InvalidKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub group_id: GroupId,
    pub title: String,
    pub amount: Amount,
    /// Unix epoch milliseconds.
    pub date: i64,
    pub category_id: CategoryId,
    /// Serialized as `type` to match the document schema.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Transaction {
    /// Creates a transaction with a generated id and no note.
    pub fn new(
        group_id: GroupId,
        title: impl Into<String>,
        amount: Amount,
        date: i64,
        category_id: impl Into<CategoryId>,
        kind: TransactionKind,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            group_id,
            title: title.into(),
            amount,
            date,
            category_id: category_id.into(),
            kind,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Amount with the sign applied: positive for income, negative for expense.
    pub fn signed_amount(&self) -> Amount {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    /// Checks local constraints applied before any write.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if !self.amount.is_positive() {
            return Err(ValidationError::NonPositiveAmount(self.amount));
        }
        if self.category_id.trim().is_empty() {
            return Err(ValidationError::InvalidId("category"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Transaction, TransactionKind};
    use crate::model::amount::Amount;
    use crate::model::ValidationError;
    use uuid::Uuid;

    fn lunch(amount: Amount) -> Transaction {
        Transaction::new(
            Uuid::new_v4(),
            "Lunch",
            amount,
            1_700_000_000_000,
            "food",
            TransactionKind::Expense,
        )
    }

    #[test]
    fn validate_rejects_zero_amount_and_blank_title() {
        assert_eq!(
            lunch(Amount::ZERO).validate(),
            Err(ValidationError::NonPositiveAmount(Amount::ZERO))
        );

        let mut blank = lunch(Amount::from_major(1));
        blank.title = "   ".to_string();
        assert_eq!(blank.validate(), Err(ValidationError::EmptyTitle));
    }

    #[test]
    fn signed_amount_follows_kind() {
        let expense = lunch(Amount::from_major(120));
        assert_eq!(expense.signed_amount(), Amount::from_major(-120));

        let mut income = expense.clone();
        income.kind = TransactionKind::Income;
        assert_eq!(income.signed_amount(), Amount::from_major(120));
    }

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("Income".parse::<TransactionKind>(), Ok(TransactionKind::Income));
        assert!("refund".parse::<TransactionKind>().is_err());
    }
}
