//! Transaction categories.
//!
//! # Responsibility
//! - Define the built-in default categories with stable ids.
//! - Represent group-scoped custom categories.
//! - Normalize category colors to `#RRGGBB`.
//!
//! # Invariants
//! - Default categories have `group_id = None` and are immutable.
//! - Custom categories always carry the owning `group_id`.

use crate::model::group::GroupId;
use crate::model::transaction::TransactionKind;
use crate::model::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type CategoryId = String;

/// Id of the catch-all category used when a reference cannot be resolved.
pub const OTHER_CATEGORY_ID: &str = "other";

const DEFAULT_COLOR_HEX: &str = "#808080";

/// Built-in category table: id, name, icon, color.
const DEFAULT_CATEGORIES: &[(&str, &str, &str, &str)] = &[
    ("food", "Food", "🍽️", "#FF9500"),
    ("transport", "Transport", "🚗", "#007AFF"),
    ("entertainment", "Entertainment", "🎮", "#AF52DE"),
    ("shopping", "Shopping", "🛍️", "#FF2D55"),
    ("salary", "Salary", "💰", "#34C759"),
    ("investment", "Investment", "📈", "#5AC8FA"),
    (OTHER_CATEGORY_ID, "Other", "📦", DEFAULT_COLOR_HEX),
];

/// Default categories offered for income entries.
const INCOME_CATEGORY_IDS: &[&str] = &["salary", "investment", OTHER_CATEGORY_ID];

/// RGB color normalized to uppercase `#RRGGBB`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CategoryColor(String);

impl CategoryColor {
    /// Parses `#RRGGBB` or `RRGGBB`, ignoring surrounding whitespace.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let trimmed = value.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValidationError::InvalidColor(value.to_string()));
        }
        Ok(Self(format!("#{}", digits.to_ascii_uppercase())))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns `(red, green, blue)` channels.
    pub fn rgb(&self) -> (u8, u8, u8) {
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&self.0[range], 16).unwrap_or_default()
        };
        (channel(1..3), channel(3..5), channel(5..7))
    }
}

impl Default for CategoryColor {
    fn default() -> Self {
        Self(DEFAULT_COLOR_HEX.to_string())
    }
}

impl Display for CategoryColor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CategoryColor {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CategoryColor> for String {
    fn from(value: CategoryColor) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub icon: String,
    pub color: CategoryColor,
    /// `None` for built-in defaults.
    pub group_id: Option<GroupId>,
}

impl Category {
    /// Creates a custom category for one group.
    pub fn custom(
        id: impl Into<CategoryId>,
        group_id: GroupId,
        name: impl Into<String>,
        icon: impl Into<String>,
        color: CategoryColor,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: icon.into(),
            color,
            group_id: Some(group_id),
        }
    }

    /// Returns the built-in categories in display order.
    pub fn defaults() -> Vec<Category> {
        DEFAULT_CATEGORIES
            .iter()
            .map(|(id, name, icon, color)| Category {
                id: (*id).to_string(),
                name: (*name).to_string(),
                icon: (*icon).to_string(),
                color: CategoryColor((*color).to_string()),
                group_id: None,
            })
            .collect()
    }

    /// Looks up one built-in category by id.
    pub fn default_by_id(id: &str) -> Option<Category> {
        Self::defaults().into_iter().find(|category| category.id == id)
    }

    /// The catch-all category.
    pub fn other() -> Category {
        Self::default_by_id(OTHER_CATEGORY_ID).unwrap_or_else(|| Category {
            id: OTHER_CATEGORY_ID.to_string(),
            name: "Other".to_string(),
            icon: "📦".to_string(),
            color: CategoryColor::default(),
            group_id: None,
        })
    }

    pub fn is_default_id(id: &str) -> bool {
        DEFAULT_CATEGORIES
            .iter()
            .any(|(default_id, ..)| *default_id == id)
    }

    pub fn is_default(&self) -> bool {
        self.group_id.is_none() && Self::is_default_id(&self.id)
    }

    /// Whether this category is offered for entries of `kind`.
    ///
    /// Income accepts salary/investment/other; expense accepts everything
    /// else except salary and investment. Custom categories count as expense
    /// categories.
    pub fn applies_to(&self, kind: TransactionKind) -> bool {
        let income_only = self.is_default() && matches!(self.id.as_str(), "salary" | "investment");
        match kind {
            TransactionKind::Income => {
                self.is_default() && INCOME_CATEGORY_IDS.contains(&self.id.as_str())
            }
            TransactionKind::Expense => !income_only,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::InvalidId("category"));
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName("category"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Category, CategoryColor, OTHER_CATEGORY_ID};
    use crate::model::transaction::TransactionKind;
    use uuid::Uuid;

    #[test]
    fn color_parse_normalizes_case_and_prefix() {
        let color = CategoryColor::parse(" ff9500 ").unwrap();
        assert_eq!(color.as_str(), "#FF9500");
        assert_eq!(color.rgb(), (0xFF, 0x95, 0x00));
        assert!(CategoryColor::parse("#12345").is_err());
        assert!(CategoryColor::parse("#GG0000").is_err());
    }

    #[test]
    fn defaults_contain_other_and_are_immutable_defaults() {
        let defaults = Category::defaults();
        assert_eq!(defaults.len(), 7);
        assert!(defaults.iter().all(Category::is_default));
        assert_eq!(Category::other().id, OTHER_CATEGORY_ID);
    }

    #[test]
    fn custom_category_with_default_id_is_not_default() {
        let custom = Category::custom(
            "food",
            Uuid::new_v4(),
            "Food",
            "🍕",
            CategoryColor::default(),
        );
        assert!(!custom.is_default());
    }

    #[test]
    fn income_and_expense_category_split() {
        let food = Category::default_by_id("food").unwrap();
        let salary = Category::default_by_id("salary").unwrap();
        let other = Category::other();

        assert!(food.applies_to(TransactionKind::Expense));
        assert!(!food.applies_to(TransactionKind::Income));
        assert!(salary.applies_to(TransactionKind::Income));
        assert!(!salary.applies_to(TransactionKind::Expense));
        assert!(other.applies_to(TransactionKind::Income));
        assert!(other.applies_to(TransactionKind::Expense));
    }
}
