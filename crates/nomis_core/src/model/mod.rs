//! Domain model for shared expense ledgers.
//!
//! # Responsibility
//! - Define canonical records used by core business logic.
//! - Own local validation rules applied before every persistence write.
//!
//! # Invariants
//! - Users, groups and transactions are identified by stable IDs.
//! - Money is fixed-point (`Amount`), never floating point.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod amount;
pub mod category;
pub mod group;
pub mod transaction;
pub mod user;

/// Validation failures for domain records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Transaction title is blank.
    EmptyTitle,
    /// Amount must be strictly positive.
    NonPositiveAmount(amount::Amount),
    /// Amount text could not be parsed.
    InvalidAmount(String),
    /// A name field (user, group, category) is blank.
    EmptyName(&'static str),
    /// Category color is not `#RRGGBB`.
    InvalidColor(String),
    /// Email does not look like an address.
    InvalidEmail(String),
    /// Identifier is blank or malformed.
    InvalidId(&'static str),
    /// Group members must include the owner.
    OwnerNotMember,
    /// Transaction kind text is unknown.
    InvalidKind(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title cannot be empty"),
            Self::NonPositiveAmount(amount) => {
                write!(f, "amount must be greater than zero, got {amount}")
            }
            Self::InvalidAmount(text) => write!(f, "invalid amount `{text}`"),
            Self::EmptyName(field) => write!(f, "{field} name cannot be empty"),
            Self::InvalidColor(value) => {
                write!(f, "invalid color `{value}`; expected #RRGGBB")
            }
            Self::InvalidEmail(_) => write!(f, "invalid email address"),
            Self::InvalidId(field) => write!(f, "{field} id is invalid"),
            Self::OwnerNotMember => write!(f, "group owner must be a member"),
            Self::InvalidKind(value) => {
                write!(f, "invalid transaction type `{value}`; expected income|expense")
            }
        }
    }
}

impl Error for ValidationError {}
