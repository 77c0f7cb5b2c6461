//! Service-level error shared by ledger use-cases.

use crate::model::group::GroupId;
use crate::model::transaction::TransactionId;
use crate::model::ValidationError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
    /// Input failed local validation.
    Validation(ValidationError),
    /// Actor is not allowed to perform the operation.
    PermissionDenied(&'static str),
    GroupNotFound(GroupId),
    /// No user matches the given id or email.
    UserNotFound(String),
    CategoryNotFound(String),
    /// Built-in categories cannot be changed or removed.
    DefaultCategoryImmutable(String),
    TransactionNotFound(TransactionId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::PermissionDenied(reason) => write!(f, "permission denied: {reason}"),
            Self::GroupNotFound(id) => write!(f, "group not found: {id}"),
            Self::UserNotFound(_) => write!(f, "user not found"),
            Self::CategoryNotFound(id) => write!(f, "category not found: {id}"),
            Self::DefaultCategoryImmutable(id) => {
                write!(f, "default category `{id}` cannot be modified")
            }
            Self::TransactionNotFound(id) => write!(f, "transaction not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl ServiceError {
    /// Short stable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::PermissionDenied(_) => "permission_denied",
            Self::GroupNotFound(_) => "group_not_found",
            Self::UserNotFound(_) => "user_not_found",
            Self::CategoryNotFound(_) => "category_not_found",
            Self::DefaultCategoryImmutable(_) => "default_category_immutable",
            Self::TransactionNotFound(_) => "transaction_not_found",
            Self::Repo(_) => "repo",
        }
    }
}
