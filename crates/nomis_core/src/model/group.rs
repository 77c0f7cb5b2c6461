//! Shared ledger group.
//!
//! # Invariants
//! - The owner is always part of `members`.
//! - `members` holds no duplicates and keeps join order.

use crate::model::user::UserId;
use crate::model::ValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type GroupId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub owner: UserId,
    pub members: Vec<UserId>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Group {
    /// Creates a group whose only member is its owner.
    pub fn new(name: impl Into<String>, owner: impl Into<UserId>) -> Self {
        let owner = owner.into();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            members: vec![owner.clone()],
            owner,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn is_owner(&self, user_id: &str) -> bool {
        self.owner == user_id
    }

    pub fn is_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|member| member == user_id)
    }

    /// Appends a member; returns `false` when already present.
    pub fn add_member(&mut self, user_id: impl Into<UserId>) -> bool {
        let user_id = user_id.into();
        if self.is_member(&user_id) {
            return false;
        }
        self.members.push(user_id);
        true
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName("group"));
        }
        if self.owner.trim().is_empty() {
            return Err(ValidationError::InvalidId("owner"));
        }
        if !self.is_member(&self.owner) {
            return Err(ValidationError::OwnerNotMember);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Group;

    #[test]
    fn new_group_has_owner_as_only_member() {
        let group = Group::new("Trip", "alice");
        assert_eq!(group.members, vec!["alice".to_string()]);
        assert!(group.is_owner("alice"));
        assert!(group.validate().is_ok());
    }

    #[test]
    fn add_member_ignores_duplicates() {
        let mut group = Group::new("Trip", "alice");
        assert!(group.add_member("bob"));
        assert!(!group.add_member("bob"));
        assert!(!group.add_member("alice"));
        assert_eq!(group.members.len(), 2);
    }

    #[test]
    fn validate_rejects_missing_owner_membership() {
        let mut group = Group::new("Trip", "alice");
        group.members.clear();
        assert!(group.validate().is_err());
    }
}
