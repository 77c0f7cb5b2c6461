//! Group use-case service.
//!
//! # Responsibility
//! - Create groups, list a user's groups, manage membership.
//!
//! # Invariants
//! - Only members can see or change a group.
//! - Only the owner can delete a group.

use crate::model::group::{Group, GroupId};
use crate::model::ValidationError;
use crate::repo::group_repo::GroupRepository;
use crate::repo::user_repo::UserRepository;
use crate::service::error::{ServiceError, ServiceResult};
use log::{info, warn};

/// Loads a group and checks that `actor` is a member.
pub(crate) fn require_member<G: GroupRepository>(
    groups: &G,
    group_id: GroupId,
    actor: &str,
) -> ServiceResult<Group> {
    let group = groups
        .get_group(group_id)?
        .ok_or(ServiceError::GroupNotFound(group_id))?;
    if !group.is_member(actor) {
        warn!(
            "event=membership_check module=service status=error group_id={group_id} error_code=permission_denied"
        );
        return Err(ServiceError::PermissionDenied(
            "user is not a member of this group",
        ));
    }
    Ok(group)
}

pub struct GroupService<G: GroupRepository, U: UserRepository> {
    groups: G,
    users: U,
}

impl<G: GroupRepository, U: UserRepository> GroupService<G, U> {
    pub fn new(groups: G, users: U) -> Self {
        Self { groups, users }
    }

    /// Creates a group owned by `owner`, who becomes its first member.
    pub fn create_group(&self, owner: &str, name: impl Into<String>) -> ServiceResult<Group> {
        if owner.trim().is_empty() {
            return Err(ValidationError::InvalidId("owner").into());
        }
        let name = name.into();
        let group = Group::new(name.trim(), owner);
        self.groups.create_group(&group)?;
        info!(
            "event=group_create module=service status=ok group_id={}",
            group.id
        );
        Ok(group)
    }

    /// Groups the user belongs to, oldest first.
    pub fn list_groups(&self, user_id: &str) -> ServiceResult<Vec<Group>> {
        Ok(self.groups.list_groups_for_member(user_id)?)
    }

    /// Returns the group for use as the active ledger.
    pub fn select_group(&self, actor: &str, group_id: GroupId) -> ServiceResult<Group> {
        let group = require_member(&self.groups, group_id, actor)?;
        info!("event=group_select module=service status=ok group_id={group_id}");
        Ok(group)
    }

    /// Adds the user registered with `email` to the group.
    ///
    /// Adding an existing member is a no-op. Returns the refreshed group.
    pub fn add_member_by_email(
        &self,
        actor: &str,
        group_id: GroupId,
        email: &str,
    ) -> ServiceResult<Group> {
        require_member(&self.groups, group_id, actor)?;
        let user = self
            .users
            .find_user_by_email(email)?
            .ok_or_else(|| ServiceError::UserNotFound(email.trim().to_string()))?;

        let added = self.groups.add_member(group_id, &user.id)?;
        info!(
            "event=group_add_member module=service status=ok group_id={group_id} added={added}"
        );

        self.groups
            .get_group(group_id)?
            .ok_or(ServiceError::GroupNotFound(group_id))
    }

    /// Deletes the group and everything scoped to it. Owner only.
    pub fn delete_group(&self, actor: &str, group_id: GroupId) -> ServiceResult<()> {
        let group = self
            .groups
            .get_group(group_id)?
            .ok_or(ServiceError::GroupNotFound(group_id))?;
        if !group.is_owner(actor) {
            warn!(
                "event=group_delete module=service status=error group_id={group_id} error_code=permission_denied"
            );
            return Err(ServiceError::PermissionDenied(
                "only the group owner can delete the group",
            ));
        }
        self.groups.delete_group(group_id)?;
        info!("event=group_delete module=service status=ok group_id={group_id}");
        Ok(())
    }
}
