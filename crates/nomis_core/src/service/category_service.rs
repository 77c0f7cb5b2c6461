//! Category use-case service.
//!
//! # Responsibility
//! - Merge built-in defaults with a group's custom categories.
//! - Guard custom category changes by group membership.
//!
//! # Invariants
//! - Defaults are listed first, in their built-in order.
//! - Defaults can never be created, updated or deleted through this service.
//! - Unknown category references resolve to the `other` default.

use crate::model::category::{Category, CategoryColor};
use crate::model::group::GroupId;
use crate::model::transaction::TransactionKind;
use crate::model::ValidationError;
use crate::repo::category_repo::CategoryRepository;
use crate::repo::group_repo::GroupRepository;
use crate::repo::RepoError;
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::group_service::require_member;
use log::info;
use uuid::Uuid;

/// Input for creating a custom category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    /// Caller-chosen id; a UUID is generated when `None` or blank.
    pub id: Option<String>,
    pub name: String,
    pub icon: String,
    /// `#RRGGBB`; empty means the default gray.
    pub color_hex: String,
}

pub struct CategoryService<C: CategoryRepository, G: GroupRepository> {
    categories: C,
    groups: G,
}

impl<C: CategoryRepository, G: GroupRepository> CategoryService<C, G> {
    pub fn new(categories: C, groups: G) -> Self {
        Self { categories, groups }
    }

    /// Defaults followed by the group's custom categories.
    pub fn list_categories(&self, actor: &str, group_id: GroupId) -> ServiceResult<Vec<Category>> {
        require_member(&self.groups, group_id, actor)?;
        let mut categories = Category::defaults();
        for custom in self.categories.list_categories(group_id)? {
            if !categories.iter().any(|existing| existing.id == custom.id) {
                categories.push(custom);
            }
        }
        Ok(categories)
    }

    /// Categories offered for entries of `kind`.
    pub fn categories_for_kind(
        &self,
        actor: &str,
        group_id: GroupId,
        kind: TransactionKind,
    ) -> ServiceResult<Vec<Category>> {
        Ok(self
            .list_categories(actor, group_id)?
            .into_iter()
            .filter(|category| category.applies_to(kind))
            .collect())
    }

    pub fn add_category(
        &self,
        actor: &str,
        group_id: GroupId,
        draft: NewCategory,
    ) -> ServiceResult<Category> {
        require_member(&self.groups, group_id, actor)?;

        let id = match draft.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => Uuid::new_v4().to_string(),
        };
        if Category::is_default_id(&id) {
            return Err(ServiceError::DefaultCategoryImmutable(id));
        }
        let color = if draft.color_hex.trim().is_empty() {
            CategoryColor::default()
        } else {
            CategoryColor::parse(&draft.color_hex)?
        };
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName("category").into());
        }

        let category = Category::custom(id, group_id, name, draft.icon.trim(), color);
        self.categories.create_category(&category)?;
        info!(
            "event=category_create module=service status=ok group_id={group_id} category_id={}",
            category.id
        );
        Ok(category)
    }

    pub fn update_category(&self, actor: &str, category: &Category) -> ServiceResult<()> {
        let group_id = require_custom(category.group_id, &category.id)?;
        require_member(&self.groups, group_id, actor)?;
        self.categories
            .update_category(category)
            .map_err(|err| not_found_as_category(err, &category.id))?;
        info!(
            "event=category_update module=service status=ok group_id={group_id} category_id={}",
            category.id
        );
        Ok(())
    }

    pub fn delete_category(
        &self,
        actor: &str,
        group_id: GroupId,
        category_id: &str,
    ) -> ServiceResult<()> {
        require_custom(Some(group_id), category_id)?;
        require_member(&self.groups, group_id, actor)?;
        self.categories
            .delete_category(group_id, category_id)
            .map_err(|err| not_found_as_category(err, category_id))?;
        info!(
            "event=category_delete module=service status=ok group_id={group_id} category_id={category_id}"
        );
        Ok(())
    }

    /// Exact lookup: a default or a custom category of `group_id`.
    pub fn find_category(
        &self,
        group_id: GroupId,
        category_id: &str,
    ) -> ServiceResult<Option<Category>> {
        if let Some(default) = Category::default_by_id(category_id) {
            return Ok(Some(default));
        }
        Ok(self.categories.get_category(group_id, category_id)?)
    }

    /// Like `find_category`, falling back to `other` for unknown ids.
    pub fn resolve_category(&self, group_id: GroupId, category_id: &str) -> ServiceResult<Category> {
        Ok(self
            .find_category(group_id, category_id)?
            .unwrap_or_else(Category::other))
    }
}

/// Rejects defaults and group-less categories; returns the owning group.
fn require_custom(group_id: Option<GroupId>, category_id: &str) -> ServiceResult<GroupId> {
    if Category::is_default_id(category_id) {
        return Err(ServiceError::DefaultCategoryImmutable(category_id.to_string()));
    }
    group_id.ok_or(ServiceError::PermissionDenied(
        "category does not belong to a group",
    ))
}

fn not_found_as_category(err: RepoError, category_id: &str) -> ServiceError {
    match err {
        RepoError::NotFound(_) => ServiceError::CategoryNotFound(category_id.to_string()),
        other => other.into(),
    }
}
