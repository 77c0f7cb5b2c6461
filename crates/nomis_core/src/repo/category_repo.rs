//! Custom category repository.
//!
//! Built-in defaults never touch storage; only group-scoped categories are
//! persisted here.

use crate::model::category::{Category, CategoryColor};
use crate::model::group::GroupId;
use crate::repo::{
    ensure_connection_ready, map_insert_error, now_epoch_ms, parse_uuid, RepoError, RepoResult,
};
use rusqlite::{params, Connection, OptionalExtension, Row};

const CATEGORY_SELECT_SQL: &str = "SELECT id, group_uuid, name, icon, color_hex FROM categories";

pub trait CategoryRepository {
    fn create_category(&self, category: &Category) -> RepoResult<()>;
    fn update_category(&self, category: &Category) -> RepoResult<()>;
    fn delete_category(&self, group_id: GroupId, id: &str) -> RepoResult<()>;
    fn get_category(&self, group_id: GroupId, id: &str) -> RepoResult<Option<Category>>;
    /// Custom categories of one group ordered by name.
    fn list_categories(&self, group_id: GroupId) -> RepoResult<Vec<Category>>;
}

pub struct SqliteCategoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCategoryRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

fn require_group(category: &Category) -> RepoResult<GroupId> {
    category.group_id.ok_or_else(|| {
        RepoError::InvalidData(format!(
            "category `{}` has no group; defaults are not persisted",
            category.id
        ))
    })
}

impl CategoryRepository for SqliteCategoryRepository<'_> {
    fn create_category(&self, category: &Category) -> RepoResult<()> {
        category.validate()?;
        let group_id = require_group(category)?;
        let now = now_epoch_ms();

        self.conn
            .execute(
                "INSERT INTO categories (id, group_uuid, name, icon, color_hex, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6);",
                params![
                    category.id,
                    group_id.to_string(),
                    category.name.trim(),
                    category.icon,
                    category.color.as_str(),
                    now
                ],
            )
            .map_err(|err| {
                map_insert_error(
                    err,
                    &format!("category {}", category.id),
                    &format!("group {group_id}"),
                )
            })?;
        Ok(())
    }

    fn update_category(&self, category: &Category) -> RepoResult<()> {
        category.validate()?;
        let group_id = require_group(category)?;

        let changed = self.conn.execute(
            "UPDATE categories
             SET name = ?3, icon = ?4, color_hex = ?5, updated_at = ?6
             WHERE group_uuid = ?1 AND id = ?2;",
            params![
                group_id.to_string(),
                category.id,
                category.name.trim(),
                category.icon,
                category.color.as_str(),
                now_epoch_ms()
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(format!("category {}", category.id)));
        }
        Ok(())
    }

    fn delete_category(&self, group_id: GroupId, id: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM categories WHERE group_uuid = ?1 AND id = ?2;",
            params![group_id.to_string(), id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(format!("category {id}")));
        }
        Ok(())
    }

    fn get_category(&self, group_id: GroupId, id: &str) -> RepoResult<Option<Category>> {
        let raw = self
            .conn
            .query_row(
                &format!("{CATEGORY_SELECT_SQL} WHERE group_uuid = ?1 AND id = ?2;"),
                params![group_id.to_string(), id],
                RawCategory::from_row,
            )
            .optional()?;
        raw.map(RawCategory::into_category).transpose()
    }

    fn list_categories(&self, group_id: GroupId) -> RepoResult<Vec<Category>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CATEGORY_SELECT_SQL} WHERE group_uuid = ?1 ORDER BY name COLLATE NOCASE ASC, id ASC;"
        ))?;
        let rows = stmt
            .query_map([group_id.to_string()], RawCategory::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(RawCategory::into_category).collect()
    }
}

struct RawCategory {
    id: String,
    group_uuid: String,
    name: String,
    icon: String,
    color_hex: String,
}

impl RawCategory {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            group_uuid: row.get("group_uuid")?,
            name: row.get("name")?,
            icon: row.get("icon")?,
            color_hex: row.get("color_hex")?,
        })
    }

    fn into_category(self) -> RepoResult<Category> {
        let group_id = parse_uuid(&self.group_uuid, "categories.group_uuid")?;
        let color = CategoryColor::parse(&self.color_hex).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid color `{}` in categories.color_hex",
                self.color_hex
            ))
        })?;
        Ok(Category::custom(self.id, group_id, self.name, self.icon, color))
    }
}
