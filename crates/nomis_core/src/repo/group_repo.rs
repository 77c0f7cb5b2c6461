//! Group and membership repository.
//!
//! # Responsibility
//! - Persist groups together with their ordered member list.
//! - Answer membership queries (`groups containing user X`).
//!
//! # Invariants
//! - A group row and its member rows are written in one SQL transaction.
//! - Deleting a group cascades to members, categories and transactions.

use crate::model::group::{Group, GroupId};
use crate::repo::{ensure_connection_ready, map_insert_error, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};

pub trait GroupRepository {
    fn create_group(&self, group: &Group) -> RepoResult<GroupId>;
    fn get_group(&self, id: GroupId) -> RepoResult<Option<Group>>;
    /// Groups whose member list contains `user_id`, oldest first.
    fn list_groups_for_member(&self, user_id: &str) -> RepoResult<Vec<Group>>;
    /// Appends a member; returns `false` when already present.
    fn add_member(&self, id: GroupId, user_id: &str) -> RepoResult<bool>;
    fn delete_group(&self, id: GroupId) -> RepoResult<()>;
}

pub struct SqliteGroupRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGroupRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn load_members(&self, id: &str) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id
             FROM group_members
             WHERE group_uuid = ?1
             ORDER BY position ASC;",
        )?;
        let members = stmt
            .query_map([id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(members)
    }

    fn hydrate(&self, header: GroupHeader) -> RepoResult<Group> {
        let members = self.load_members(&header.uuid)?;
        let group = Group {
            id: parse_uuid(&header.uuid, "ledger_groups.uuid")?,
            name: header.name,
            owner: header.owner_id,
            members,
            created_at: header.created_at,
        };
        group
            .validate()
            .map_err(|err| RepoError::InvalidData(format!("group {}: {err}", group.id)))?;
        Ok(group)
    }
}

struct GroupHeader {
    uuid: String,
    name: String,
    owner_id: String,
    created_at: i64,
}

impl GroupRepository for SqliteGroupRepository<'_> {
    fn create_group(&self, group: &Group) -> RepoResult<GroupId> {
        group.validate()?;
        let uuid = group.id.to_string();

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO ledger_groups (uuid, name, owner_id, created_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![uuid, group.name.trim(), group.owner, group.created_at],
        )
        .map_err(|err| map_insert_error(err, &format!("group {uuid}"), "group"))?;

        for (position, member) in group.members.iter().enumerate() {
            tx.execute(
                "INSERT OR IGNORE INTO group_members (group_uuid, user_id, position)
                 VALUES (?1, ?2, ?3);",
                params![uuid, member, position as i64],
            )?;
        }
        tx.commit()?;

        Ok(group.id)
    }

    fn get_group(&self, id: GroupId) -> RepoResult<Option<Group>> {
        let header = self
            .conn
            .query_row(
                "SELECT uuid, name, owner_id, created_at
                 FROM ledger_groups
                 WHERE uuid = ?1;",
                [id.to_string()],
                parse_header_row,
            )
            .optional()?;

        header.map(|header| self.hydrate(header)).transpose()
    }

    fn list_groups_for_member(&self, user_id: &str) -> RepoResult<Vec<Group>> {
        let mut stmt = self.conn.prepare(
            "SELECT g.uuid, g.name, g.owner_id, g.created_at
             FROM ledger_groups g
             INNER JOIN group_members m ON m.group_uuid = g.uuid
             WHERE m.user_id = ?1
             ORDER BY g.created_at ASC, g.uuid ASC;",
        )?;
        let headers = stmt
            .query_map([user_id], parse_header_row)?
            .collect::<Result<Vec<_>, _>>()?;

        headers
            .into_iter()
            .map(|header| self.hydrate(header))
            .collect()
    }

    fn add_member(&self, id: GroupId, user_id: &str) -> RepoResult<bool> {
        let uuid = id.to_string();
        let tx = self.conn.unchecked_transaction()?;

        let exists = tx
            .query_row(
                "SELECT 1 FROM ledger_groups WHERE uuid = ?1;",
                [uuid.as_str()],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if !exists {
            return Err(RepoError::NotFound(format!("group {uuid}")));
        }

        let changed = tx.execute(
            "INSERT OR IGNORE INTO group_members (group_uuid, user_id, position)
             SELECT ?1, ?2, COALESCE(MAX(position) + 1, 0)
             FROM group_members
             WHERE group_uuid = ?1;",
            params![uuid, user_id],
        )?;
        tx.commit()?;

        Ok(changed > 0)
    }

    fn delete_group(&self, id: GroupId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM ledger_groups WHERE uuid = ?1;",
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(format!("group {id}")));
        }
        Ok(())
    }
}

fn parse_header_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<GroupHeader> {
    Ok(GroupHeader {
        uuid: row.get("uuid")?,
        name: row.get("name")?,
        owner_id: row.get("owner_id")?,
        created_at: row.get("created_at")?,
    })
}
