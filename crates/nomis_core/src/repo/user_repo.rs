//! User mirror repository.
//!
//! # Invariants
//! - Email lookups are case-insensitive.
//! - Non-empty emails are unique across users.
//! - Rows that fail `User::validate` on read surface as `InvalidData`.

use crate::model::user::{User, UserId};
use crate::repo::{ensure_connection_ready, map_insert_error, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const USER_SELECT_SQL: &str = "SELECT id, name, email, created_at FROM users";

pub trait UserRepository {
    fn create_user(&self, user: &User) -> RepoResult<UserId>;
    fn get_user(&self, id: &str) -> RepoResult<Option<User>>;
    fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;
}

pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &User) -> RepoResult<UserId> {
        user.validate()?;

        self.conn
            .execute(
                "INSERT INTO users (id, name, email, created_at) VALUES (?1, ?2, ?3, ?4);",
                params![
                    user.id.as_str(),
                    user.name.trim(),
                    user.email.trim(),
                    user.created_at
                ],
            )
            .map_err(|err| map_insert_error(err, &format!("user {}", user.id), "user"))?;

        Ok(user.id.clone())
    }

    fn get_user(&self, id: &str) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_user_row,
            )
            .optional()?;
        user.map(checked_user).transpose()
    }

    fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let normalized = email.trim();
        if normalized.is_empty() {
            return Ok(None);
        }
        let user = self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE email = ?1 COLLATE NOCASE;"),
                [normalized],
                parse_user_row,
            )
            .optional()?;
        user.map(checked_user).transpose()
    }
}

fn checked_user(user: User) -> RepoResult<User> {
    user.validate()
        .map_err(|err| RepoError::InvalidData(format!("user {}: {err}", user.id)))?;
    Ok(user)
}

fn parse_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        created_at: row.get("created_at")?,
    })
}
