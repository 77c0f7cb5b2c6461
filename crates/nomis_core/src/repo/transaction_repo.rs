//! Transaction repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over group-scoped transactions.
//! - Keep amount/kind encoding inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `Transaction::validate()` before SQL mutations.
//! - Lists are ordered by `date DESC, uuid ASC`.

use crate::model::amount::Amount;
use crate::model::group::GroupId;
use crate::model::transaction::{Transaction, TransactionId, TransactionKind};
use crate::repo::{
    ensure_connection_ready, map_insert_error, now_epoch_ms, parse_uuid, RepoError, RepoResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const TRANSACTION_SELECT_SQL: &str = "SELECT
    uuid,
    group_uuid,
    title,
    amount_minor,
    date,
    category_id,
    type,
    note
FROM transactions";

/// Query options for listing one group's transactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionListQuery {
    pub group_id: GroupId,
    /// Inclusive lower bound, epoch milliseconds.
    pub from_date: Option<i64>,
    /// Exclusive upper bound, epoch milliseconds.
    pub to_date: Option<i64>,
    pub limit: Option<u32>,
    pub offset: u32,
}

impl TransactionListQuery {
    pub fn for_group(group_id: GroupId) -> Self {
        Self {
            group_id,
            from_date: None,
            to_date: None,
            limit: None,
            offset: 0,
        }
    }
}

pub trait TransactionRepository {
    fn create_transaction(&self, transaction: &Transaction) -> RepoResult<TransactionId>;
    fn update_transaction(&self, transaction: &Transaction) -> RepoResult<()>;
    fn get_transaction(&self, id: TransactionId) -> RepoResult<Option<Transaction>>;
    fn delete_transaction(&self, id: TransactionId) -> RepoResult<()>;
    fn list_transactions(&self, query: &TransactionListQuery) -> RepoResult<Vec<Transaction>>;
}

pub struct SqliteTransactionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTransactionRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl TransactionRepository for SqliteTransactionRepository<'_> {
    fn create_transaction(&self, transaction: &Transaction) -> RepoResult<TransactionId> {
        transaction.validate()?;
        let now = now_epoch_ms();

        self.conn
            .execute(
                "INSERT INTO transactions (
                    uuid,
                    group_uuid,
                    title,
                    amount_minor,
                    date,
                    category_id,
                    type,
                    note,
                    created_at,
                    updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9);",
                params![
                    transaction.id.to_string(),
                    transaction.group_id.to_string(),
                    transaction.title.trim(),
                    transaction.amount.minor_units(),
                    transaction.date,
                    transaction.category_id,
                    transaction.kind.as_str(),
                    normalized_note(transaction.note.as_deref()),
                    now,
                ],
            )
            .map_err(|err| {
                map_insert_error(
                    err,
                    &format!("transaction {}", transaction.id),
                    &format!("group {}", transaction.group_id),
                )
            })?;

        Ok(transaction.id)
    }

    fn update_transaction(&self, transaction: &Transaction) -> RepoResult<()> {
        transaction.validate()?;

        let changed = self.conn.execute(
            "UPDATE transactions
             SET
                title = ?1,
                amount_minor = ?2,
                date = ?3,
                category_id = ?4,
                type = ?5,
                note = ?6,
                updated_at = ?7
             WHERE uuid = ?8
               AND group_uuid = ?9;",
            params![
                transaction.title.trim(),
                transaction.amount.minor_units(),
                transaction.date,
                transaction.category_id,
                transaction.kind.as_str(),
                normalized_note(transaction.note.as_deref()),
                now_epoch_ms(),
                transaction.id.to_string(),
                transaction.group_id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(format!("transaction {}", transaction.id)));
        }
        Ok(())
    }

    fn get_transaction(&self, id: TransactionId) -> RepoResult<Option<Transaction>> {
        let raw = self
            .conn
            .query_row(
                &format!("{TRANSACTION_SELECT_SQL} WHERE uuid = ?1;"),
                [id.to_string()],
                RawTransaction::from_row,
            )
            .optional()?;
        raw.map(RawTransaction::into_transaction).transpose()
    }

    fn delete_transaction(&self, id: TransactionId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM transactions WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(format!("transaction {id}")));
        }
        Ok(())
    }

    fn list_transactions(&self, query: &TransactionListQuery) -> RepoResult<Vec<Transaction>> {
        let mut sql = format!("{TRANSACTION_SELECT_SQL} WHERE group_uuid = ?");
        let mut bind_values: Vec<Value> = vec![Value::Text(query.group_id.to_string())];

        if let Some(from_date) = query.from_date {
            sql.push_str(" AND date >= ?");
            bind_values.push(Value::Integer(from_date));
        }
        if let Some(to_date) = query.to_date {
            sql.push_str(" AND date < ?");
            bind_values.push(Value::Integer(to_date));
        }

        sql.push_str(" ORDER BY date DESC, uuid ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(bind_values), RawTransaction::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(RawTransaction::into_transaction)
            .collect()
    }
}

fn normalized_note(note: Option<&str>) -> Option<&str> {
    note.map(str::trim).filter(|value| !value.is_empty())
}

struct RawTransaction {
    uuid: String,
    group_uuid: String,
    title: String,
    amount_minor: i64,
    date: i64,
    category_id: String,
    kind: String,
    note: Option<String>,
}

impl RawTransaction {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            uuid: row.get("uuid")?,
            group_uuid: row.get("group_uuid")?,
            title: row.get("title")?,
            amount_minor: row.get("amount_minor")?,
            date: row.get("date")?,
            category_id: row.get("category_id")?,
            kind: row.get("type")?,
            note: row.get("note")?,
        })
    }

    fn into_transaction(self) -> RepoResult<Transaction> {
        let kind = parse_kind(&self.kind).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid transaction type `{}` in transactions.type",
                self.kind
            ))
        })?;
        let transaction = Transaction {
            id: parse_uuid(&self.uuid, "transactions.uuid")?,
            group_id: parse_uuid(&self.group_uuid, "transactions.group_uuid")?,
            title: self.title,
            amount: Amount::from_minor(self.amount_minor),
            date: self.date,
            category_id: self.category_id,
            kind,
            note: self.note,
        };
        transaction.validate().map_err(|err| {
            RepoError::InvalidData(format!("transaction {}: {err}", transaction.id))
        })?;
        Ok(transaction)
    }
}

fn parse_kind(value: &str) -> Option<TransactionKind> {
    match value {
        "income" => Some(TransactionKind::Income),
        "expense" => Some(TransactionKind::Expense),
        _ => None,
    }
}
