//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose ledger use-cases to Dart via FRB as flat, string-typed calls.
//! - Resolve the database location once per process.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Failures are reported in response envelopes, never as panics.
//! - Amounts cross the boundary as decimal strings (`"12.50"`).

use log::warn;
use nomis_core::db::open_db;
use nomis_core::{
    core_version as core_version_inner, export_transactions_json,
    init_logging as init_logging_inner, ping as ping_inner, validate_sign_in, validate_sign_up,
    Amount, AuthErrorCode, CategoryService, CoreConfig, DatePeriod, GroupService,
    LedgerSummary, NewTransaction, ServiceError, SnapshotService, SqliteCategoryRepository,
    SqliteGroupRepository, SqliteSnapshotRepository, SqliteTransactionRepository,
    SqliteUserRepository, TransactionKind, TransactionService,
};
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::OnceLock;
use uuid::Uuid;

static CORE_CONFIG: OnceLock<CoreConfig> = OnceLock::new();

type LedgerTransactions<'conn> = TransactionService<
    SqliteTransactionRepository<'conn>,
    SqliteGroupRepository<'conn>,
    SqliteCategoryRepository<'conn>,
>;

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Validates sign-in input locally.
///
/// Returns an empty string when valid, otherwise a user-facing message.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_validate_sign_in(email: String, password: String) -> String {
    match validate_sign_in(&email, &password) {
        Ok(_) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Validates sign-up input locally.
///
/// Returns an empty string when valid, otherwise a user-facing message.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_validate_sign_up(email: String, password: String, name: String) -> String {
    match validate_sign_up(&email, &password, &name) {
        Ok(_) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Maps a provider error code to the message shown to the user.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_error_message(vendor_code: String) -> String {
    AuthErrorCode::from_vendor_code(&vendor_code)
        .user_message()
        .to_string()
}

/// Generic action response envelope for ledger commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Id of the created or affected record.
    pub id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl LedgerActionResponse {
    fn success(message: impl Into<String>, id: String) -> Self {
        Self {
            ok: true,
            id: Some(id),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
        }
    }

    fn from_result(result: Result<String, String>, message: &str) -> Self {
        match result {
            Ok(id) => Self::success(message, id),
            Err(err) => Self::failure(err),
        }
    }
}

/// One row of the per-category expense breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotalItem {
    pub category_id: String,
    pub name: String,
    pub icon: String,
    pub color_hex: String,
    pub amount: String,
}

/// Overview totals for one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSummaryResponse {
    pub ok: bool,
    pub message: String,
    pub total_income: String,
    pub total_expenses: String,
    pub balance: String,
    /// Sorted by amount, largest first.
    pub categories: Vec<CategoryTotalItem>,
}

impl LedgerSummaryResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            total_income: Amount::ZERO.to_string(),
            total_expenses: Amount::ZERO.to_string(),
            balance: Amount::ZERO.to_string(),
            categories: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetStatusItem {
    pub category_id: String,
    pub limit: String,
    pub spent: String,
    pub remaining: String,
    pub is_over: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetStatusResponse {
    pub ok: bool,
    pub message: String,
    pub items: Vec<BudgetStatusItem>,
}

/// Creates a group owned by `owner_id`.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_create_group(owner_id: String, name: String) -> LedgerActionResponse {
    let result = with_connection(|conn| {
        let groups = GroupService::new(
            SqliteGroupRepository::try_new(conn)?,
            SqliteUserRepository::try_new(conn)?,
        );
        Ok(groups.create_group(&owner_id, name)?.id.to_string())
    });
    LedgerActionResponse::from_result(result, "Group created.")
}

/// Records a transaction in a group.
///
/// Input semantics:
/// - `amount`: positive decimal string with up to two fraction digits.
/// - `date_ms`: Unix epoch milliseconds.
/// - `kind`: `income|expense` (case-insensitive).
#[flutter_rust_bridge::frb(sync)]
#[allow(clippy::too_many_arguments)]
pub fn ledger_add_transaction(
    actor_id: String,
    group_id: String,
    title: String,
    amount: String,
    date_ms: i64,
    category_id: String,
    kind: String,
    note: Option<String>,
) -> LedgerActionResponse {
    let result = with_connection(|conn| {
        let draft = NewTransaction {
            group_id: parse_id(&group_id, "group_id")?,
            title,
            amount: Amount::parse(&amount).map_err(|err| err.to_string())?,
            date: date_ms,
            category_id,
            kind: kind
                .parse::<TransactionKind>()
                .map_err(|err| err.to_string())?,
            note,
        };
        let created = transactions(conn)?.add_transaction(&actor_id, draft)?;
        Ok(created.id.to_string())
    });
    LedgerActionResponse::from_result(result, "Transaction added.")
}

#[flutter_rust_bridge::frb(sync)]
pub fn ledger_delete_transaction(
    actor_id: String,
    group_id: String,
    transaction_id: String,
) -> LedgerActionResponse {
    let result = with_connection(|conn| {
        let group_id = parse_id(&group_id, "group_id")?;
        let id = parse_id(&transaction_id, "transaction_id")?;
        transactions(conn)?.delete_transaction(&actor_id, group_id, id)?;
        Ok(id.to_string())
    });
    LedgerActionResponse::from_result(result, "Transaction deleted.")
}

/// Totals and category breakdown for one group.
///
/// `period` is `week|month|year|all`; `None` or blank means `month`.
/// `now_ms` anchors the calendar window.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_summary(
    actor_id: String,
    group_id: String,
    period: Option<String>,
    now_ms: i64,
) -> LedgerSummaryResponse {
    let result = with_connection(|conn| {
        let group_id = parse_id(&group_id, "group_id")?;
        let period = parse_period(period.as_deref())?;
        let in_period = transactions(conn)?.list_in_period(&actor_id, group_id, period, now_ms)?;
        let summary = LedgerSummary::from_transactions(&in_period);
        let categories = CategoryService::new(
            SqliteCategoryRepository::try_new(conn)?,
            SqliteGroupRepository::try_new(conn)?,
        );
        let items = summary
            .category_expenses
            .iter()
            .map(|entry| {
                let category = categories.resolve_category(group_id, &entry.category_id)?;
                Ok::<_, FfiError>(CategoryTotalItem {
                    category_id: entry.category_id.clone(),
                    name: category.name,
                    icon: category.icon,
                    color_hex: category.color.to_string(),
                    amount: entry.amount.to_string(),
                })
            })
            .collect::<Result<Vec<_>, FfiError>>()?;
        Ok(LedgerSummaryResponse {
            ok: true,
            message: String::new(),
            total_income: summary.total_income.to_string(),
            total_expenses: summary.total_expenses.to_string(),
            balance: summary.balance.to_string(),
            categories: items,
        })
    });
    result.unwrap_or_else(|message| LedgerSummaryResponse::failure(message))
}

/// Sets the budget limit for one category.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_set_budget(category_id: String, limit: String) -> LedgerActionResponse {
    let result = with_connection(|conn| {
        let limit = Amount::parse(&limit).map_err(|err| err.to_string())?;
        let snapshots = SnapshotService::new(SqliteSnapshotRepository::try_new(conn)?);
        snapshots.set_budget(category_id.trim(), limit)?;
        Ok(category_id.trim().to_string())
    });
    LedgerActionResponse::from_result(result, "Budget saved.")
}

/// Budget usage against every transaction of the group.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_budget_statuses(actor_id: String, group_id: String) -> BudgetStatusResponse {
    let result = with_connection(|conn| {
        let group_id = parse_id(&group_id, "group_id")?;
        let summary = transactions(conn)?.summary(&actor_id, group_id)?;
        let budgets = SnapshotService::new(SqliteSnapshotRepository::try_new(conn)?).load_budgets()?;
        Ok(budgets
            .statuses(&summary)
            .into_iter()
            .map(|status| BudgetStatusItem {
                category_id: status.category_id,
                limit: status.limit.to_string(),
                spent: status.spent.to_string(),
                remaining: status.remaining.to_string(),
                is_over: status.is_over,
            })
            .collect::<Vec<_>>())
    });
    match result {
        Ok(items) => BudgetStatusResponse {
            ok: true,
            message: String::new(),
            items,
        },
        Err(message) => BudgetStatusResponse {
            ok: false,
            message,
            items: Vec::new(),
        },
    }
}

/// Pretty-printed JSON of the group's transactions, newest first.
///
/// Returns an empty string and logs on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn ledger_export_json(actor_id: String, group_id: String) -> String {
    let result = with_connection(|conn| {
        let group_id = parse_id(&group_id, "group_id")?;
        let listed = transactions(conn)?.list_transactions(&actor_id, group_id)?;
        Ok(export_transactions_json(&listed)?)
    });
    result.unwrap_or_else(|err| {
        warn!("event=ledger_export module=ffi status=error error={err}");
        String::new()
    })
}

/// Error text crossing the FFI boundary.
struct FfiError(String);

impl From<String> for FfiError {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<ServiceError> for FfiError {
    fn from(value: ServiceError) -> Self {
        Self(value.to_string())
    }
}

impl From<nomis_core::RepoError> for FfiError {
    fn from(value: nomis_core::RepoError) -> Self {
        Self(value.to_string())
    }
}

fn with_connection<T>(
    f: impl FnOnce(&Connection) -> Result<T, FfiError>,
) -> Result<T, String> {
    let db_path = resolve_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("ledger DB open failed: {err}"))?;
    f(&conn).map_err(|FfiError(message)| message)
}

fn transactions(conn: &Connection) -> Result<LedgerTransactions<'_>, FfiError> {
    Ok(TransactionService::new(
        SqliteTransactionRepository::try_new(conn)?,
        SqliteGroupRepository::try_new(conn)?,
        SqliteCategoryRepository::try_new(conn)?,
    ))
}

fn parse_id(value: &str, field: &str) -> Result<Uuid, FfiError> {
    Uuid::parse_str(value.trim()).map_err(|_| FfiError(format!("invalid {field}: `{value}`")))
}

fn parse_period(value: Option<&str>) -> Result<DatePeriod, FfiError> {
    match value.map(str::trim).map(str::to_ascii_lowercase).as_deref() {
        None | Some("") | Some("month") => Ok(DatePeriod::Month),
        Some("week") => Ok(DatePeriod::Week),
        Some("year") => Ok(DatePeriod::Year),
        Some("all") => Ok(DatePeriod::All),
        Some(other) => Err(FfiError(format!(
            "unsupported period `{other}`; expected week|month|year|all"
        ))),
    }
}

fn resolve_db_path() -> PathBuf {
    CORE_CONFIG.get_or_init(CoreConfig::from_env).db_path.clone()
}

#[cfg(test)]
mod tests {
    use super::{
        auth_error_message, auth_validate_sign_in, auth_validate_sign_up, core_version,
        init_logging, ledger_add_transaction, ledger_budget_statuses, ledger_create_group,
        ledger_delete_transaction, ledger_export_json, ledger_set_budget, ledger_summary,
        parse_period, ping, resolve_db_path,
    };
    use nomis_core::db::open_db;
    use nomis_core::{
        CategoryService, DatePeriod, NewCategory, SqliteCategoryRepository, SqliteGroupRepository,
    };
    use uuid::Uuid;
    use std::time::{SystemTime, UNIX_EPOCH};

    const NOW_MS: i64 = 1_710_504_000_000;

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_input() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn auth_validation_returns_messages() {
        assert!(auth_validate_sign_in("a@b.co".to_string(), "x".to_string()).is_empty());
        assert!(!auth_validate_sign_in("nope".to_string(), "x".to_string()).is_empty());
        assert!(!auth_validate_sign_up(
            "a@b.co".to_string(),
            "12345".to_string(),
            "Ann".to_string()
        )
        .is_empty());
        assert_eq!(
            auth_error_message("auth/user-disabled".to_string()),
            "This account has been disabled."
        );
    }

    #[test]
    fn period_names_parse_with_month_default() {
        assert_eq!(parse_period(None).ok(), Some(DatePeriod::Month));
        assert_eq!(parse_period(Some(" Week ")).ok(), Some(DatePeriod::Week));
        assert!(parse_period(Some("decade")).is_err());
    }

    #[test]
    fn ledger_flow_adds_summarizes_and_deletes() {
        let owner = unique_token("owner");
        let group = ledger_create_group(owner.clone(), "Home".to_string());
        assert!(group.ok, "{}", group.message);
        let group_id = group.id.expect("group id");

        let lunch = ledger_add_transaction(
            owner.clone(),
            group_id.clone(),
            "Lunch".to_string(),
            "12.50".to_string(),
            NOW_MS,
            "food".to_string(),
            "expense".to_string(),
            None,
        );
        assert!(lunch.ok, "{}", lunch.message);
        let pay = ledger_add_transaction(
            owner.clone(),
            group_id.clone(),
            "Pay".to_string(),
            "1,000".to_string(),
            NOW_MS,
            "salary".to_string(),
            "Income".to_string(),
            Some("March".to_string()),
        );
        assert!(pay.ok, "{}", pay.message);

        let summary = ledger_summary(owner.clone(), group_id.clone(), None, NOW_MS);
        assert!(summary.ok, "{}", summary.message);
        assert_eq!(summary.total_income, "1000.00");
        assert_eq!(summary.total_expenses, "12.50");
        assert_eq!(summary.balance, "987.50");
        assert_eq!(summary.categories.len(), 1);
        assert_eq!(summary.categories[0].name, "Food");

        let export = ledger_export_json(owner.clone(), group_id.clone());
        assert!(export.contains("\"Lunch\""));

        let deleted = ledger_delete_transaction(
            owner.clone(),
            group_id.clone(),
            lunch.id.expect("transaction id"),
        );
        assert!(deleted.ok, "{}", deleted.message);
        let summary = ledger_summary(owner, group_id, Some("all".to_string()), NOW_MS);
        assert_eq!(summary.total_expenses, "0.00");
    }

    #[test]
    fn ledger_rejects_bad_input_and_outsiders() {
        let owner = unique_token("owner");
        let group_id = ledger_create_group(owner.clone(), "Trip".to_string())
            .id
            .expect("group id");

        let bad_amount = ledger_add_transaction(
            owner.clone(),
            group_id.clone(),
            "Taxi".to_string(),
            "-3".to_string(),
            NOW_MS,
            "transport".to_string(),
            "expense".to_string(),
            None,
        );
        assert!(!bad_amount.ok);

        let outsider = ledger_summary(unique_token("mallory"), group_id, None, NOW_MS);
        assert!(!outsider.ok);
        assert!(outsider.message.contains("permission denied"));

        let bad_id = ledger_delete_transaction(owner, "not-a-uuid".to_string(), String::new());
        assert!(!bad_id.ok);
        assert!(bad_id.message.contains("group_id"));
    }

    #[test]
    fn budgets_report_overruns() {
        let owner = unique_token("owner");
        let group_id = ledger_create_group(owner.clone(), "Budget".to_string())
            .id
            .expect("group id");
        let untouched = unique_token("cat");
        assert!(ledger_set_budget(untouched.clone(), "10".to_string()).ok);
        let saved = ledger_set_budget("entertainment".to_string(), "10".to_string());
        assert!(saved.ok, "{}", saved.message);

        let concert = ledger_add_transaction(
            owner.clone(),
            group_id.clone(),
            "Concert".to_string(),
            "25".to_string(),
            NOW_MS,
            "entertainment".to_string(),
            "expense".to_string(),
            None,
        );
        assert!(concert.ok, "{}", concert.message);

        let statuses = ledger_budget_statuses(owner, group_id);
        assert!(statuses.ok, "{}", statuses.message);
        let find = |category_id: &str| {
            statuses
                .items
                .iter()
                .find(|item| item.category_id == category_id)
                .cloned()
                .expect("budget item")
        };

        let idle = find(&untouched);
        assert_eq!(idle.limit, "10.00");
        assert_eq!(idle.spent, "0.00");
        assert!(!idle.is_over);

        let over = find("entertainment");
        assert_eq!(over.spent, "25.00");
        assert_eq!(over.remaining, "-15.00");
        assert!(over.is_over);
    }

    #[test]
    fn summary_fails_when_custom_category_row_is_corrupt() {
        let owner = unique_token("owner");
        let group_id = ledger_create_group(owner.clone(), "Pets".to_string())
            .id
            .expect("group id");
        let group_uuid = Uuid::parse_str(&group_id).expect("group uuid");
        let category_id = unique_token("pets");

        let conn = open_db(resolve_db_path()).expect("open db");
        CategoryService::new(
            SqliteCategoryRepository::try_new(&conn).expect("category repo"),
            SqliteGroupRepository::try_new(&conn).expect("group repo"),
        )
        .add_category(
            &owner,
            group_uuid,
            NewCategory {
                id: Some(category_id.clone()),
                name: "Pets".to_string(),
                icon: "🐾".to_string(),
                color_hex: "#00AA55".to_string(),
            },
        )
        .expect("custom category");

        let food = ledger_add_transaction(
            owner.clone(),
            group_id.clone(),
            "Kibble".to_string(),
            "5".to_string(),
            NOW_MS,
            category_id.clone(),
            "expense".to_string(),
            None,
        );
        assert!(food.ok, "{}", food.message);

        let summary = ledger_summary(owner.clone(), group_id.clone(), None, NOW_MS);
        assert!(summary.ok, "{}", summary.message);
        assert_eq!(summary.categories[0].name, "Pets");

        conn.execute(
            "UPDATE categories SET color_hex = 'corrupt' WHERE id = ?1;",
            [category_id.as_str()],
        )
        .expect("corrupt color");

        let summary = ledger_summary(owner, group_id, None, NOW_MS);
        assert!(!summary.ok);
        assert!(summary.message.contains("invalid persisted data"));
        assert!(summary.categories.is_empty());
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
