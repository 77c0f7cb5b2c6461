//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `nomis_core` linkage with deterministic output.
//! - Print a group summary when called as `nomis_cli <actor_id> <group_id>`.

use nomis_core::db::open_db;
use nomis_core::{
    CoreConfig, SqliteCategoryRepository, SqliteGroupRepository, SqliteTransactionRepository,
    TransactionService,
};
use std::process::ExitCode;
use uuid::Uuid;

fn main() -> ExitCode {
    println!("nomis_core ping={}", nomis_core::ping());
    println!("nomis_core version={}", nomis_core::core_version());

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [actor, group_id] = args.as_slice() else {
        return ExitCode::SUCCESS;
    };

    match print_summary(actor, group_id) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn print_summary(actor: &str, group_id: &str) -> Result<(), String> {
    let config = CoreConfig::from_env();
    nomis_core::init_logging_from_config(&config)?;

    let group_id =
        Uuid::parse_str(group_id.trim()).map_err(|_| format!("invalid group id `{group_id}`"))?;
    let conn = open_db(&config.db_path).map_err(|err| err.to_string())?;
    let service = TransactionService::new(
        SqliteTransactionRepository::try_new(&conn).map_err(|err| err.to_string())?,
        SqliteGroupRepository::try_new(&conn).map_err(|err| err.to_string())?,
        SqliteCategoryRepository::try_new(&conn).map_err(|err| err.to_string())?,
    );
    let summary = service
        .summary(actor, group_id)
        .map_err(|err| err.to_string())?;

    println!("income={}", summary.total_income);
    println!("expenses={}", summary.total_expenses);
    println!("balance={}", summary.balance);
    for entry in &summary.category_expenses {
        println!("category {}={}", entry.category_id, entry.amount);
    }
    Ok(())
}
