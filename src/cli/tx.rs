use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::parse_month_opt;
use crate::db::get_connection;
use crate::error::{KeeshaError, Result};
use crate::fmt::money;
use crate::models::{new_id, Transaction, TransactionKind};
use crate::settings::Settings;
use crate::store::Store;
use crate::validate::{parse_date, resolve_account};

#[allow(clippy::too_many_arguments)]
pub fn add(
    settings: &Settings,
    title: &str,
    amount: f64,
    from: &str,
    to: &str,
    date: Option<&str>,
    description: Option<&str>,
    important: bool,
) -> Result<()> {
    if !(amount.is_finite() && amount > 0.0) {
        return Err(KeeshaError::Other("Amount must be a positive number".to_string()));
    }
    let store = Store::new(get_connection(&settings.db_path())?);
    let accounts = store.list_accounts()?;
    let from_account = resolve_account(from, &accounts)
        .ok_or_else(|| KeeshaError::UnknownAccount(from.to_string()))?;
    let to_account = resolve_account(to, &accounts)
        .ok_or_else(|| KeeshaError::UnknownAccount(to.to_string()))?;
    if from_account.id == to_account.id {
        return Err(KeeshaError::Other("From and To accounts must be different".to_string()));
    }
    let date = match date {
        Some(raw) => parse_date(raw)
            .ok_or_else(|| KeeshaError::Parse(format!("unrecognized date '{raw}'")))?
            .format("%Y-%m-%d")
            .to_string(),
        None => chrono::Local::now().format("%Y-%m-%d").to_string(),
    };

    store.add_transaction(&Transaction {
        id: new_id(),
        title: title.to_string(),
        amount,
        from_account_id: from_account.id.clone(),
        to_account_id: to_account.id.clone(),
        date,
        description: description.map(|d| d.to_string()),
        is_important: important,
    })?;
    println!(
        "Added: {} {} ({} -> {})",
        title,
        money(amount),
        from_account.name,
        to_account.name
    );
    Ok(())
}

pub fn list(settings: &Settings, month: Option<String>, year: Option<i32>) -> Result<()> {
    let store = Store::new(get_connection(&settings.db_path())?);
    let accounts = store.list_accounts()?;
    let (my, mm) = parse_month_opt(&month);
    let year = my.or(year);

    let name_of = |id: &str| {
        accounts
            .iter()
            .find(|a| a.id == id)
            .map(|a| a.name.clone())
            .unwrap_or_else(|| "Unknown Account".to_string())
    };

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Title", "Amount", "From", "To", "Kind", ""]);
    let mut shown = 0;
    for tx in store.list_transactions()? {
        if !in_period(&tx.date, year, mm) {
            continue;
        }
        let kind = match tx.kind(&accounts) {
            TransactionKind::Income => "income".green().to_string(),
            TransactionKind::Expense => "expense".red().to_string(),
            TransactionKind::Transfer => "transfer".to_string(),
        };
        table.add_row(vec![
            Cell::new(&tx.id),
            Cell::new(&tx.date),
            Cell::new(&tx.title),
            Cell::new(money(tx.amount)),
            Cell::new(name_of(&tx.from_account_id)),
            Cell::new(name_of(&tx.to_account_id)),
            Cell::new(kind),
            Cell::new(if tx.is_important { "!" } else { "" }),
        ]);
        shown += 1;
    }
    println!("Transactions ({shown})\n{table}");
    Ok(())
}

fn in_period(date: &str, year: Option<i32>, month: Option<u32>) -> bool {
    use chrono::Datelike;
    let Some(parsed) = parse_date(date) else {
        return false;
    };
    year.map_or(true, |y| parsed.year() == y) && month.map_or(true, |m| parsed.month() == m)
}

pub fn rm(settings: &Settings, id: &str) -> Result<()> {
    let store = Store::new(get_connection(&settings.db_path())?);
    let tx = store.get_transaction(id)?;
    store.delete_transaction(id)?;
    println!("Deleted: {} {} (balances restored)", tx.title, money(tx.amount));
    Ok(())
}
