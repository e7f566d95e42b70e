use comfy_table::{Cell, Table};

use crate::db::get_connection;
use crate::error::{KeeshaError, Result};
use crate::fmt::money;
use crate::models::{new_id, Account, AccountType};
use crate::settings::Settings;
use crate::store::Store;

/// Types a user may create. The `transaction` clearing type exists only
/// for the seeded "Unknown" placeholder account.
fn parse_account_type_arg(raw: &str) -> Result<AccountType> {
    match AccountType::parse(raw) {
        Some(AccountType::Transaction) | None => Err(KeeshaError::Other(format!(
            "Unknown account type '{raw}' (expected bank, income, expense, asset, liability)"
        ))),
        Some(t) => Ok(t),
    }
}

pub fn add(
    settings: &Settings,
    name: &str,
    account_type: &str,
    balance: f64,
    description: Option<&str>,
) -> Result<()> {
    let account_type = parse_account_type_arg(account_type)?;
    if !balance.is_finite() {
        return Err(KeeshaError::Other("Balance must be a finite number".to_string()));
    }
    let store = Store::new(get_connection(&settings.db_path())?);
    store.add_account(&Account {
        id: new_id(),
        name: name.to_string(),
        account_type,
        balance,
        description: description.map(|d| d.to_string()),
    })?;
    println!("Added account: {name}");
    Ok(())
}

pub fn list(settings: &Settings) -> Result<()> {
    let store = Store::new(get_connection(&settings.db_path())?);
    let accounts = store.list_accounts()?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Type", "Balance", "Description"]);
    for account in &accounts {
        table.add_row(vec![
            Cell::new(&account.id),
            Cell::new(&account.name),
            Cell::new(account.account_type.as_str()),
            Cell::new(money(account.balance)),
            Cell::new(account.description.clone().unwrap_or_default()),
        ]);
    }
    println!("Accounts\n{table}");
    Ok(())
}

pub fn update(
    settings: &Settings,
    id: &str,
    name: Option<&str>,
    description: Option<&str>,
) -> Result<()> {
    let store = Store::new(get_connection(&settings.db_path())?);
    let mut account = store.get_account(id)?;
    if let Some(name) = name {
        account.name = name.to_string();
    }
    if let Some(description) = description {
        account.description = Some(description.to_string());
    }
    store.update_account(&account)?;
    println!("Updated account: {}", account.name);
    Ok(())
}

pub fn rm(settings: &Settings, id: &str) -> Result<()> {
    let store = Store::new(get_connection(&settings.db_path())?);
    let account = store.get_account(id)?;
    store.delete_account(id)?;
    println!("Deleted account: {}", account.name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_account_type_arg_accepts_user_types() {
        assert_eq!(parse_account_type_arg("bank").unwrap(), AccountType::Bank);
        assert_eq!(parse_account_type_arg("income").unwrap(), AccountType::Income);
        assert_eq!(parse_account_type_arg("expense").unwrap(), AccountType::Expense);
        assert_eq!(parse_account_type_arg("asset").unwrap(), AccountType::Asset);
        assert_eq!(parse_account_type_arg("liability").unwrap(), AccountType::Liability);
    }

    #[test]
    fn test_parse_account_type_arg_rejects_clearing_type_and_garbage() {
        // The clearing type is reserved for the seeded placeholder account.
        assert!(parse_account_type_arg("transaction").is_err());
        assert!(parse_account_type_arg("checking").is_err());
    }
}
