use std::collections::HashMap;
use std::path::Path;

use crate::error::{KeeshaError, Result};
use crate::models::{Account, AccountType, Transaction};

/// One raw input record at the system boundary: field name → string value,
/// not yet validated. Account columns carry *names* (or ids) as given.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub title: String,
    pub amount: String,
    pub from_account: String,
    pub to_account: String,
    pub date: String,
    pub description: String,
    pub is_important: bool,
}

pub const IMPORT_HEADERS: &[&str] = &[
    "title",
    "amount",
    "fromAccount",
    "toAccount",
    "date",
    "description",
    "isImportant",
];

/// Parse an import file in the canonical layout. The header row is
/// required; `description` and `isImportant` columns are optional. A
/// malformed file aborts the whole parse; prior draft state is the
/// caller's to keep.
pub fn parse_import_file(path: &Path) -> Result<Vec<RawRecord>> {
    let file = std::fs::File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));

    let headers = rdr.headers()?.clone();
    let col = |name: &str| headers.iter().position(|h| h == name);

    let idx_title = col("title").ok_or_else(|| missing_column("title"))?;
    let idx_amount = col("amount").ok_or_else(|| missing_column("amount"))?;
    let idx_from = col("fromAccount").ok_or_else(|| missing_column("fromAccount"))?;
    let idx_to = col("toAccount").ok_or_else(|| missing_column("toAccount"))?;
    let idx_date = col("date").ok_or_else(|| missing_column("date"))?;
    let idx_desc = col("description");
    let idx_important = col("isImportant");

    let mut records = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let get = |idx: usize| record.get(idx).unwrap_or("").to_string();
        records.push(RawRecord {
            title: get(idx_title),
            amount: get(idx_amount),
            from_account: get(idx_from),
            to_account: get(idx_to),
            date: get(idx_date),
            description: idx_desc.map(get).unwrap_or_default(),
            is_important: idx_important
                .map(|i| record.get(i).unwrap_or("") == "true")
                .unwrap_or(false),
        });
    }
    Ok(records)
}

fn missing_column(name: &str) -> KeeshaError {
    KeeshaError::Parse(format!(
        "missing required column '{name}' (expected header: {})",
        IMPORT_HEADERS.join(",")
    ))
}

fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Render stored transactions in the exact import layout, so an export can
/// be re-imported as-is. Account columns get names for portability.
pub fn render_transactions_csv(transactions: &[Transaction], accounts: &[Account]) -> String {
    let names: HashMap<&str, &str> = accounts
        .iter()
        .map(|a| (a.id.as_str(), a.name.as_str()))
        .collect();
    let mut out = String::from("title,amount,fromAccount,toAccount,date,description,isImportant\n");
    for tx in transactions {
        let from = names.get(tx.from_account_id.as_str()).copied().unwrap_or("Unknown Account");
        let to = names.get(tx.to_account_id.as_str()).copied().unwrap_or("Unknown Account");
        out.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            quoted(&tx.title),
            tx.amount,
            quoted(from),
            quoted(to),
            quoted(&tx.date),
            quoted(tx.description.as_deref().unwrap_or("")),
            tx.is_important,
        ));
    }
    out
}

pub fn export_transactions(
    path: &Path,
    transactions: &[Transaction],
    accounts: &[Account],
) -> Result<()> {
    std::fs::write(path, render_transactions_csv(transactions, accounts))?;
    Ok(())
}

pub fn default_export_filename(count: usize) -> String {
    let today = chrono::Local::now().format("%Y-%m-%d");
    format!("transactions_{count}_items_{today}.csv")
}

/// Sample import file seeded with the user's real account names where
/// available.
pub fn render_template(accounts: &[Account]) -> String {
    let pick = |t: AccountType, fallback: &str| {
        accounts
            .iter()
            .find(|a| a.account_type == t)
            .map(|a| a.name.clone())
            .unwrap_or_else(|| fallback.to_string())
    };
    let bank = pick(AccountType::Bank, "Main Bank Account");
    let income = pick(AccountType::Income, "Income");
    let expense = pick(AccountType::Expense, "Food & Dining");

    let mut out = String::from("title,amount,fromAccount,toAccount,date,description,isImportant\n");
    out.push_str(&format!("Salary Payment,3500.00,{income},{bank},2025-06-01,Monthly salary,true\n"));
    out.push_str(&format!("Grocery Shopping,45.67,{bank},{expense},2025-06-01,Weekly groceries,false\n"));
    out.push_str(&format!("Transfer to Savings,500.00,{bank},Savings Account,2025-06-02,Monthly savings transfer,false\n"));
    out
}
