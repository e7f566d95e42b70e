use chrono::NaiveDate;

use crate::models::{Account, DraftRow};

/// Accepted date formats, tried in order. Successful parses are
/// canonicalized to the first entry.
pub const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d-%m-%Y",
    "%b %d, %Y",
    "%d %b %Y",
];

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Exact-match account resolution: name first, then id. No fuzzy matching.
pub fn resolve_account<'a>(raw: &str, accounts: &'a [Account]) -> Option<&'a Account> {
    accounts
        .iter()
        .find(|a| a.name == raw)
        .or_else(|| accounts.iter().find(|a| a.id == raw))
}

/// Validate one draft row against the current account list. Pure with
/// respect to its inputs: writes validity, errors, canonical account ids,
/// and a canonicalized date back onto the row, and nothing else. Selection
/// is the caller's concern.
pub fn validate_row(row: &mut DraftRow, accounts: &[Account]) {
    let mut errors = Vec::new();

    if row.title.trim().is_empty() {
        errors.push("Title is required".to_string());
    }

    match row.amount.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount > 0.0 => {}
        _ => errors.push("Amount must be a positive number".to_string()),
    }

    let from_raw = row.from_account.trim().to_string();
    row.from_account_id = None;
    if from_raw.is_empty() {
        errors.push("From account is required".to_string());
    } else {
        match resolve_account(&from_raw, accounts) {
            Some(account) => row.from_account_id = Some(account.id.clone()),
            None => errors.push(format!("From account \"{from_raw}\" not found")),
        }
    }

    let to_raw = row.to_account.trim().to_string();
    row.to_account_id = None;
    if to_raw.is_empty() {
        errors.push("To account is required".to_string());
    } else {
        match resolve_account(&to_raw, accounts) {
            Some(account) => row.to_account_id = Some(account.id.clone()),
            None => errors.push(format!("To account \"{to_raw}\" not found")),
        }
    }

    if let (Some(from), Some(to)) = (&row.from_account_id, &row.to_account_id) {
        if from == to {
            errors.push("From and To accounts must be different".to_string());
        }
    }

    if row.date.trim().is_empty() {
        errors.push("Date is required".to_string());
    } else {
        match parse_date(&row.date) {
            Some(date) => row.date = date.format("%Y-%m-%d").to_string(),
            None => errors.push("Date must be in a valid format (YYYY-MM-DD)".to_string()),
        }
    }

    row.valid = errors.is_empty();
    row.errors = errors;
}
