use std::collections::HashMap;

use crate::models::{Account, DraftRow, Transaction};
use crate::validate::parse_date;

/// A directed money movement, as seen by the replay. Stored transactions
/// and draft rows both qualify; a draft row's legs are its canonical
/// resolved ids, so an unresolved leg is simply absent.
pub trait Posting {
    fn date(&self) -> &str;
    fn amount(&self) -> f64;
    fn from_account(&self) -> Option<&str>;
    fn to_account(&self) -> Option<&str>;
}

impl Posting for Transaction {
    fn date(&self) -> &str {
        &self.date
    }
    fn amount(&self) -> f64 {
        self.amount
    }
    fn from_account(&self) -> Option<&str> {
        Some(&self.from_account_id)
    }
    fn to_account(&self) -> Option<&str> {
        Some(&self.to_account_id)
    }
}

impl Posting for DraftRow {
    fn date(&self) -> &str {
        &self.date
    }
    fn amount(&self) -> f64 {
        self.amount.trim().parse().unwrap_or(0.0)
    }
    fn from_account(&self) -> Option<&str> {
        self.from_account_id.as_deref()
    }
    fn to_account(&self) -> Option<&str> {
        self.to_account_id.as_deref()
    }
}

/// Account-id → balance maps immediately before and after one row applies.
#[derive(Debug, Clone)]
pub struct RowBalances {
    pub before: HashMap<String, f64>,
    pub after: HashMap<String, f64>,
}

/// Replay rows chronologically against the accounts' stored balances and
/// return one before/after snapshot per input row, in input order.
///
/// Display-only: stored balances are never touched. The sort is stable, so
/// rows sharing a date keep their relative order and the result is
/// reproducible. A leg referencing an account absent from `accounts` is
/// skipped rather than an error.
pub fn running_balances<P: Posting>(rows: &[P], accounts: &[Account]) -> Vec<RowBalances> {
    let mut balances: HashMap<String, f64> = accounts
        .iter()
        .map(|a| (a.id.clone(), a.balance))
        .collect();

    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.sort_by_key(|&i| parse_date(rows[i].date()));

    let mut out: Vec<RowBalances> = rows
        .iter()
        .map(|_| RowBalances {
            before: HashMap::new(),
            after: HashMap::new(),
        })
        .collect();
    for &i in &order {
        let row = &rows[i];
        let before = balances.clone();
        let amount = row.amount();
        if let Some(from) = row.from_account() {
            if let Some(balance) = balances.get_mut(from) {
                *balance -= amount;
            }
        }
        if let Some(to) = row.to_account() {
            if let Some(balance) = balances.get_mut(to) {
                *balance += amount;
            }
        }
        out[i] = RowBalances {
            before,
            after: balances.clone(),
        };
    }

    out
}
