use std::collections::HashMap;

use crate::models::{Account, Transaction, TransactionKind};

#[derive(Debug, Default, PartialEq)]
pub struct TransactionTotals {
    pub income: f64,
    pub expenses: f64,
    pub transfers: f64,
    pub net: f64,
}

#[derive(Debug)]
pub struct CategoryStat {
    pub category: String,
    pub amount: f64,
    pub count: usize,
    pub percentage: f64,
}

fn in_period(date: &str, year: Option<i32>, month: Option<u32>) -> bool {
    let Some(parsed) = crate::validate::parse_date(date) else {
        return false;
    };
    use chrono::Datelike;
    if let Some(y) = year {
        if parsed.year() != y {
            return false;
        }
    }
    if let Some(m) = month {
        if parsed.month() != m {
            return false;
        }
    }
    true
}

pub fn totals(
    transactions: &[Transaction],
    accounts: &[Account],
    year: Option<i32>,
    month: Option<u32>,
) -> TransactionTotals {
    let mut t = TransactionTotals::default();
    for tx in transactions {
        if !in_period(&tx.date, year, month) {
            continue;
        }
        match tx.kind(accounts) {
            TransactionKind::Income => t.income += tx.amount,
            TransactionKind::Expense => t.expenses += tx.amount,
            TransactionKind::Transfer => t.transfers += tx.amount,
        }
    }
    t.net = t.income - t.expenses;
    t
}

/// Spending grouped by destination expense account, largest first.
/// Percentages are of total expense spend in the period.
pub fn category_stats(
    transactions: &[Transaction],
    accounts: &[Account],
    year: Option<i32>,
    month: Option<u32>,
) -> Vec<CategoryStat> {
    let names: HashMap<&str, &str> = accounts
        .iter()
        .map(|a| (a.id.as_str(), a.name.as_str()))
        .collect();

    let mut grouped: HashMap<String, (f64, usize)> = HashMap::new();
    let mut total = 0.0;
    for tx in transactions {
        if !in_period(&tx.date, year, month) {
            continue;
        }
        if tx.kind(accounts) != TransactionKind::Expense {
            continue;
        }
        let category = names
            .get(tx.to_account_id.as_str())
            .copied()
            .unwrap_or("Unknown Account")
            .to_string();
        let entry = grouped.entry(category).or_insert((0.0, 0));
        entry.0 += tx.amount;
        entry.1 += 1;
        total += tx.amount;
    }

    let mut stats: Vec<CategoryStat> = grouped
        .into_iter()
        .map(|(category, (amount, count))| CategoryStat {
            category,
            amount,
            count,
            percentage: if total > 0.0 { amount / total * 100.0 } else { 0.0 },
        })
        .collect();
    stats.sort_by(|a, b| b.amount.partial_cmp(&a.amount).unwrap_or(std::cmp::Ordering::Equal));
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{new_id, AccountType};

    fn account(id: &str, name: &str, account_type: AccountType) -> Account {
        Account {
            id: id.to_string(),
            name: name.to_string(),
            account_type,
            balance: 0.0,
            description: None,
        }
    }

    fn accounts() -> Vec<Account> {
        vec![
            account("bank", "Main Bank Account", AccountType::Bank),
            account("salary", "Salary", AccountType::Income),
            account("food", "Food & Dining", AccountType::Expense),
            account("travel", "Travel", AccountType::Expense),
            account("savings", "Savings Account", AccountType::Asset),
        ]
    }

    fn txn(from: &str, to: &str, amount: f64, date: &str) -> Transaction {
        Transaction {
            id: new_id(),
            title: "t".to_string(),
            amount,
            from_account_id: from.to_string(),
            to_account_id: to.to_string(),
            date: date.to_string(),
            description: None,
            is_important: false,
        }
    }

    fn transactions() -> Vec<Transaction> {
        vec![
            txn("salary", "bank", 3000.0, "2025-01-01"),
            txn("bank", "food", 200.0, "2025-01-05"),
            txn("bank", "food", 100.0, "2025-01-20"),
            txn("bank", "travel", 700.0, "2025-02-10"),
            txn("bank", "savings", 500.0, "2025-01-15"),
        ]
    }

    #[test]
    fn test_totals_split_by_kind() {
        let t = totals(&transactions(), &accounts(), None, None);
        assert_eq!(t.income, 3000.0);
        assert_eq!(t.expenses, 1000.0);
        assert_eq!(t.transfers, 500.0);
        assert_eq!(t.net, 2000.0);
    }

    #[test]
    fn test_totals_month_filter() {
        let t = totals(&transactions(), &accounts(), Some(2025), Some(1));
        assert_eq!(t.income, 3000.0);
        assert_eq!(t.expenses, 300.0);
        let feb = totals(&transactions(), &accounts(), Some(2025), Some(2));
        assert_eq!(feb.expenses, 700.0);
        assert_eq!(feb.income, 0.0);
    }

    #[test]
    fn test_category_stats_sorted_with_percentages() {
        let stats = category_stats(&transactions(), &accounts(), None, None);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].category, "Travel");
        assert_eq!(stats[0].amount, 700.0);
        assert_eq!(stats[0].count, 1);
        assert!((stats[0].percentage - 70.0).abs() < 1e-9);
        assert_eq!(stats[1].category, "Food & Dining");
        assert_eq!(stats[1].count, 2);
        assert!((stats[1].percentage - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_category_stats_empty_when_no_expenses() {
        let only_income = vec![txn("salary", "bank", 10.0, "2025-01-01")];
        assert!(category_stats(&only_income, &accounts(), None, None).is_empty());
    }
}
