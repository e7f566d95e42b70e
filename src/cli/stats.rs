use comfy_table::{Cell, Table};

use crate::cli::parse_month_opt;
use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::{money, money_delta};
use crate::settings::Settings;
use crate::stats::{category_stats, totals};
use crate::store::Store;

pub fn run(settings: &Settings, month: Option<String>, year: Option<i32>) -> Result<()> {
    let store = Store::new(get_connection(&settings.db_path())?);
    let transactions = store.list_transactions()?;
    let accounts = store.list_accounts()?;
    let (my, mm) = parse_month_opt(&month);
    let year = my.or(year);

    let t = totals(&transactions, &accounts, year, mm);
    println!("Income:    {}", money(t.income));
    println!("Expenses:  {}", money(t.expenses));
    println!("Transfers: {}", money(t.transfers));
    println!("Net:       {}", money_delta(t.net));

    let categories = category_stats(&transactions, &accounts, year, mm);
    if categories.is_empty() {
        return Ok(());
    }
    let mut table = Table::new();
    table.set_header(vec!["Category", "Amount", "Count", "%"]);
    for c in &categories {
        table.add_row(vec![
            Cell::new(&c.category),
            Cell::new(money(c.amount)),
            Cell::new(c.count),
            Cell::new(format!("{:.1}%", c.percentage)),
        ]);
    }
    println!("\nSpending by category\n{table}");
    Ok(())
}
