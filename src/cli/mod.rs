pub mod accounts;
pub mod export;
pub mod extract;
pub mod import;
pub mod init;
pub mod resume;
pub mod review;
pub mod sessions;
pub mod stats;
pub mod template;
pub mod tx;

use clap::{Parser, Subcommand};

pub(crate) fn parse_month_opt(month: &Option<String>) -> (Option<i32>, Option<u32>) {
    if let Some(m) = month {
        let parts: Vec<&str> = m.split('-').collect();
        if parts.len() == 2 {
            let year = parts[0].parse().ok();
            let month = parts[1].parse().ok();
            return (year, month);
        }
    }
    (None, None)
}

#[derive(Parser)]
#[command(name = "keesha", about = "Personal finance tracker with reviewable imports.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up Keesha: choose a data directory and initialize the database.
    Init {
        /// Path for Keesha data (default: ~/Documents/keesha)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Manage accounts.
    Accounts {
        #[command(subcommand)]
        command: AccountsCommands,
    },
    /// Manage transactions.
    Tx {
        #[command(subcommand)]
        command: TxCommands,
    },
    /// Import a CSV file and review it before committing.
    Import {
        /// Path to CSV file to import
        file: String,
    },
    /// Extract transactions from a plain-text statement using a language model.
    Extract {
        /// Path to text file (statement, receipt dump)
        file: String,
    },
    /// Continue the auto-saved draft from a previous run.
    Resume,
    /// Manage saved import sessions.
    Sessions {
        #[command(subcommand)]
        command: SessionsCommands,
    },
    /// Export all transactions to CSV.
    Export {
        /// Output file path (default: transactions_<n>_items_<date>.csv)
        #[arg(long)]
        output: Option<String>,
    },
    /// Write a sample import CSV using your account names.
    Template {
        /// Output file path
        #[arg(long, default_value = "keesha_template.csv")]
        output: String,
    },
    /// Income, spending, and per-category statistics.
    Stats {
        /// Month filter: YYYY-MM
        #[arg(long)]
        month: Option<String>,
        /// Year filter: YYYY
        #[arg(long)]
        year: Option<i32>,
    },
}

#[derive(Subcommand)]
pub enum AccountsCommands {
    /// Add a new account.
    Add {
        /// Account name, e.g. 'Main Bank Account'
        name: String,
        /// Account type: bank, income, expense, asset, liability
        #[arg(long = "type")]
        account_type: String,
        /// Opening balance
        #[arg(long, default_value = "0")]
        balance: f64,
        /// Free-form description
        #[arg(long)]
        description: Option<String>,
    },
    /// List all accounts with balances.
    List,
    /// Update an account's name or description.
    Update {
        /// Account id (shown in `keesha accounts list`)
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete an account with no transactions.
    Rm {
        /// Account id
        id: String,
    },
}

#[derive(Subcommand)]
pub enum TxCommands {
    /// Add a single transaction.
    Add {
        title: String,
        #[arg(long)]
        amount: f64,
        /// Source account name or id
        #[arg(long)]
        from: String,
        /// Destination account name or id
        #[arg(long)]
        to: String,
        /// Date: YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Flag as important
        #[arg(long)]
        important: bool,
    },
    /// List transactions, newest first.
    List {
        /// Month filter: YYYY-MM
        #[arg(long)]
        month: Option<String>,
        /// Year filter: YYYY
        #[arg(long)]
        year: Option<i32>,
    },
    /// Delete a transaction and restore the account balances.
    Rm {
        /// Transaction id
        id: String,
    },
}

#[derive(Subcommand)]
pub enum SessionsCommands {
    /// List saved import sessions.
    List,
    /// Show one session's rows.
    Show {
        /// Session id
        id: String,
    },
    /// Reopen a session's remaining rows for review.
    Resume {
        /// Session id
        id: String,
    },
    /// Delete a session record (committed transactions are untouched).
    Rm {
        /// Session id
        id: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_month_opt() {
        assert_eq!(parse_month_opt(&Some("2025-03".to_string())), (Some(2025), Some(3)));
        assert_eq!(parse_month_opt(&Some("garbage".to_string())), (None, None));
        assert_eq!(parse_month_opt(&None), (None, None));
    }
}
