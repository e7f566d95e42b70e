use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;
use crate::models::new_id;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS accounts (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    account_type TEXT NOT NULL,
    balance REAL NOT NULL DEFAULT 0,
    description TEXT,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS transactions (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    amount REAL NOT NULL,
    from_account_id TEXT NOT NULL,
    to_account_id TEXT NOT NULL,
    date TEXT NOT NULL,
    description TEXT,
    is_important INTEGER NOT NULL DEFAULT 0,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (from_account_id) REFERENCES accounts(id),
    FOREIGN KEY (to_account_id) REFERENCES accounts(id)
);

CREATE TABLE IF NOT EXISTS import_sessions (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    file_name TEXT NOT NULL,
    import_date TEXT NOT NULL,
    total_rows INTEGER NOT NULL,
    valid_rows INTEGER NOT NULL,
    imported_rows INTEGER NOT NULL,
    status TEXT NOT NULL,
    rows_json TEXT NOT NULL,
    checksum TEXT,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);
";

// (name, account_type, description)
const DEFAULT_ACCOUNTS: &[(&str, &str, &str)] = &[
    ("Main Bank Account", "bank", "Primary checking account"),
    ("Savings Account", "asset", "Savings"),
    ("Credit Card", "liability", "Credit card balance"),
    ("Salary", "income", "Monthly salary"),
    ("Other Income", "income", "Anything else coming in"),
    ("Food & Dining", "expense", "Groceries, restaurants"),
    ("Transportation", "expense", "Fuel, transit, taxis"),
    ("Shopping", "expense", "General purchases"),
    ("Entertainment", "expense", "Movies, games, leisure"),
    ("Bills & Utilities", "expense", "Electricity, water, internet, phone"),
    ("Healthcare", "expense", "Medical expenses"),
    ("Education", "expense", "Courses, books"),
    ("Travel", "expense", "Trips and holidays"),
    ("Other", "expense", "Uncategorized spending"),
    ("Unknown", "transaction", "Clearing account for unresolved imports"),
];

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;

    let count: i64 = conn.query_row("SELECT count(*) FROM accounts", [], |row| row.get(0))?;
    if count == 0 {
        for (name, account_type, description) in DEFAULT_ACCOUNTS {
            conn.execute(
                "INSERT INTO accounts (id, name, account_type, balance, description) VALUES (?1, ?2, ?3, 0, ?4)",
                rusqlite::params![new_id(), name, account_type, description],
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    #[test]
    fn test_init_db_creates_tables() {
        let (_dir, conn) = test_db();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        for expected in &["accounts", "transactions", "import_sessions"] {
            assert!(tables.contains(&expected.to_string()), "missing table: {expected}");
        }
    }

    #[test]
    fn test_init_db_is_idempotent() {
        let (_dir, conn) = test_db();
        init_db(&conn).unwrap();
        let count: i64 = conn.query_row("SELECT count(*) FROM accounts", [], |r| r.get(0)).unwrap();
        assert_eq!(count as usize, super::DEFAULT_ACCOUNTS.len());
    }

    #[test]
    fn test_init_db_seeds_default_accounts() {
        let (_dir, conn) = test_db();
        let bank: i64 = conn.query_row(
            "SELECT count(*) FROM accounts WHERE account_type = 'bank'", [], |r| r.get(0),
        ).unwrap();
        let expense: i64 = conn.query_row(
            "SELECT count(*) FROM accounts WHERE account_type = 'expense'", [], |r| r.get(0),
        ).unwrap();
        assert!(bank >= 1);
        assert!(expense >= 8, "expected >= 8 expense accounts, got {expense}");
    }

    #[test]
    fn test_init_db_seeds_unknown_clearing_account() {
        let (_dir, conn) = test_db();
        let account_type: String = conn.query_row(
            "SELECT account_type FROM accounts WHERE name = 'Unknown'", [], |r| r.get(0),
        ).unwrap();
        assert_eq!(account_type, "transaction");
    }

    #[test]
    fn test_seeded_balances_start_at_zero() {
        let (_dir, conn) = test_db();
        let nonzero: i64 = conn.query_row(
            "SELECT count(*) FROM accounts WHERE balance != 0", [], |r| r.get(0),
        ).unwrap();
        assert_eq!(nonzero, 0);
    }
}
