use rusqlite::{params, Connection, Row};

use crate::error::{KeeshaError, Result};
use crate::models::{Account, AccountType, DraftRow, ImportSession, SessionStatus, Transaction};

/// All persistence behind one seam. Every write that touches both a
/// transaction row and account balances runs inside a single SQLite
/// transaction, so balances can never drift from the ledger.
pub struct Store {
    conn: Connection,
}

fn account_from_row(row: &Row) -> rusqlite::Result<Account> {
    let type_raw: String = row.get("account_type")?;
    Ok(Account {
        id: row.get("id")?,
        name: row.get("name")?,
        account_type: AccountType::parse(&type_raw).unwrap_or(AccountType::Transaction),
        balance: row.get("balance")?,
        description: row.get("description")?,
    })
}

fn transaction_from_row(row: &Row) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: row.get("id")?,
        title: row.get("title")?,
        amount: row.get("amount")?,
        from_account_id: row.get("from_account_id")?,
        to_account_id: row.get("to_account_id")?,
        date: row.get("date")?,
        description: row.get("description")?,
        is_important: row.get("is_important")?,
    })
}

impl Store {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    // --- accounts ---

    pub fn add_account(&self, account: &Account) -> Result<()> {
        self.conn.execute(
            "INSERT INTO accounts (id, name, account_type, balance, description)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                account.id,
                account.name,
                account.account_type.as_str(),
                account.balance,
                account.description,
            ],
        )?;
        Ok(())
    }

    pub fn update_account(&self, account: &Account) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE accounts SET name = ?2, account_type = ?3, balance = ?4,
             description = ?5, updated_at = datetime('now') WHERE id = ?1",
            params![
                account.id,
                account.name,
                account.account_type.as_str(),
                account.balance,
                account.description,
            ],
        )?;
        if changed == 0 {
            return Err(KeeshaError::UnknownAccount(account.id.clone()));
        }
        Ok(())
    }

    /// Refuses to delete an account any transaction still references.
    pub fn delete_account(&self, id: &str) -> Result<()> {
        let referenced: i64 = self.conn.query_row(
            "SELECT count(*) FROM transactions WHERE from_account_id = ?1 OR to_account_id = ?1",
            [id],
            |r| r.get(0),
        )?;
        if referenced > 0 {
            return Err(KeeshaError::AccountInUse(id.to_string()));
        }
        let changed = self.conn.execute("DELETE FROM accounts WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(KeeshaError::UnknownAccount(id.to_string()));
        }
        Ok(())
    }

    pub fn get_account(&self, id: &str) -> Result<Account> {
        self.conn
            .query_row("SELECT * FROM accounts WHERE id = ?1", [id], account_from_row)
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => KeeshaError::UnknownAccount(id.to_string()),
                other => other.into(),
            })
    }

    pub fn find_account_by_name(&self, name: &str) -> Result<Option<Account>> {
        let mut stmt = self.conn.prepare("SELECT * FROM accounts WHERE name = ?1")?;
        let mut rows = stmt.query_map([name], account_from_row)?;
        match rows.next() {
            Some(account) => Ok(Some(account?)),
            None => Ok(None),
        }
    }

    pub fn list_accounts(&self) -> Result<Vec<Account>> {
        let mut stmt = self.conn.prepare("SELECT * FROM accounts ORDER BY name")?;
        let accounts = stmt
            .query_map([], account_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(accounts)
    }

    // --- transactions ---

    /// Insert and shift both account balances in one SQLite transaction.
    pub fn add_transaction(&self, tx: &Transaction) -> Result<()> {
        let sql_tx = self.conn.unchecked_transaction()?;
        insert_transaction(&sql_tx, tx)?;
        apply_delta(&sql_tx, &tx.from_account_id, -tx.amount)?;
        apply_delta(&sql_tx, &tx.to_account_id, tx.amount)?;
        sql_tx.commit()?;
        Ok(())
    }

    /// Revert the stored transaction's balance effect, then apply the new
    /// one, all atomically.
    pub fn update_transaction(&self, tx: &Transaction) -> Result<()> {
        let old = self.get_transaction(&tx.id)?;
        let sql_tx = self.conn.unchecked_transaction()?;
        apply_delta(&sql_tx, &old.from_account_id, old.amount)?;
        apply_delta(&sql_tx, &old.to_account_id, -old.amount)?;
        sql_tx.execute(
            "UPDATE transactions SET title = ?2, amount = ?3, from_account_id = ?4,
             to_account_id = ?5, date = ?6, description = ?7, is_important = ?8,
             updated_at = datetime('now') WHERE id = ?1",
            params![
                tx.id,
                tx.title,
                tx.amount,
                tx.from_account_id,
                tx.to_account_id,
                tx.date,
                tx.description,
                tx.is_important,
            ],
        )?;
        apply_delta(&sql_tx, &tx.from_account_id, -tx.amount)?;
        apply_delta(&sql_tx, &tx.to_account_id, tx.amount)?;
        sql_tx.commit()?;
        Ok(())
    }

    pub fn delete_transaction(&self, id: &str) -> Result<()> {
        let old = self.get_transaction(id)?;
        let sql_tx = self.conn.unchecked_transaction()?;
        apply_delta(&sql_tx, &old.from_account_id, old.amount)?;
        apply_delta(&sql_tx, &old.to_account_id, -old.amount)?;
        sql_tx.execute("DELETE FROM transactions WHERE id = ?1", [id])?;
        sql_tx.commit()?;
        Ok(())
    }

    pub fn get_transaction(&self, id: &str) -> Result<Transaction> {
        self.conn
            .query_row("SELECT * FROM transactions WHERE id = ?1", [id], transaction_from_row)
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    KeeshaError::UnknownTransaction(id.to_string())
                }
                other => other.into(),
            })
    }

    /// Newest first, ties broken by creation time so a freshly imported
    /// batch lists in a stable order.
    pub fn list_transactions(&self) -> Result<Vec<Transaction>> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM transactions ORDER BY date DESC, created_at DESC")?;
        let txs = stmt
            .query_map([], transaction_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(txs)
    }

    /// Insert a whole batch and settle every touched account's balance in
    /// one SQLite transaction. Either all rows land or none do.
    pub fn commit_import(&self, transactions: &[Transaction]) -> Result<()> {
        let sql_tx = self.conn.unchecked_transaction()?;
        for tx in transactions {
            insert_transaction(&sql_tx, tx)?;
            apply_delta(&sql_tx, &tx.from_account_id, -tx.amount)?;
            apply_delta(&sql_tx, &tx.to_account_id, tx.amount)?;
        }
        sql_tx.commit()?;
        Ok(())
    }

    // --- import sessions ---

    pub fn save_session(&self, session: &ImportSession) -> Result<()> {
        let rows_json = serde_json::to_string(&session.rows)
            .map_err(|e| KeeshaError::Other(format!("session rows encode failed: {e}")))?;
        self.conn.execute(
            "INSERT INTO import_sessions
               (id, name, file_name, import_date, total_rows, valid_rows,
                imported_rows, status, rows_json, checksum)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(id) DO UPDATE SET
               name = excluded.name,
               file_name = excluded.file_name,
               import_date = excluded.import_date,
               total_rows = excluded.total_rows,
               valid_rows = excluded.valid_rows,
               imported_rows = excluded.imported_rows,
               status = excluded.status,
               rows_json = excluded.rows_json,
               checksum = excluded.checksum,
               updated_at = datetime('now')",
            params![
                session.id,
                session.name,
                session.file_name,
                session.import_date,
                session.total_rows as i64,
                session.valid_rows as i64,
                session.imported_rows as i64,
                session.status.as_str(),
                rows_json,
                session.checksum,
            ],
        )?;
        Ok(())
    }

    pub fn delete_session(&self, id: &str) -> Result<()> {
        let changed = self.conn.execute("DELETE FROM import_sessions WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(KeeshaError::UnknownSession(id.to_string()));
        }
        Ok(())
    }

    pub fn get_session(&self, id: &str) -> Result<ImportSession> {
        self.conn
            .query_row("SELECT * FROM import_sessions WHERE id = ?1", [id], session_from_row)
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => KeeshaError::UnknownSession(id.to_string()),
                other => other.into(),
            })
    }

    pub fn list_sessions(&self) -> Result<Vec<ImportSession>> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM import_sessions ORDER BY import_date DESC")?;
        let sessions = stmt
            .query_map([], session_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(sessions)
    }
}

fn insert_transaction(conn: &Connection, tx: &Transaction) -> Result<()> {
    conn.execute(
        "INSERT INTO transactions
           (id, title, amount, from_account_id, to_account_id, date, description, is_important)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            tx.id,
            tx.title,
            tx.amount,
            tx.from_account_id,
            tx.to_account_id,
            tx.date,
            tx.description,
            tx.is_important,
        ],
    )?;
    Ok(())
}

fn apply_delta(conn: &Connection, account_id: &str, delta: f64) -> Result<()> {
    conn.execute(
        "UPDATE accounts SET balance = balance + ?2, updated_at = datetime('now') WHERE id = ?1",
        params![account_id, delta],
    )?;
    Ok(())
}

fn session_from_row(row: &Row) -> rusqlite::Result<ImportSession> {
    let status_raw: String = row.get("status")?;
    let rows_json: String = row.get("rows_json")?;
    let rows: Vec<DraftRow> = serde_json::from_str(&rows_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(ImportSession {
        id: row.get("id")?,
        name: row.get("name")?,
        file_name: row.get("file_name")?,
        import_date: row.get("import_date")?,
        total_rows: row.get::<_, i64>("total_rows")? as usize,
        valid_rows: row.get::<_, i64>("valid_rows")? as usize,
        imported_rows: row.get::<_, i64>("imported_rows")? as usize,
        status: SessionStatus::parse(&status_raw).unwrap_or(SessionStatus::Pending),
        rows,
        checksum: row.get("checksum")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};
    use crate::models::new_id;

    fn test_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, Store::new(conn))
    }

    fn account_id(store: &Store, name: &str) -> String {
        store.find_account_by_name(name).unwrap().unwrap().id
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

    #[test]
    fn test_add_transaction_moves_balances() {
        let (_dir, store) = test_store();
        let bank = account_id(&store, "Main Bank Account");
        let housing = account_id(&store, "Bills & Utilities");
        store.add_transaction(&txn(&bank, &housing, 120.0, "2025-01-01")).unwrap();
        assert_eq!(store.get_account(&bank).unwrap().balance, -120.0);
        assert_eq!(store.get_account(&housing).unwrap().balance, 120.0);
    }

    #[test]
    fn test_update_transaction_reverts_old_effect() {
        let (_dir, store) = test_store();
        let bank = account_id(&store, "Main Bank Account");
        let housing = account_id(&store, "Bills & Utilities");
        let food = account_id(&store, "Food & Dining");
        let mut tx = txn(&bank, &housing, 100.0, "2025-01-01");
        store.add_transaction(&tx).unwrap();

        tx.amount = 40.0;
        tx.to_account_id = food.clone();
        store.update_transaction(&tx).unwrap();

        assert_eq!(store.get_account(&bank).unwrap().balance, -40.0);
        assert_eq!(store.get_account(&housing).unwrap().balance, 0.0);
        assert_eq!(store.get_account(&food).unwrap().balance, 40.0);
    }

    #[test]
    fn test_delete_transaction_restores_balances() {
        let (_dir, store) = test_store();
        let bank = account_id(&store, "Main Bank Account");
        let housing = account_id(&store, "Bills & Utilities");
        let tx = txn(&bank, &housing, 75.0, "2025-01-01");
        store.add_transaction(&tx).unwrap();
        store.delete_transaction(&tx.id).unwrap();
        assert_eq!(store.get_account(&bank).unwrap().balance, 0.0);
        assert_eq!(store.get_account(&housing).unwrap().balance, 0.0);
        assert!(matches!(
            store.get_transaction(&tx.id),
            Err(KeeshaError::UnknownTransaction(_))
        ));
    }

    #[test]
    fn test_delete_account_in_use_refused() {
        let (_dir, store) = test_store();
        let bank = account_id(&store, "Main Bank Account");
        let housing = account_id(&store, "Bills & Utilities");
        store.add_transaction(&txn(&bank, &housing, 10.0, "2025-01-01")).unwrap();
        assert!(matches!(
            store.delete_account(&bank),
            Err(KeeshaError::AccountInUse(_))
        ));
        // Still deletable once nothing references it.
        let savings = account_id(&store, "Savings Account");
        store.delete_account(&savings).unwrap();
    }

    #[test]
    fn test_list_transactions_newest_first() {
        let (_dir, store) = test_store();
        let bank = account_id(&store, "Main Bank Account");
        let housing = account_id(&store, "Bills & Utilities");
        store.add_transaction(&txn(&bank, &housing, 1.0, "2025-01-05")).unwrap();
        store.add_transaction(&txn(&bank, &housing, 2.0, "2025-03-01")).unwrap();
        store.add_transaction(&txn(&bank, &housing, 3.0, "2025-02-10")).unwrap();
        let dates: Vec<String> = store
            .list_transactions()
            .unwrap()
            .into_iter()
            .map(|t| t.date)
            .collect();
        assert_eq!(dates, vec!["2025-03-01", "2025-02-10", "2025-01-05"]);
    }

    #[test]
    fn test_commit_import_is_atomic() {
        let (_dir, store) = test_store();
        let bank = account_id(&store, "Main Bank Account");
        let housing = account_id(&store, "Bills & Utilities");
        let good = txn(&bank, &housing, 10.0, "2025-01-01");
        let mut dup = txn(&bank, &housing, 20.0, "2025-01-02");
        dup.id = good.id.clone(); // primary key collision fails the batch

        let err = store.commit_import(&[good, dup]);
        assert!(err.is_err());
        assert_eq!(store.list_transactions().unwrap().len(), 0);
        assert_eq!(store.get_account(&bank).unwrap().balance, 0.0);
        assert_eq!(store.get_account(&housing).unwrap().balance, 0.0);
    }

    #[test]
    fn test_commit_import_applies_all_deltas() {
        let (_dir, store) = test_store();
        let bank = account_id(&store, "Main Bank Account");
        let housing = account_id(&store, "Bills & Utilities");
        let food = account_id(&store, "Food & Dining");
        store
            .commit_import(&[
                txn(&bank, &housing, 100.0, "2025-01-01"),
                txn(&bank, &food, 50.0, "2025-01-02"),
            ])
            .unwrap();
        assert_eq!(store.get_account(&bank).unwrap().balance, -150.0);
        assert_eq!(store.get_account(&housing).unwrap().balance, 100.0);
        assert_eq!(store.get_account(&food).unwrap().balance, 50.0);
    }

    #[test]
    fn test_session_save_is_upsert_and_roundtrips_rows() {
        let (_dir, store) = test_store();
        let mut row = DraftRow::blank();
        row.title = "Rent".to_string();
        let mut session = ImportSession {
            id: new_id(),
            name: "import.csv - 2025-01-01".to_string(),
            file_name: "import.csv".to_string(),
            import_date: "2025-01-01T10:00:00Z".to_string(),
            total_rows: 1,
            valid_rows: 0,
            imported_rows: 0,
            status: SessionStatus::Pending,
            rows: vec![row],
            checksum: Some("abc123".to_string()),
        };
        store.save_session(&session).unwrap();

        session.imported_rows = 1;
        session.status = SessionStatus::Completed;
        store.save_session(&session).unwrap();

        let sessions = store.list_sessions().unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].status, SessionStatus::Completed);
        assert_eq!(sessions[0].rows[0].title, "Rent");
        assert_eq!(sessions[0].checksum.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_list_sessions_newest_import_first() {
        let (_dir, store) = test_store();
        for date in ["2025-01-01T00:00:00Z", "2025-03-01T00:00:00Z", "2025-02-01T00:00:00Z"] {
            let session = ImportSession {
                id: new_id(),
                name: date.to_string(),
                file_name: "f.csv".to_string(),
                import_date: date.to_string(),
                total_rows: 0,
                valid_rows: 0,
                imported_rows: 0,
                status: SessionStatus::Pending,
                rows: Vec::new(),
                checksum: None,
            };
            store.save_session(&session).unwrap();
        }
        let dates: Vec<String> = store
            .list_sessions()
            .unwrap()
            .into_iter()
            .map(|s| s.import_date)
            .collect();
        assert_eq!(
            dates,
            vec!["2025-03-01T00:00:00Z", "2025-02-01T00:00:00Z", "2025-01-01T00:00:00Z"]
        );
    }

    #[test]
    fn test_unknown_lookups_error_cleanly() {
        let (_dir, store) = test_store();
        assert!(matches!(store.get_account("nope"), Err(KeeshaError::UnknownAccount(_))));
        assert!(matches!(store.get_session("nope"), Err(KeeshaError::UnknownSession(_))));
        assert!(matches!(store.delete_session("nope"), Err(KeeshaError::UnknownSession(_))));
    }
}
