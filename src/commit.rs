use std::collections::HashSet;

use crate::draft::DraftState;
use crate::error::{KeeshaError, Result};
use crate::models::{new_id, DraftRow, ImportSession, SessionStatus, Transaction};
use crate::store::Store;

#[derive(Debug)]
pub struct CommitOutcome {
    pub imported: usize,
    pub remaining: usize,
    pub session_id: Option<String>,
}

/// Build a fresh session shell for a newly ingested file. Counts reflect
/// the draft as parsed; `imported_rows` starts at zero.
pub fn new_session(file_name: &str, checksum: Option<String>, draft: &DraftState) -> ImportSession {
    let now = chrono::Utc::now();
    ImportSession {
        id: new_id(),
        name: format!("{file_name} - {}", now.format("%Y-%m-%d %H:%M")),
        file_name: file_name.to_string(),
        import_date: now.to_rfc3339(),
        total_rows: draft.len(),
        valid_rows: draft.valid_count(),
        imported_rows: 0,
        status: SessionStatus::Pending,
        rows: draft.rows().to_vec(),
        checksum,
    }
}

fn row_to_transaction(row: &DraftRow) -> Result<Transaction> {
    let from = row
        .from_account_id
        .clone()
        .ok_or_else(|| KeeshaError::Other(format!("row \"{}\" has no resolved from account", row.title)))?;
    let to = row
        .to_account_id
        .clone()
        .ok_or_else(|| KeeshaError::Other(format!("row \"{}\" has no resolved to account", row.title)))?;
    let amount: f64 = row
        .amount
        .trim()
        .parse()
        .map_err(|_| KeeshaError::Parse(format!("row \"{}\" has a non-numeric amount", row.title)))?;
    let description = row.description.trim();
    Ok(Transaction {
        id: new_id(),
        title: row.title.trim().to_string(),
        amount,
        from_account_id: from,
        to_account_id: to,
        date: row.date.clone(),
        description: if description.is_empty() {
            None
        } else {
            Some(description.to_string())
        },
        is_important: row.is_important,
    })
}

/// Commit every selected valid row: one atomic batch insert with balance
/// settlement, then prune exactly the committed rows from the draft.
///
/// A commit that leaves rows behind must survive in a session, not just
/// the expiring autosave, so when no session exists yet one is created
/// for the leftovers and stored in `session` for later updates.
///
/// Session bookkeeping is best-effort. The money is already safely in the
/// ledger by the time the session is written, so a session failure is
/// logged and the commit still reports success.
pub fn commit_selected(
    store: &Store,
    draft: &mut DraftState,
    session: &mut Option<ImportSession>,
    file_name: &str,
) -> Result<CommitOutcome> {
    let rows = draft.selected_valid_rows();
    if rows.is_empty() {
        return Err(KeeshaError::NothingSelected);
    }

    let transactions = rows
        .iter()
        .map(row_to_transaction)
        .collect::<Result<Vec<_>>>()?;
    store.commit_import(&transactions)?;

    let total_before = draft.len();
    let committed_ids: HashSet<String> = rows.iter().map(|r| r.id.clone()).collect();
    draft.remove_ids(&committed_ids);

    if session.is_none() && !draft.is_empty() {
        let mut fresh = new_session(file_name, None, draft);
        fresh.total_rows = total_before;
        *session = Some(fresh);
    }

    let session_id = if let Some(session) = session.as_mut() {
        session.imported_rows += transactions.len();
        session.rows = draft.rows().to_vec();
        session.valid_rows = draft.valid_count();
        session.status = if draft.valid_count() > 0 {
            SessionStatus::Partial
        } else {
            SessionStatus::Completed
        };
        if let Err(e) = store.save_session(session) {
            log::warn!("session update failed after commit: {e}");
        }
        Some(session.id.clone())
    } else {
        None
    };

    Ok(CommitOutcome {
        imported: transactions.len(),
        remaining: draft.len(),
        session_id,
    })
}
