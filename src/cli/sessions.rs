use comfy_table::{Cell, Table};

use crate::autosave::AutosaveCache;
use crate::cli::review::{print_draft, review_loop};
use crate::db::get_connection;
use crate::draft::DraftState;
use crate::error::Result;
use crate::settings::Settings;
use crate::store::Store;

pub fn list(settings: &Settings) -> Result<()> {
    let store = Store::new(get_connection(&settings.db_path())?);
    let sessions = store.list_sessions()?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "File", "Imported", "Total", "Valid left", "Status"]);
    for s in &sessions {
        table.add_row(vec![
            Cell::new(&s.id),
            Cell::new(&s.name),
            Cell::new(&s.file_name),
            Cell::new(s.imported_rows),
            Cell::new(s.total_rows),
            Cell::new(s.valid_rows),
            Cell::new(s.status.as_str()),
        ]);
    }
    println!("Import sessions\n{table}");
    Ok(())
}

pub fn show(settings: &Settings, id: &str) -> Result<()> {
    let store = Store::new(get_connection(&settings.db_path())?);
    let session = store.get_session(id)?;
    println!(
        "{} ({}): {} of {} rows imported, status {}",
        session.name,
        session.file_name,
        session.imported_rows,
        session.total_rows,
        session.status.as_str()
    );
    if session.rows.is_empty() {
        println!("No rows remaining.");
    } else {
        print_draft(&DraftState::from_rows(session.rows));
    }
    Ok(())
}

pub fn resume(settings: &Settings, id: &str) -> Result<()> {
    let store = Store::new(get_connection(&settings.db_path())?);
    let session = store.get_session(id)?;
    if session.rows.is_empty() {
        println!("Session '{}' has no rows left to review.", session.name);
        return Ok(());
    }

    let accounts = store.list_accounts()?;
    let mut draft = DraftState::from_rows(session.rows.clone());
    draft.revalidate_all(&accounts);
    println!("Resuming session '{}' ({} rows).", session.name, draft.len());

    let mut autosave = AutosaveCache::new(settings.autosave_path());
    review_loop(&store, &mut draft, Some(session), &mut autosave, None)
}

pub fn rm(settings: &Settings, id: &str) -> Result<()> {
    let store = Store::new(get_connection(&settings.db_path())?);
    let session = store.get_session(id)?;
    store.delete_session(id)?;
    println!("Deleted session: {} (committed transactions kept)", session.name);
    Ok(())
}
