use crate::autosave::AutosaveCache;
use crate::cli::review::review_loop;
use crate::db::get_connection;
use crate::draft::DraftState;
use crate::error::Result;
use crate::settings::Settings;
use crate::store::Store;

/// Reopen the auto-saved draft from a previous run, if one survives.
pub fn run(settings: &Settings) -> Result<()> {
    let mut autosave = AutosaveCache::new(settings.autosave_path());
    let Some(snapshot) = autosave.load() else {
        println!("No saved draft to resume (snapshots expire after 24 hours).");
        return Ok(());
    };

    let store = Store::new(get_connection(&settings.db_path())?);
    let accounts = store.list_accounts()?;
    let mut draft = DraftState::from_rows(snapshot.rows);
    // Accounts may have changed since the snapshot was taken.
    draft.revalidate_all(&accounts);

    if let Some(meta) = &snapshot.file_meta {
        println!("Resuming draft from {} ({} rows).", meta.name, draft.len());
    } else {
        println!("Resuming draft ({} rows).", draft.len());
    }
    review_loop(&store, &mut draft, None, &mut autosave, snapshot.file_meta)
}
