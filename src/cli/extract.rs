use std::path::Path;

use crate::autosave::AutosaveCache;
use crate::cli::review::review_loop;
use crate::commit::new_session;
use crate::db::get_connection;
use crate::draft::DraftState;
use crate::error::Result;
use crate::extract::{run_extraction, HttpExtractor};
use crate::settings::Settings;
use crate::store::Store;

pub fn run(settings: &Settings, file: &str) -> Result<()> {
    let text = std::fs::read_to_string(Path::new(file))?;
    let store = Store::new(get_connection(&settings.db_path())?);
    let accounts = store.list_accounts()?;

    println!("Extracting transactions from {file}...");
    let extractor = HttpExtractor::new(&settings.extractor);
    let records = run_extraction(&extractor, &text, &accounts, &settings.extractor);
    if records.is_empty() {
        println!("No transactions extracted.");
        return Ok(());
    }
    println!("Extracted {} candidate rows. Review before committing.", records.len());

    let mut draft = DraftState::from_records(records, &accounts);
    let session = new_session(file, None, &draft);
    let mut autosave = AutosaveCache::new(settings.autosave_path());
    review_loop(&store, &mut draft, Some(session), &mut autosave, None)
}
