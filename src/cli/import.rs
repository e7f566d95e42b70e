use std::path::Path;

use sha2::{Digest, Sha256};

use crate::autosave::AutosaveCache;
use crate::cli::review::review_loop;
use crate::commit::new_session;
use crate::csvio::parse_import_file;
use crate::db::get_connection;
use crate::draft::DraftState;
use crate::error::Result;
use crate::models::FileMeta;
use crate::settings::Settings;
use crate::store::Store;

pub fn file_checksum(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

fn file_meta(path: &Path) -> Option<FileMeta> {
    let meta = std::fs::metadata(path).ok()?;
    let last_modified = meta
        .modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0);
    Some(FileMeta {
        name: path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string()),
        size: meta.len(),
        last_modified,
    })
}

pub fn run(settings: &Settings, file: &str) -> Result<()> {
    let path = Path::new(file);
    let records = parse_import_file(path)?;
    if records.is_empty() {
        println!("No rows found in {file}.");
        return Ok(());
    }

    let store = Store::new(get_connection(&settings.db_path())?);
    let accounts = store.list_accounts()?;
    let mut draft = DraftState::from_records(records, &accounts);
    let meta = file_meta(path);
    let checksum = file_checksum(path).ok();
    if let Some(checksum) = &checksum {
        // A matching checksum means this exact file was staged before.
        for session in store.list_sessions()? {
            if session.checksum.as_deref() == Some(checksum.as_str()) {
                println!(
                    "Note: this file was imported before (session '{}', {} rows committed).",
                    session.name, session.imported_rows
                );
            }
        }
    }

    let session = new_session(
        meta.as_ref().map(|m| m.name.as_str()).unwrap_or(file),
        checksum,
        &draft,
    );
    let mut autosave = AutosaveCache::new(settings.autosave_path());
    review_loop(&store, &mut draft, Some(session), &mut autosave, meta)
}
