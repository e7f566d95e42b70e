use std::path::PathBuf;

use crate::csvio::{default_export_filename, export_transactions};
use crate::db::get_connection;
use crate::error::Result;
use crate::settings::Settings;
use crate::store::Store;

pub fn run(settings: &Settings, output: Option<String>) -> Result<()> {
    let store = Store::new(get_connection(&settings.db_path())?);
    let transactions = store.list_transactions()?;
    let accounts = store.list_accounts()?;

    let path = match output {
        Some(p) => PathBuf::from(p),
        None => settings
            .data_dir()
            .join("exports")
            .join(default_export_filename(transactions.len())),
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    export_transactions(&path, &transactions, &accounts)?;
    println!("Exported {} transactions to {}", transactions.len(), path.display());
    Ok(())
}
