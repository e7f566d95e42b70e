use crate::csvio::render_template;
use crate::db::get_connection;
use crate::error::Result;
use crate::settings::Settings;
use crate::store::Store;

pub fn run(settings: &Settings, output: &str) -> Result<()> {
    let store = Store::new(get_connection(&settings.db_path())?);
    let accounts = store.list_accounts()?;
    std::fs::write(output, render_template(&accounts))?;
    println!("Wrote template to {output}");
    Ok(())
}
