mod autosave;
mod balance;
mod cli;
mod commit;
mod csvio;
mod db;
mod draft;
mod error;
mod extract;
mod fmt;
mod models;
mod settings;
mod stats;
mod store;
mod validate;

use clap::Parser;

use cli::{AccountsCommands, Cli, Commands, SessionsCommands, TxCommands};
use settings::load_settings;

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let mut settings = load_settings();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(&mut settings, data_dir),
        Commands::Accounts { command } => match command {
            AccountsCommands::Add {
                name,
                account_type,
                balance,
                description,
            } => cli::accounts::add(&settings, &name, &account_type, balance, description.as_deref()),
            AccountsCommands::List => cli::accounts::list(&settings),
            AccountsCommands::Update {
                id,
                name,
                description,
            } => cli::accounts::update(&settings, &id, name.as_deref(), description.as_deref()),
            AccountsCommands::Rm { id } => cli::accounts::rm(&settings, &id),
        },
        Commands::Tx { command } => match command {
            TxCommands::Add {
                title,
                amount,
                from,
                to,
                date,
                description,
                important,
            } => cli::tx::add(
                &settings,
                &title,
                amount,
                &from,
                &to,
                date.as_deref(),
                description.as_deref(),
                important,
            ),
            TxCommands::List { month, year } => cli::tx::list(&settings, month, year),
            TxCommands::Rm { id } => cli::tx::rm(&settings, &id),
        },
        Commands::Import { file } => cli::import::run(&settings, &file),
        Commands::Extract { file } => cli::extract::run(&settings, &file),
        Commands::Resume => cli::resume::run(&settings),
        Commands::Sessions { command } => match command {
            SessionsCommands::List => cli::sessions::list(&settings),
            SessionsCommands::Show { id } => cli::sessions::show(&settings, &id),
            SessionsCommands::Resume { id } => cli::sessions::resume(&settings, &id),
            SessionsCommands::Rm { id } => cli::sessions::rm(&settings, &id),
        },
        Commands::Export { output } => cli::export::run(&settings, output),
        Commands::Template { output } => cli::template::run(&settings, &output),
        Commands::Stats { month, year } => cli::stats::run(&settings, month, year),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
