use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeeshaError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unknown account: {0}")]
    UnknownAccount(String),

    #[error("Account '{0}' still has transactions and cannot be deleted")]
    AccountInUse(String),

    #[error("Unknown transaction: {0}")]
    UnknownTransaction(String),

    #[error("Unknown import session: {0}")]
    UnknownSession(String),

    #[error("No selected valid rows to import. Select some valid transactions first.")]
    NothingSelected,

    #[error("Malformed import file: {0}")]
    Parse(String),

    #[error("Text extraction failed: {0}")]
    Extraction(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, KeeshaError>;
