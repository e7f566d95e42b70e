use rand::Rng;
use serde::{Deserialize, Serialize};

/// Opaque string id: epoch millis plus a random alphanumeric suffix.
pub fn new_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: String = rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(9)
        .map(char::from)
        .collect();
    format!("{millis}{suffix}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Bank,
    Income,
    Expense,
    Asset,
    Liability,
    /// Clearing/placeholder type; the seeded "Unknown" account uses it.
    Transaction,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bank => "bank",
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Transaction => "transaction",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "bank" => Some(Self::Bank),
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            "asset" => Some(Self::Asset),
            "liability" => Some(Self::Liability),
            "transaction" => Some(Self::Transaction),
            _ => None,
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub balance: f64,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub title: String,
    pub amount: f64,
    pub from_account_id: String,
    pub to_account_id: String,
    /// Calendar day, YYYY-MM-DD. No time component.
    pub date: String,
    pub description: Option<String>,
    pub is_important: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Income,
    Expense,
    Transfer,
}

impl Transaction {
    /// Derived classification; computed from the referenced account types,
    /// never stored.
    pub fn kind(&self, accounts: &[Account]) -> TransactionKind {
        let from = accounts.iter().find(|a| a.id == self.from_account_id);
        let to = accounts.iter().find(|a| a.id == self.to_account_id);
        match (from.map(|a| a.account_type), to.map(|a| a.account_type)) {
            (Some(AccountType::Income), Some(AccountType::Bank)) => TransactionKind::Income,
            (Some(AccountType::Bank), Some(AccountType::Expense)) => TransactionKind::Expense,
            _ => TransactionKind::Transfer,
        }
    }
}

/// Import-time staging row. Field values stay in string form until commit;
/// `from_account_id`/`to_account_id` carry the canonical resolution written
/// by the validator, and everything downstream reads only those.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftRow {
    pub id: String,
    pub title: String,
    pub amount: String,
    /// Raw account reference as given (name or id).
    pub from_account: String,
    pub to_account: String,
    #[serde(default)]
    pub from_account_id: Option<String>,
    #[serde(default)]
    pub to_account_id: Option<String>,
    pub date: String,
    pub description: String,
    pub is_important: bool,
    pub valid: bool,
    pub errors: Vec<String>,
    pub selected: bool,
}

impl DraftRow {
    /// Blank row dated today; invalid until edited.
    pub fn blank() -> Self {
        Self {
            id: new_id(),
            title: String::new(),
            amount: String::new(),
            from_account: String::new(),
            to_account: String::new(),
            from_account_id: None,
            to_account_id: None,
            date: chrono::Local::now().format("%Y-%m-%d").to_string(),
            description: String::new(),
            is_important: false,
            valid: false,
            errors: Vec::new(),
            selected: false,
        }
    }

    /// Copy with a fresh id and selection reset.
    pub fn duplicate(&self) -> Self {
        Self {
            id: new_id(),
            selected: false,
            ..self.clone()
        }
    }
}

/// Metadata about the originally chosen file, mirrored into the auto-save
/// snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMeta {
    pub name: String,
    pub size: u64,
    pub last_modified: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Partial,
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Partial => "partial",
            Self::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "partial" => Some(Self::Partial),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Durable record of a draft batch: counts, status, and the residual rows
/// not yet committed. Never auto-deleted.
#[derive(Debug, Clone)]
pub struct ImportSession {
    pub id: String,
    pub name: String,
    pub file_name: String,
    /// RFC 3339 timestamp of the first save.
    pub import_date: String,
    pub total_rows: usize,
    pub valid_rows: usize,
    pub imported_rows: usize,
    pub status: SessionStatus,
    pub rows: Vec<DraftRow>,
    pub checksum: Option<String>,
}
