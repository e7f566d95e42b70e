use std::collections::HashSet;

use crate::csvio::RawRecord;
use crate::error::{KeeshaError, Result};
use crate::models::{new_id, Account, DraftRow};
use crate::validate::validate_row;

/// Which draft-row field an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowField {
    Title,
    Amount,
    FromAccount,
    ToAccount,
    Date,
    Description,
    IsImportant,
}

impl RowField {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "title" => Some(Self::Title),
            "amount" => Some(Self::Amount),
            "from" | "fromAccount" => Some(Self::FromAccount),
            "to" | "toAccount" => Some(Self::ToAccount),
            "date" => Some(Self::Date),
            "description" | "desc" => Some(Self::Description),
            "important" | "isImportant" => Some(Self::IsImportant),
            _ => None,
        }
    }
}

/// In-memory ordered list of draft rows. Every mutation that can change a
/// row's validity re-validates it immediately, so rows are never in an
/// unvalidated state; invalid rows are never selected.
#[derive(Debug, Default)]
pub struct DraftState {
    rows: Vec<DraftRow>,
}

impl DraftState {
    /// Build from freshly parsed records: one row per record, validated,
    /// with valid rows auto-selected and invalid ones never selected.
    pub fn from_records(records: Vec<RawRecord>, accounts: &[Account]) -> Self {
        let rows = records
            .into_iter()
            .map(|record| {
                let mut row = DraftRow {
                    id: new_id(),
                    title: record.title,
                    amount: record.amount,
                    from_account: record.from_account,
                    to_account: record.to_account,
                    from_account_id: None,
                    to_account_id: None,
                    date: record.date,
                    description: record.description,
                    is_important: record.is_important,
                    valid: false,
                    errors: Vec::new(),
                    selected: false,
                };
                validate_row(&mut row, accounts);
                row.selected = row.valid;
                row
            })
            .collect();
        Self { rows }
    }

    /// Resume from previously validated rows (session or autosave snapshot).
    pub fn from_rows(rows: Vec<DraftRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[DraftRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn valid_count(&self) -> usize {
        self.rows.iter().filter(|r| r.valid).count()
    }

    pub fn selected_valid_count(&self) -> usize {
        self.rows.iter().filter(|r| r.valid && r.selected).count()
    }

    pub fn selected_valid_rows(&self) -> Vec<DraftRow> {
        self.rows.iter().filter(|r| r.valid && r.selected).cloned().collect()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.rows.len() {
            return Err(KeeshaError::Other(format!(
                "No row {} (have {})",
                index + 1,
                self.rows.len()
            )));
        }
        Ok(())
    }

    /// Edit one field, then re-validate that row. A row that turns invalid
    /// is forcibly deselected; one edited back to valid stays unselected
    /// until the user selects it again.
    pub fn update_field(
        &mut self,
        index: usize,
        field: RowField,
        value: &str,
        accounts: &[Account],
    ) -> Result<()> {
        self.check_index(index)?;
        let row = &mut self.rows[index];
        match field {
            RowField::Title => row.title = value.to_string(),
            RowField::Amount => row.amount = value.to_string(),
            RowField::FromAccount => row.from_account = value.to_string(),
            RowField::ToAccount => row.to_account = value.to_string(),
            RowField::Date => row.date = value.to_string(),
            RowField::Description => row.description = value.to_string(),
            RowField::IsImportant => row.is_important = matches!(value, "true" | "yes" | "1"),
        }
        validate_row(row, accounts);
        if !row.valid {
            row.selected = false;
        }
        Ok(())
    }

    /// Toggle selection. Invalid rows can never be selected.
    pub fn toggle_selected(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        let row = &mut self.rows[index];
        if row.valid {
            row.selected = !row.selected;
        } else {
            row.selected = false;
        }
        Ok(())
    }

    pub fn select_all_valid(&mut self) {
        for row in &mut self.rows {
            row.selected = row.valid;
        }
    }

    pub fn deselect_all(&mut self) {
        for row in &mut self.rows {
            row.selected = false;
        }
    }

    pub fn remove(&mut self, index: usize) -> Result<DraftRow> {
        self.check_index(index)?;
        Ok(self.rows.remove(index))
    }

    /// Remove rows by id; used after a commit to prune exactly the
    /// committed rows, leaving everything else untouched.
    pub fn remove_ids(&mut self, ids: &HashSet<String>) {
        self.rows.retain(|row| !ids.contains(&row.id));
    }

    /// Move the row at `from` to position `to`, shifting the rows between.
    pub fn move_row(&mut self, from: usize, to: usize) -> Result<()> {
        self.check_index(from)?;
        self.check_index(to)?;
        let row = self.rows.remove(from);
        self.rows.insert(to, row);
        Ok(())
    }

    /// Insert a blank row (dated today, validated so its errors display) at
    /// `index`, clamped to the list bounds.
    pub fn insert_blank(&mut self, index: usize, accounts: &[Account]) {
        let mut row = DraftRow::blank();
        validate_row(&mut row, accounts);
        let at = index.min(self.rows.len());
        self.rows.insert(at, row);
    }

    /// Insert a copy of the row at `index` directly after it, unselected.
    pub fn insert_copy(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        let copy = self.rows[index].duplicate();
        self.rows.insert(index + 1, copy);
        Ok(())
    }

    /// Re-validate every row against an updated account list. Selection is
    /// preserved only for rows that remain valid.
    pub fn revalidate_all(&mut self, accounts: &[Account]) {
        for row in &mut self.rows {
            validate_row(row, accounts);
            if !row.valid {
                row.selected = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AccountType;

    fn account(id: &str, name: &str, account_type: AccountType) -> Account {
        Account {
            id: id.to_string(),
            name: name.to_string(),
            account_type,
            balance: 0.0,
            description: None,
        }
    }

    fn accounts() -> Vec<Account> {
        vec![
            account("a1", "Main Bank Account", AccountType::Bank),
            account("a2", "Housing", AccountType::Expense),
        ]
    }

    fn record(title: &str, amount: &str, from: &str, to: &str, date: &str) -> RawRecord {
        RawRecord {
            title: title.to_string(),
            amount: amount.to_string(),
            from_account: from.to_string(),
            to_account: to.to_string(),
            date: date.to_string(),
            description: String::new(),
            is_important: false,
        }
    }

    fn draft() -> DraftState {
        DraftState::from_records(
            vec![
                record("Rent", "1200.00", "Main Bank Account", "Housing", "2025-01-01"),
                record("Bad", "abc", "Main Bank Account", "Housing", "2025-01-02"),
            ],
            &accounts(),
        )
    }

    #[test]
    fn test_ingest_auto_selects_only_valid_rows() {
        let d = draft();
        assert!(d.rows()[0].valid && d.rows()[0].selected);
        assert!(!d.rows()[1].valid && !d.rows()[1].selected);
    }

    #[test]
    fn test_toggle_never_selects_invalid() {
        let mut d = draft();
        d.toggle_selected(1).unwrap();
        assert!(!d.rows()[1].selected);
        d.toggle_selected(0).unwrap();
        assert!(!d.rows()[0].selected);
        d.toggle_selected(0).unwrap();
        assert!(d.rows()[0].selected);
    }

    #[test]
    fn test_select_all_then_deselect_all_preserves_validity() {
        let mut d = draft();
        d.select_all_valid();
        assert!(d.rows()[0].selected);
        assert!(!d.rows()[1].selected);
        let validity: Vec<bool> = d.rows().iter().map(|r| r.valid).collect();
        d.deselect_all();
        assert!(d.rows().iter().all(|r| !r.selected));
        let validity_after: Vec<bool> = d.rows().iter().map(|r| r.valid).collect();
        assert_eq!(validity, validity_after);
    }

    #[test]
    fn test_edit_to_invalid_forcibly_deselects() {
        let mut d = draft();
        assert!(d.rows()[0].selected);
        d.update_field(0, RowField::Amount, "-5", &accounts()).unwrap();
        assert!(!d.rows()[0].valid);
        assert!(!d.rows()[0].selected);
    }

    #[test]
    fn test_edit_back_to_valid_stays_unselected() {
        let mut d = draft();
        d.update_field(1, RowField::Amount, "10.00", &accounts()).unwrap();
        assert!(d.rows()[1].valid);
        assert!(!d.rows()[1].selected);
    }

    #[test]
    fn test_move_row_shifts_intervening() {
        let mut d = DraftState::from_records(
            vec![
                record("one", "1", "Main Bank Account", "Housing", "2025-01-01"),
                record("two", "1", "Main Bank Account", "Housing", "2025-01-01"),
                record("three", "1", "Main Bank Account", "Housing", "2025-01-01"),
            ],
            &accounts(),
        );
        d.move_row(2, 0).unwrap();
        let titles: Vec<&str> = d.rows().iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["three", "one", "two"]);
    }

    #[test]
    fn test_insert_blank_is_invalid_and_unselected() {
        let mut d = draft();
        d.insert_blank(0, &accounts());
        let row = &d.rows()[0];
        assert!(!row.valid);
        assert!(!row.selected);
        assert!(row.errors.contains(&"Title is required".to_string()));
    }

    #[test]
    fn test_insert_copy_lands_after_source_unselected() {
        let mut d = draft();
        d.insert_copy(0).unwrap();
        assert_eq!(d.len(), 3);
        assert_eq!(d.rows()[1].title, "Rent");
        assert!(!d.rows()[1].selected);
        assert_ne!(d.rows()[1].id, d.rows()[0].id);
    }

    #[test]
    fn test_revalidate_on_account_change_deselects_newly_invalid() {
        let mut d = draft();
        assert!(d.rows()[0].selected);
        // Housing disappears: row 0 becomes invalid and must lose selection.
        let fewer = vec![account("a1", "Main Bank Account", AccountType::Bank)];
        d.revalidate_all(&fewer);
        assert!(!d.rows()[0].valid);
        assert!(!d.rows()[0].selected);
        // Housing comes back: row is valid again but stays unselected.
        d.revalidate_all(&accounts());
        assert!(d.rows()[0].valid);
        assert!(!d.rows()[0].selected);
    }

    #[test]
    fn test_remove_ids_prunes_exactly_matches() {
        let mut d = draft();
        let keep_id = d.rows()[1].id.clone();
        let mut ids = HashSet::new();
        ids.insert(d.rows()[0].id.clone());
        d.remove_ids(&ids);
        assert_eq!(d.len(), 1);
        assert_eq!(d.rows()[0].id, keep_id);
    }

    #[test]
    fn test_out_of_bounds_index_errors() {
        let mut d = draft();
        assert!(d.toggle_selected(5).is_err());
        assert!(d.remove(5).is_err());
        assert!(d.move_row(0, 5).is_err());
    }
}
