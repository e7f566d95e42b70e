use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::autosave::AutosaveCache;
use crate::balance::running_balances;
use crate::commit::{commit_selected, new_session};
use crate::draft::{DraftState, RowField};
use crate::error::{KeeshaError, Result};
use crate::fmt::money;
use crate::models::{Account, FileMeta, ImportSession, SessionStatus};
use crate::store::Store;

const HELP: &str = "\
Commands:
  c                     commit selected rows
  t <n>                 toggle row selection
  a / n                 select all valid / deselect all
  e <n> <field> <value> edit a field (title, amount, from, to, date, desc, important)
  d <n>                 delete row
  b [n]                 insert blank row (at position n, default end)
  y <n>                 duplicate row
  m <n> <m>             move row n to position m
  p                     preview running balances for selected rows
  s                     save as session and exit
  q                     quit (draft is auto-saved)
  ?                     this help";

pub fn print_draft(draft: &DraftState) {
    let mut table = Table::new();
    table.set_header(vec!["#", "Sel", "Title", "Amount", "From", "To", "Date", "Status"]);
    for (i, row) in draft.rows().iter().enumerate() {
        let status = if row.valid {
            "ok".green().to_string()
        } else {
            row.errors.join("; ").red().to_string()
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(if row.selected { "x" } else { "" }),
            Cell::new(&row.title),
            Cell::new(&row.amount),
            Cell::new(&row.from_account),
            Cell::new(&row.to_account),
            Cell::new(&row.date),
            Cell::new(status),
        ]);
    }
    println!("{table}");
    println!(
        "{} rows, {} valid, {} selected",
        draft.len(),
        draft.valid_count(),
        draft.selected_valid_count()
    );
}

/// Replay the selected rows against current balances and show how each
/// account moves. Display only; nothing is written.
fn print_balance_preview(draft: &DraftState, accounts: &[Account]) {
    let rows = draft.selected_valid_rows();
    if rows.is_empty() {
        println!("Nothing selected.");
        return;
    }
    let balances = running_balances(&rows, accounts);
    let name_of = |id: &str| {
        accounts
            .iter()
            .find(|a| a.id == id)
            .map(|a| a.name.as_str())
            .unwrap_or("Unknown Account")
    };

    let mut table = Table::new();
    table.set_header(vec!["Title", "Date", "From", "To"]);
    for (row, rb) in rows.iter().zip(&balances) {
        let leg = |id: &Option<String>| match id {
            Some(id) => format!(
                "{}: {} -> {}",
                name_of(id),
                money(*rb.before.get(id).unwrap_or(&0.0)),
                money(*rb.after.get(id).unwrap_or(&0.0))
            ),
            None => String::new(),
        };
        table.add_row(vec![
            Cell::new(&row.title),
            Cell::new(&row.date),
            Cell::new(leg(&row.from_account_id)),
            Cell::new(leg(&row.to_account_id)),
        ]);
    }
    println!("Balance preview (chronological replay)\n{table}");
}

fn parse_index(arg: Option<&str>, draft: &DraftState) -> Result<usize> {
    let raw = arg.ok_or_else(|| KeeshaError::Other("Row number required".to_string()))?;
    let n: usize = raw
        .parse()
        .map_err(|_| KeeshaError::Other(format!("Not a row number: '{raw}'")))?;
    if n == 0 || n > draft.len() {
        return Err(KeeshaError::Other(format!("No row {n} (have {})", draft.len())));
    }
    Ok(n - 1)
}

/// Interactive review over a draft. Used by import, extract, resume, and
/// session resume; the draft is auto-saved after every mutation so a crash
/// or ctrl-c never loses edits.
pub fn review_loop(
    store: &Store,
    draft: &mut DraftState,
    mut session: Option<ImportSession>,
    autosave: &mut AutosaveCache,
    file_meta: Option<FileMeta>,
) -> Result<()> {
    let mut accounts = store.list_accounts()?;
    autosave.flush(draft.rows(), file_meta.as_ref());
    print_draft(draft);
    println!("Type ? for commands.");

    loop {
        let mut line = String::new();
        if std::io::stdin().read_line(&mut line)? == 0 {
            autosave.flush(draft.rows(), file_meta.as_ref());
            return Ok(());
        }
        let mut parts = line.trim().splitn(4, ' ');
        let cmd = parts.next().unwrap_or("");

        let outcome: Result<()> = match cmd {
            "" => {
                print_draft(draft);
                Ok(())
            }
            "?" | "h" | "help" => {
                println!("{HELP}");
                Ok(())
            }
            "t" => parse_index(parts.next(), draft).and_then(|i| draft.toggle_selected(i)),
            "a" => {
                draft.select_all_valid();
                Ok(())
            }
            "n" => {
                draft.deselect_all();
                Ok(())
            }
            "e" => {
                let index = parse_index(parts.next(), draft);
                let field = parts
                    .next()
                    .and_then(RowField::parse)
                    .ok_or_else(|| KeeshaError::Other("Unknown field".to_string()));
                let value = parts.next().unwrap_or("").to_string();
                index.and_then(|i| field.and_then(|f| draft.update_field(i, f, value.trim(), &accounts)))
            }
            "d" => parse_index(parts.next(), draft).and_then(|i| draft.remove(i).map(|_| ())),
            "b" => {
                let at = match parts.next() {
                    Some(raw) => raw.parse::<usize>().ok().map(|n| n.saturating_sub(1)),
                    None => Some(draft.len()),
                };
                match at {
                    Some(at) => {
                        draft.insert_blank(at, &accounts);
                        Ok(())
                    }
                    None => Err(KeeshaError::Other("Not a row number".to_string())),
                }
            }
            "y" => parse_index(parts.next(), draft).and_then(|i| draft.insert_copy(i)),
            "m" => {
                let from = parse_index(parts.next(), draft);
                let to = parse_index(parts.next(), draft);
                from.and_then(|f| to.and_then(|t| draft.move_row(f, t)))
            }
            "p" => {
                print_balance_preview(draft, &accounts);
                Ok(())
            }
            "s" => {
                let mut s = session
                    .take()
                    .unwrap_or_else(|| new_session(file_name(&file_meta), None, draft));
                s.rows = draft.rows().to_vec();
                s.valid_rows = draft.valid_count();
                s.status = SessionStatus::Pending;
                store.save_session(&s)?;
                println!("Saved session {} ({})", s.name, s.id);
                autosave.flush(draft.rows(), file_meta.as_ref());
                return Ok(());
            }
            "q" => {
                autosave.flush(draft.rows(), file_meta.as_ref());
                if !draft.is_empty() {
                    println!("Draft auto-saved. Run `keesha resume` to continue.");
                }
                return Ok(());
            }
            "c" => match commit_selected(store, draft, &mut session, file_name(&file_meta)) {
                Ok(outcome) => {
                    println!(
                        "{}",
                        format!("Imported {} transactions.", outcome.imported).green()
                    );
                    accounts = store.list_accounts()?;
                    draft.revalidate_all(&accounts);
                    if draft.is_empty() {
                        autosave.clear();
                        return Ok(());
                    }
                    autosave.flush(draft.rows(), file_meta.as_ref());
                    println!("{} rows remain.", draft.len());
                    Ok(())
                }
                Err(KeeshaError::NothingSelected) => {
                    println!("{}", KeeshaError::NothingSelected.to_string().yellow());
                    Ok(())
                }
                Err(e) => Err(e),
            },
            other => Err(KeeshaError::Other(format!("Unknown command '{other}' (? for help)"))),
        };

        match outcome {
            Ok(()) => {
                autosave.save(draft.rows(), file_meta.as_ref());
                if !matches!(cmd, "" | "?" | "h" | "help" | "p") {
                    print_draft(draft);
                }
            }
            Err(e) => println!("{}", e.to_string().red()),
        }
    }
}

fn file_name(meta: &Option<FileMeta>) -> &str {
    meta.as_ref().map(|m| m.name.as_str()).unwrap_or("draft")
}
