use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

// HOME is pointed at a tempdir so settings land under <tmp>/.config/keesha
// and nothing touches the real user profile.
fn keesha(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("keesha").unwrap();
    cmd.env("HOME", home);
    cmd
}

fn init(home: &Path) {
    let data_dir = home.join("keesha-data");
    std::fs::create_dir_all(&data_dir).unwrap();
    keesha(home)
        .arg("init")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized keesha"));
}

#[test]
fn test_init_seeds_default_accounts() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());

    keesha(home.path())
        .args(["accounts", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Main Bank Account"))
        .stdout(predicate::str::contains("Food & Dining"));
}

#[test]
fn test_template_roundtrips_through_import_layout() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());

    let template = home.path().join("template.csv");
    keesha(home.path())
        .arg("template")
        .arg("--output")
        .arg(&template)
        .assert()
        .success();

    let contents = std::fs::read_to_string(&template).unwrap();
    assert!(contents.starts_with("title,amount,fromAccount,toAccount,date,description,isImportant"));
    assert!(contents.contains("Main Bank Account"));
}

#[test]
fn test_tx_add_and_list_moves_balances() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());

    keesha(home.path())
        .args([
            "tx",
            "add",
            "Rent",
            "--amount",
            "1200",
            "--from",
            "Main Bank Account",
            "--to",
            "Bills & Utilities",
            "--date",
            "2025-01-01",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("$1,200.00"));

    keesha(home.path())
        .args(["tx", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rent"))
        .stdout(predicate::str::contains("2025-01-01"));

    keesha(home.path())
        .args(["accounts", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-$1,200.00"));
}

#[test]
fn test_accounts_add_rejects_clearing_type() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());

    keesha(home.path())
        .args(["accounts", "add", "Shadow", "--type", "transaction"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown account type"));
}

#[test]
fn test_accounts_add_rejects_non_finite_balance() {
    let home = tempfile::tempdir().unwrap();
    init(home.path());

    keesha(home.path())
        .args(["accounts", "add", "Weird", "--type", "bank", "--balance", "NaN"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("finite"));

    // The rejected account never lands, so listing still renders.
    keesha(home.path())
        .args(["accounts", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Weird").not());
}
