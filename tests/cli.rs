//! End-to-end runs of the `scango` binary against the bundled fixtures.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name)
}

/// `scango` with an isolated HOME and no inherited workbook.
fn scango(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("scango").unwrap();
    cmd.env("HOME", home.path())
        .env("NO_COLOR", "1")
        .env_remove("SCANGO_WORKBOOK")
        .env_remove("RUST_LOG");
    cmd
}

fn with_shop(home: &TempDir) -> Command {
    let mut cmd = scango(home);
    cmd.arg("--workbook")
        .arg(fixture("shop"))
        .args(["--as-of", "2024-01-01"]);
    cmd
}

#[test]
fn test_kpi_text() {
    let home = TempDir::new().unwrap();
    with_shop(&home)
        .args(["report", "kpi", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Filter: all sales"))
        .stdout(predicate::str::contains("$2,090"))
        .stdout(predicate::str::contains("$209.00"));
}

#[test]
fn test_kpi_json() {
    let home = TempDir::new().unwrap();
    let output = with_shop(&home)
        .args(["report", "kpi", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["total_sales"], 2090);
    assert_eq!(value["transactions"], 10);
}

#[test]
fn test_filters_narrow_kpis() {
    let home = TempDir::new().unwrap();
    with_shop(&home)
        .args(["report", "kpi", "--format", "text", "--client", "Avi Cohen"])
        .assert()
        .success()
        .stdout(predicate::str::contains("$650"));
}

#[test]
fn test_category_drill_down() {
    let home = TempDir::new().unwrap();
    with_shop(&home)
        .args(["report", "categories", "--category", "coats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Items in coats"))
        .stdout(predicate::str::contains("Denim Jacket"))
        .stdout(predicate::str::contains("Wool Coat"))
        .stdout(predicate::str::contains("Basic Tee").not());
}

#[test]
fn test_summary_is_default_when_piped() {
    let home = TempDir::new().unwrap();
    with_shop(&home)
        .assert()
        .success()
        .stdout(predicate::str::contains("Key Figures"))
        .stdout(predicate::str::contains("Sales by Category"));
}

#[test]
fn test_export_writes_csv() {
    let home = TempDir::new().unwrap();
    let out = home.path().join("out").join("sales.csv");
    with_shop(&home)
        .args(["export", "--category-filter", "coats", "--output"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));

    let text = std::fs::read_to_string(&out).unwrap();
    let mut lines = text.lines();
    assert!(lines.next().unwrap().starts_with("full_name,"));
    assert_eq!(lines.count(), 3);
}

#[test]
fn test_options_lists_clients() {
    let home = TempDir::new().unwrap();
    with_shop(&home)
        .arg("options")
        .assert()
        .success()
        .stdout(predicate::str::contains("Avi Cohen, Dana Levi, Noa Mizrahi, Yossi Peretz"));
}

#[test]
fn test_load_then_status() {
    let home = TempDir::new().unwrap();
    scango(&home)
        .arg("load")
        .arg(fixture("shop"))
        .assert()
        .success()
        .stdout(predicate::str::contains("4 users, 6 items, 11 transactions (10 joined)"));

    scango(&home)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Transactions:  11"))
        .stdout(predicate::str::contains("Unmatched:     1"));
}

#[test]
fn test_corrupt_settings_are_reported() {
    let home = TempDir::new().unwrap();
    let config = home.path().join(".config").join("scango");
    std::fs::create_dir_all(&config).unwrap();
    std::fs::write(config.join("settings.json"), "{ not json").unwrap();
    scango(&home)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("(not set)"))
        .stderr(predicate::str::contains("Ignoring unreadable settings file"));
}

#[test]
fn test_status_without_workbook() {
    let home = TempDir::new().unwrap();
    scango(&home)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("(not set)"));
}

#[test]
fn test_missing_workbook_fails() {
    let home = TempDir::new().unwrap();
    scango(&home)
        .args(["report", "kpi"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error:"));
}

#[test]
fn test_inverted_age_range_fails() {
    let home = TempDir::new().unwrap();
    with_shop(&home)
        .args(["report", "kpi", "--min-age", "50", "--max-age", "20"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_completions() {
    let home = TempDir::new().unwrap();
    scango(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("scango"));
}

#[cfg(feature = "xlsx")]
#[test]
fn test_xlsx_workbook() {
    let home = TempDir::new().unwrap();
    scango(&home)
        .arg("--workbook")
        .arg(fixture("scan_and_go.xlsx"))
        .args(["--as-of", "2024-01-01", "report", "kpi", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("$2,090"));
}
