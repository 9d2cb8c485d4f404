//! Integration tests for the `stay` CLI binary.
//!
//! These drive the check, nights and book subcommands through the actual binary
//! with `assert_cmd`, using the snapshot under `tests/fixtures/`.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper: path to the reservation snapshot fixture.
fn reservations_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/reservations.json")
}

/// Helper: path to a config selecting half-open boundaries.
fn half_open_config_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/half_open.json")
}

/// Helper: snapshot where one record carries an id and one does not.
fn mixed_ids_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/mixed_ids.json")
}

/// Helper: snapshot with two records sharing one id.
fn duplicate_ids_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/duplicate_ids.json")
}

fn stay() -> Command {
    let mut cmd = Command::cargo_bin("stay").unwrap();
    cmd.env_remove("STAY_CONFIG").env_remove("RUST_LOG");
    cmd
}

fn stdout_json(output: &[u8]) -> serde_json::Value {
    serde_json::from_slice(output).expect("stdout must be JSON")
}

// ─────────────────────────────────────────────────────────────────────────────
// check
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn check_reports_latest_conflict() {
    let out = stay()
        .args([
            "check", "-r", reservations_path(), "--property", "apt-7",
            "--start", "2024-01-12", "--end", "2024-01-18",
            "--now", "2023-06-01T00:00:00Z",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json = stdout_json(&out);
    assert_eq!(json["isOccupied"], true);
    assert_eq!(json["occupiedUntil"], "2024-01-20T00:00:00Z");
}

#[test]
fn check_ignores_cancelled_rows() {
    let out = stay()
        .args([
            "check", "-r", reservations_path(), "--property", "apt-7",
            "--start", "2024-02-02", "--end", "2024-02-03",
            "--now", "2023-06-01T00:00:00Z",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json = stdout_json(&out);
    assert_eq!(json["isOccupied"], false);
    assert!(json["occupiedUntil"].is_null());
}

#[test]
fn check_reads_snapshot_from_stdin() {
    let snapshot = std::fs::read_to_string(reservations_path()).unwrap();

    stay()
        .args([
            "check", "--property", "apt-7",
            "--start", "2024-01-11", "--end", "2024-01-12",
            "--now", "2023-06-01T00:00:00Z",
        ])
        .write_stdin(snapshot)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"isOccupied\": true"));
}

#[test]
fn touching_dates_conflict_unless_half_open() {
    let args = [
        "check", "-r", reservations_path(), "--property", "apt-7",
        "--start", "2024-01-20", "--end", "2024-01-22",
        "--now", "2023-06-01T00:00:00Z",
    ];

    stay()
        .args(args)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"isOccupied\": true"));

    stay()
        .args(args)
        .args(["--policy", "half-open"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"isOccupied\": false"));

    stay()
        .args(["--config", half_open_config_path()])
        .args(args)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"isOccupied\": false"));
}

#[test]
fn check_rejects_bad_date() {
    stay()
        .args([
            "check", "-r", reservations_path(), "--property", "apt-7",
            "--start", "soon", "--end", "2024-01-22",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --start"));
}

#[test]
fn check_rejects_empty_property() {
    stay()
        .args([
            "check", "-r", reservations_path(), "--property", "",
            "--start", "2024-01-20", "--end", "2024-01-22",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Property id must not be empty"));
}

#[test]
fn missing_config_file_is_an_error() {
    stay()
        .args(["--config", "/nonexistent/stay.json", "nights", "--start", "2024-01-01", "--end", "2024-01-02"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config"));
}

// ─────────────────────────────────────────────────────────────────────────────
// nights
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn nights_counts_whole_days() {
    stay()
        .args(["nights", "--start", "2024-01-10", "--end", "2024-01-13"])
        .assert()
        .success()
        .stdout("3\n");
}

#[test]
fn nights_same_day_is_zero() {
    stay()
        .args(["nights", "--start", "2024-01-10", "--end", "2024-01-10"])
        .assert()
        .success()
        .stdout("0\n");
}

#[test]
fn nights_with_rate_prints_quote() {
    let out = stay()
        .args(["nights", "--start", "2024-01-10", "--end", "2024-01-13", "--rate", "4500"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json = stdout_json(&out);
    assert_eq!(json["nights"], 3);
    assert_eq!(json["total"], 13500);
}

// ─────────────────────────────────────────────────────────────────────────────
// book
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn book_free_dates_writes_pending_reservation() {
    let output_path = std::env::temp_dir().join("stay-test-book-output.json");
    let _ = std::fs::remove_file(&output_path);

    let out = stay()
        .args([
            "book", "-r", reservations_path(),
            "-o", output_path.to_str().unwrap(),
            "--property", "apt-7", "--user", "u-200",
            "--start", "2024-03-01", "--end", "2024-03-04",
            "--phone", "+254 712 345 678",
            "--now", "2023-06-01T00:00:00Z",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let booked = stdout_json(&out);
    assert_eq!(booked["status"], "pending");
    assert_eq!(booked["id"], 4);

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output_path).unwrap()).unwrap();
    assert_eq!(written.as_array().unwrap().len(), 4);

    let _ = std::fs::remove_file(&output_path);
}

#[test]
fn book_taken_dates_fails() {
    stay()
        .args([
            "book", "-r", reservations_path(),
            "--property", "apt-7", "--user", "u-200",
            "--start", "2024-01-14", "--end", "2024-01-17",
            "--phone", "0712345678",
            "--now", "2023-06-01T00:00:00Z",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not available until 2024-01-20"));
}

#[test]
fn book_rejects_bad_phone() {
    stay()
        .args([
            "book", "-r", reservations_path(),
            "--property", "apt-7", "--user", "u-200",
            "--start", "2024-03-01", "--end", "2024-03-04",
            "--phone", "12-34",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid phone number"));
}

#[test]
fn book_with_mixed_ids_still_sees_every_stay() {
    stay()
        .args([
            "book", "-r", mixed_ids_path(),
            "--property", "apt-7", "--user", "u-200",
            "--start", "2024-01-11", "--end", "2024-01-13",
            "--phone", "0712345678",
            "--now", "2023-06-01T00:00:00Z",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not available until 2024-01-15"));
}

#[test]
fn book_with_mixed_ids_writes_every_row() {
    let output_path = std::env::temp_dir().join("stay-test-book-mixed-ids.json");
    let _ = std::fs::remove_file(&output_path);

    let out = stay()
        .args([
            "book", "-r", mixed_ids_path(),
            "-o", output_path.to_str().unwrap(),
            "--property", "apt-7", "--user", "u-200",
            "--start", "2024-04-01", "--end", "2024-04-03",
            "--phone", "0712345678",
            "--now", "2023-06-01T00:00:00Z",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(stdout_json(&out)["id"], 3);

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output_path).unwrap()).unwrap();
    let ids: Vec<u64> = written
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);

    let _ = std::fs::remove_file(&output_path);
}

#[test]
fn book_rejects_duplicate_ids() {
    stay()
        .args([
            "book", "-r", duplicate_ids_path(),
            "--property", "apt-7", "--user", "u-200",
            "--start", "2024-04-01", "--end", "2024-04-03",
            "--phone", "0712345678",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("appears more than once"));
}
