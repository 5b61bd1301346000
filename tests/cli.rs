use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn daynotes(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("daynotes").unwrap();
    cmd.env("DAYNOTES_HOME", home.path())
        .env("NO_COLOR", "1")
        .env_remove("DAYNOTES_LOG");
    cmd
}

/// Runs `new` and pulls the id out of "Created note <id> on <date>".
fn new_note(home: &TempDir, date: &str) -> String {
    let output = daynotes(home).args(["new", date]).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    stdout
        .split_whitespace()
        .nth(2)
        .expect("id in output")
        .to_string()
}

#[test]
fn test_default_shows_today() {
    let home = TempDir::new().unwrap();
    daynotes(&home)
        .assert()
        .success()
        .stdout(predicate::str::contains("Today"))
        .stdout(predicate::str::contains("Untitled Note"));

    assert!(home.path().join("dailyNotes").exists());
    assert!(home.path().join("selectedNoteId").exists());
}

#[test]
fn test_write_then_show() {
    let home = TempDir::new().unwrap();
    daynotes(&home)
        .args(["write", "Buy milk\nand eggs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved"));

    daynotes(&home)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("Buy milk"))
        .stdout(predicate::str::contains("and eggs"));
}

#[test]
fn test_write_from_stdin() {
    let home = TempDir::new().unwrap();
    daynotes(&home)
        .arg("write")
        .write_stdin("piped in")
        .assert()
        .success();

    daynotes(&home)
        .arg("today")
        .assert()
        .success()
        .stdout(predicate::str::contains("piped in"));
}

#[test]
fn test_title() {
    let home = TempDir::new().unwrap();
    daynotes(&home)
        .args(["title", "Standup", "notes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Standup notes"));

    daynotes(&home)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("Standup notes"));
}

#[test]
fn test_first_line_titles() {
    let home = TempDir::new().unwrap();
    daynotes(&home)
        .args(["config", "title-policy", "first-line"])
        .assert()
        .success();

    daynotes(&home)
        .args(["write", "# Groceries\nmilk"])
        .assert()
        .success();

    daynotes(&home)
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Groceries"));

    daynotes(&home)
        .args(["title", "Manual"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_new_on_past_day_and_days() {
    let home = TempDir::new().unwrap();
    let id = new_note(&home, "2024-03-01");

    daynotes(&home)
        .arg("days")
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-03-01"))
        .stdout(predicate::str::contains("1 note"));

    daynotes(&home)
        .args(["list", "2024-03-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains(id.as_str()));
}

#[test]
fn test_select_and_delete() {
    let home = TempDir::new().unwrap();
    let first = new_note(&home, "2024-03-01");
    let second = new_note(&home, "2024-03-01");

    daynotes(&home)
        .args(["select", "2024-03-01", &first])
        .assert()
        .success()
        .stdout(predicate::str::contains(first.as_str()));

    daynotes(&home)
        .args(["delete", "2024-03-01", &first])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted"));

    // Selection moved to the remaining note on that day.
    daynotes(&home)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains(second.as_str()));

    daynotes(&home)
        .args(["delete", "2024-03-01", &second])
        .assert()
        .success();

    daynotes(&home)
        .arg("days")
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-03-01").not());
}

#[test]
fn test_delete_missing_note_warns() {
    let home = TempDir::new().unwrap();
    daynotes(&home)
        .args(["delete", "2024-03-01", "nope"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No note nope"));
}

#[test]
fn test_select_unknown_note_fails() {
    let home = TempDir::new().unwrap();
    daynotes(&home)
        .args(["select", "2024-03-01", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No note nope"));
}

#[test]
fn test_invalid_date_fails() {
    let home = TempDir::new().unwrap();
    daynotes(&home)
        .args(["new", "06/06/2025"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date"));
}

#[test]
fn test_theme() {
    let home = TempDir::new().unwrap();
    daynotes(&home)
        .arg("theme")
        .assert()
        .success()
        .stdout(predicate::str::contains("lofi"))
        .stdout(predicate::str::contains("dracula"));

    daynotes(&home)
        .args(["theme", "dracula"])
        .assert()
        .success();
    assert_eq!(
        std::fs::read_to_string(home.path().join("selectedTheme")).unwrap(),
        "dracula"
    );

    daynotes(&home)
        .args(["theme", "neon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not available"));
}

#[test]
fn test_format_file() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("snippet.json");
    std::fs::write(&file, r#"{"a":[1,2]}"#).unwrap();

    daynotes(&home)
        .args(["format", "--lang", "json"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"a\": [\n    1,\n    2\n  ]"));
}

#[test]
fn test_format_detects_language_from_stdin() {
    let home = TempDir::new().unwrap();
    daynotes(&home)
        .arg("format")
        .write_stdin("a{color:red;margin:0}")
        .assert()
        .success()
        .stdout(predicate::str::contains("a {\n  color:red;"));
}

#[test]
fn test_format_unknown_language_fails() {
    let home = TempDir::new().unwrap();
    daynotes(&home)
        .args(["format", "--lang", "cobol"])
        .write_stdin("x")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown language"));
}

#[test]
fn test_config() {
    let home = TempDir::new().unwrap();
    daynotes(&home)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("autosave-delay-ms = 1000"));

    daynotes(&home)
        .args(["config", "autosave-delay-ms", "250"])
        .assert()
        .success();

    daynotes(&home)
        .args(["config", "autosave-delay-ms"])
        .assert()
        .success()
        .stdout(predicate::str::contains("autosave-delay-ms = 250"));

    daynotes(&home)
        .args(["config", "colour", "blue"])
        .assert()
        .failure();
}

#[test]
fn test_clear() {
    let home = TempDir::new().unwrap();
    daynotes(&home).args(["write", "gone soon"]).assert().success();
    assert!(home.path().join("dailyNotes").exists());

    daynotes(&home).arg("clear").assert().success();
    assert!(!home.path().join("dailyNotes").exists());
    assert!(!home.path().join("selectedNoteId").exists());
}

#[test]
fn test_malformed_config_falls_back_to_defaults() {
    let home = TempDir::new().unwrap();
    std::fs::write(home.path().join("config.json"), "{ not json").unwrap();

    daynotes(&home)
        .arg("today")
        .assert()
        .success()
        .stdout(predicate::str::contains("Today"))
        .stderr(predicate::str::contains("Ignoring unreadable config"));

    daynotes(&home)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("autosave-delay-ms = 1000"));

    daynotes(&home).arg("clear").assert().success();

    // Setting a value replaces the broken file.
    daynotes(&home)
        .args(["config", "autosave-delay-ms", "250"])
        .assert()
        .success();
    let raw = std::fs::read_to_string(home.path().join("config.json")).unwrap();
    assert!(raw.contains("250"));

    daynotes(&home)
        .args(["config", "autosave-delay-ms"])
        .assert()
        .success()
        .stdout(predicate::str::contains("autosave-delay-ms = 250"))
        .stderr(predicate::str::contains("Ignoring unreadable config").not());
}

#[test]
fn test_unstorable_key_prefix_is_rejected() {
    let home = TempDir::new().unwrap();
    daynotes(&home)
        .args(["config", "key-prefix", "work/"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("key-prefix"));

    daynotes(&home)
        .args(["write", "important"])
        .assert()
        .success();
}
