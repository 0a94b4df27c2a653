use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn feedbot_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("feedbot").unwrap();
    cmd.current_dir(dir.path())
        .env("SOURCES_FILE", dir.path().join("sources.json"))
        .env("LOG_LEVEL", "error")
        .env_remove("BOT_TOKEN")
        .env_remove("OWNER_ID");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    feedbot_cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("remove"))
        .stdout(predicate::str::contains("list"));
}

#[test]
fn test_run_help_shows_dry_run_flag() {
    let dir = TempDir::new().unwrap();
    feedbot_cmd(&dir)
        .arg("run")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn test_list_without_store_file() {
    let dir = TempDir::new().unwrap();
    feedbot_cmd(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No sources added."));
}

#[test]
fn test_add_list_remove() {
    let dir = TempDir::new().unwrap();

    feedbot_cmd(&dir)
        .args(["add", "nyaa", "https://nyaa.si/?page=rss"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added source nyaa"));

    feedbot_cmd(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("nyaa"))
        .stdout(predicate::str::contains("https://nyaa.si/?page=rss"));

    let saved = std::fs::read_to_string(dir.path().join("sources.json")).unwrap();
    assert!(saved.contains("\"nyaa\": \"https://nyaa.si/?page=rss\""));

    feedbot_cmd(&dir)
        .args(["remove", "nyaa"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed source nyaa"));

    feedbot_cmd(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No sources added."));
}

#[test]
fn test_duplicate_add_fails() {
    let dir = TempDir::new().unwrap();

    feedbot_cmd(&dir)
        .args(["add", "x", "https://one.example/rss"])
        .assert()
        .success();

    feedbot_cmd(&dir)
        .args(["add", "x", "https://two.example/rss"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    feedbot_cmd(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("https://one.example/rss"))
        .stdout(predicate::str::contains("https://two.example/rss").not());
}

#[test]
fn test_remove_unknown_fails() {
    let dir = TempDir::new().unwrap();
    feedbot_cmd(&dir)
        .args(["remove", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Source not found: ghost"));
}

#[test]
fn test_corrupt_store_is_fatal() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("sources.json"), "{ broken").unwrap();

    feedbot_cmd(&dir)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Watch list store error"));

    feedbot_cmd(&dir)
        .args(["run", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Watch list store error"));
}

#[test]
fn test_run_requires_bot_credentials() {
    let dir = TempDir::new().unwrap();
    feedbot_cmd(&dir)
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing environment variable: BOT_TOKEN"));
}

#[test]
fn test_sqlite_store_selected_by_extension() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("sources.db");

    feedbot_cmd(&dir)
        .env("SOURCES_FILE", &db)
        .args(["add", "blog", "https://blog.example/feed"])
        .assert()
        .success();

    feedbot_cmd(&dir)
        .env("SOURCES_FILE", &db)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("https://blog.example/feed"));

    assert!(db.exists());
    assert!(!dir.path().join("sources.json").exists());
}

#[test]
fn test_poll_with_no_sources() {
    let dir = TempDir::new().unwrap();
    feedbot_cmd(&dir)
        .args(["poll", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No sources added."));
}
