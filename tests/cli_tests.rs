//! CLI integration tests against the built binary.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use liqwatch::adapter::outbound::json::JsonFileStatsRepository;
use liqwatch::domain::{LiquidationEvent, OrderId, Side, StatisticsStore, Symbol};
use liqwatch::port::StatsRepository;
use predicates::prelude::*;
use rust_decimal_macros::dec;
use serde_json::Value;
use tempfile::TempDir;

fn liqwatch() -> Command {
    let mut cmd = cargo_bin_cmd!("liqwatch");
    cmd.env_remove("TELEGRAM_BOT_TOKEN")
        .env_remove("TELEGRAM_CHAT_ID")
        .env_remove("CONFIG");
    cmd
}

fn write_config(dir: &TempDir, body: &str) -> PathBuf {
    let state = dir.path().join("state.json");
    let path = dir.path().join("config.toml");
    let contents = format!(
        "[statistics]\npath = {:?}\n\n{body}",
        state.display().to_string()
    );
    fs::write(&path, contents).expect("write temp config");
    path
}

fn seed_state(path: &Path) {
    let mut store = StatisticsStore::new();
    for (id, symbol, quantity) in [("a", "XBTUSD", 1_000), ("b", "XBTUSD", 3_000), ("c", "ETHUSD", 7)] {
        let event = LiquidationEvent::try_new(
            OrderId::new(id),
            Symbol::new(symbol),
            Side::Sell,
            dec!(10.5),
            quantity,
        )
        .unwrap();
        store.entry(event.symbol()).apply(&event);
    }
    JsonFileStatsRepository::new(path).save(&store).unwrap();
}

#[test]
fn help_lists_commands() {
    liqwatch()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("stats"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn version_prints_name() {
    liqwatch()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("liqwatch"));
}

#[test]
fn check_config_accepts_valid_file() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "[dedup]\nwindow_secs = 10\n");

    liqwatch()
        .args(["check", "config", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file is valid"))
        .stdout(predicate::str::contains("wss://www.bitmex.com/realtime"));
}

#[test]
fn check_config_rejects_invalid_value() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "[dedup]\nwindow_secs = 0\n");

    liqwatch()
        .args(["check", "config", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("dedup.window_secs"));
}

#[test]
fn check_config_warns_about_missing_telegram_token() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "[telegram]\nenabled = true\nchat_id = 1\n");

    liqwatch()
        .args(["check", "config", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("TELEGRAM_BOT_TOKEN"));
}

#[test]
fn run_fails_fast_without_telegram_token() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "[telegram]\nenabled = true\nchat_id = 1\n");

    liqwatch()
        .args(["--quiet", "run", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("TELEGRAM_BOT_TOKEN"));
}

#[test]
fn stats_without_file_reports_nothing_recorded() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "");

    liqwatch()
        .args(["stats", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("No statistics recorded yet"));
}

#[test]
fn stats_renders_table() {
    let dir = TempDir::new().unwrap();
    let state = dir.path().join("state.json");
    seed_state(&state);

    liqwatch()
        .args(["stats", "--file"])
        .arg(&state)
        .assert()
        .success()
        .stdout(predicate::str::contains("XBTUSD"))
        .stdout(predicate::str::contains("4,000"))
        .stdout(predicate::str::contains("ETHUSD"));
}

#[test]
fn stats_json_filters_by_symbol() {
    let dir = TempDir::new().unwrap();
    let state = dir.path().join("state.json");
    seed_state(&state);

    let output = liqwatch()
        .args(["--json", "stats", "--symbol", "XBTUSD", "--file"])
        .arg(&state)
        .output()
        .unwrap();
    assert!(output.status.success());

    let doc: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc["command"], "stats");
    assert_eq!(doc["symbols"]["XBTUSD"]["count"], 2);
    assert_eq!(doc["symbols"]["XBTUSD"]["total_quantity"], 4_000);
    assert!(doc["symbols"].get("ETHUSD").is_none());
}

#[test]
fn stats_rejects_corrupt_file() {
    let dir = TempDir::new().unwrap();
    let state = dir.path().join("state.json");
    fs::write(&state, "{ not json").unwrap();

    liqwatch()
        .args(["stats", "--file"])
        .arg(&state)
        .assert()
        .failure()
        .stderr(predicate::str::contains("corrupt statistics file"));
}
