//! CLI integration tests
//!
//! Tests the eth-log-scheduler binary end-to-end for commands that need no network

use assert_cmd::Command;
use predicates::prelude::*;

fn scheduler_cli() -> Command {
    // Keep any real user config out of the way
    let home = std::env::temp_dir().join("eth-log-scheduler-cli-test-home");
    let mut cmd = Command::cargo_bin("eth-log-scheduler").unwrap();
    cmd.env("HOME", &home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("CONTRACT_ADDRESS")
        .env_remove("EVENT_TOPIC")
        .env_remove("RUST_LOG");
    cmd
}

// ==================== Basic CLI tests ====================

#[test]
fn test_version() {
    scheduler_cli()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("eth-log-scheduler"));
}

#[test]
fn test_help() {
    scheduler_cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Fetch EVM logs"))
        .stdout(predicate::str::contains("--batch-size"));
}

#[test]
fn test_scan_help() {
    scheduler_cli()
        .args(["scan", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--queue-capacity"))
        .stdout(predicate::str::contains("--exclude-rpc"));
}

// ==================== Config and endpoints ====================

#[test]
fn test_config_path() {
    scheduler_cli()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("eth-log-scheduler"))
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_endpoints_list_defaults() {
    scheduler_cli()
        .args(["endpoints", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("publicnode"))
        .stdout(predicate::str::contains("drpc"));
}

// ==================== Argument validation ====================

#[test]
fn test_invalid_contract() {
    scheduler_cli()
        .args(["--contract", "not-an-address", "--rpc", "http://127.0.0.1:1", "-q"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid contract address"));
}

#[test]
fn test_invalid_topic() {
    scheduler_cli()
        .args(["--topic", "0x1234", "--rpc", "http://127.0.0.1:1", "-q"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid event topic"));
}

#[test]
fn test_zero_batch_size() {
    scheduler_cli()
        .args(["scan", "--batch-size", "0", "--rpc", "http://127.0.0.1:1", "-q"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("batch size must be at least one block"));
}

#[test]
fn test_start_after_end() {
    scheduler_cli()
        .args([
            "--rpc",
            "http://127.0.0.1:1",
            "-f",
            "200",
            "-t",
            "100",
            "-q",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("after end block"));
}

#[test]
fn test_invalid_to_block() {
    scheduler_cli()
        .args(["--rpc", "http://127.0.0.1:1", "-t", "soon", "-q"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid block number"));
}

#[test]
fn test_duplicate_endpoint_name() {
    scheduler_cli()
        .args([
            "--rpc",
            "a=http://127.0.0.1:1",
            "--add-rpc",
            "a=http://127.0.0.1:2",
            "-q",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"a\" is used more than once"));
}

#[test]
fn test_config_file_disables_defaults() {
    let dir = std::env::temp_dir().join(format!("eth-log-scheduler-cli-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.toml");
    std::fs::write(
        &path,
        "[disabled_endpoints]\nnames = [\"publicnode\", \"ankr\", \"drpc\"]\n",
    )
    .unwrap();

    scheduler_cli()
        .arg("--config")
        .arg(&path)
        .arg("-q")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no enabled RPC endpoints"));

    std::fs::remove_dir_all(&dir).ok();
}
