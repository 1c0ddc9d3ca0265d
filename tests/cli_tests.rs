//! Exit codes and output of the `recover` binary

#![cfg(all(feature = "cli", feature = "http"))]

mod common;

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

const ENV_VARS: [&str; 9] = [
    "RECOVERY_TARGET_ADDRESS",
    "RECOVERY_DESTINATION",
    "RECOVERY_RPC_URL",
    "RECOVERY_PASSWORD",
    "RECOVERY_MIN_BALANCE_WEI",
    "RECOVERY_GAS_LIMIT",
    "RECOVERY_CONFIRMATION_TIMEOUT",
    "RECOVERY_SEARCH_MODE",
    "RUST_LOG",
];

fn recover() -> Command {
    let mut cmd = Command::cargo_bin("recover").unwrap();
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd
}

fn backup_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_exact_match_exits_zero() {
    let file = backup_file(&common::backup_text(&common::key_from_u8(1), "hunter2", true));

    recover()
        .arg(file.path())
        .args(["--target-address", common::ADDRESS_OF_ONE, "--format", "json"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("\"exact_match\""))
        .stdout(predicate::str::contains(common::ADDRESS_OF_ONE));
}

#[test]
fn test_target_address_from_environment() {
    let file = backup_file(&common::backup_text(&common::key_from_u8(1), "hunter2", false));

    recover()
        .arg(file.path())
        .env("RECOVERY_TARGET_ADDRESS", common::ADDRESS_OF_ONE)
        .env("RECOVERY_PASSWORD", "hunter2")
        .args(["--mode", "sequential"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Found matching key"));
}

#[test]
fn test_backup_from_stdin() {
    recover()
        .arg("-")
        .args(["--target-address", common::ADDRESS_OF_ONE, "--password", "hunter2"])
        .write_stdin(common::backup_text(&common::key_from_u8(1), "hunter2", false))
        .assert()
        .code(0);
}

#[test]
fn test_wrong_password_reports_candidates() {
    let file = backup_file(&common::backup_text(&common::key_from_u8(1), "hunter2", false));

    recover()
        .arg(file.path())
        .args([
            "--target-address",
            common::ADDRESS_OF_ONE,
            "--password",
            "wrong",
            "--format",
            "json",
        ])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("\"candidates\""));
}

#[test]
fn test_missing_parameters_exit_three() {
    let file = backup_file("salt: aa\niv: bb\n");

    recover()
        .arg(file.path())
        .args(["--target-address", common::ADDRESS_OF_ONE, "--password", "pw"])
        .assert()
        .code(3);
}

#[test]
fn test_missing_input_exits_one() {
    let dir = tempfile::tempdir().unwrap();

    recover()
        .arg(dir.path().join("does-not-exist.txt"))
        .args(["--target-address", common::ADDRESS_OF_ONE])
        .assert()
        .code(1);
}

#[test]
fn test_invalid_mode_exits_one() {
    let file = backup_file("salt: aa\n");

    recover()
        .arg(file.path())
        .args(["--target-address", common::ADDRESS_OF_ONE, "--mode", "sideways"])
        .assert()
        .code(1);
}

#[test]
fn test_direct_key_matching_target() {
    let file = backup_file("anything");
    let key = hex::encode(common::key_from_u8(1));

    recover()
        .arg(file.path())
        .arg(&key)
        .args(["--target-address", common::ADDRESS_OF_ONE, "--format", "json"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("\"matches_target\": true"))
        .stdout(predicate::str::contains(&key).not());
}

#[test]
fn test_direct_key_not_matching_target() {
    let file = backup_file("anything");

    recover()
        .arg(file.path())
        .arg(hex::encode(common::key_from_u8(2)))
        .args(["--target-address", common::ADDRESS_OF_ONE])
        .assert()
        .code(4)
        .stdout(predicate::str::contains("doesn't match target address"));
}

#[test]
fn test_invalid_direct_key_exits_one() {
    let file = backup_file("anything");

    recover()
        .arg(file.path())
        .arg("0x1234")
        .args(["--target-address", common::ADDRESS_OF_ONE])
        .assert()
        .code(1);
}
