//! Binary-level CLI tests

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_subcommands() {
    Command::cargo_bin("vitrine")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("migrate"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn completions_emit_script() {
    Command::cargo_bin("vitrine")
        .unwrap()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("vitrine"));
}

#[test]
fn unknown_subcommand_fails() {
    Command::cargo_bin("vitrine")
        .unwrap()
        .arg("definitely-not-a-command")
        .assert()
        .failure();
}
