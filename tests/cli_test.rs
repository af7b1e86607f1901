use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn test_cli_lists_subcommands() {
    let mut cmd = Command::new(cargo_bin!("fantapay"));
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("report"));
}

#[test]
fn test_report_requires_competition() {
    let mut cmd = Command::new(cargo_bin!("fantapay"));
    cmd.arg("report");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--competition"));
}

#[test]
fn test_report_unknown_competition_fails() {
    let mut cmd = Command::new(cargo_bin!("fantapay"));
    cmd.arg("report").arg("--competition").arg("missing");
    cmd.env_remove("FANTAPAY_DB_PATH");

    cmd.assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Competition not found"));
}
