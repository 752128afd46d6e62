mod common;

use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

use common::msgcheck_cmd;

#[test]
fn smoke_help_and_version_commands() {
    msgcheck_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("USAGE:").and(contains("signatures")));

    msgcheck_cmd()
        .args(["help", "check"])
        .assert()
        .success()
        .stdout(contains("msgcheck check --store <path> [--config <file>] <unit>..."));

    msgcheck_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(contains("msgcheck ").and(contains("commit:")));
}

#[test]
fn missing_command_prints_usage_and_fails() {
    msgcheck_cmd()
        .assert()
        .failure()
        .stderr(contains("missing command").and(contains("USAGE:")));
}

#[test]
fn unknown_help_topic_fails() {
    msgcheck_cmd()
        .args(["help", "build"])
        .assert()
        .failure()
        .stderr(contains("unknown help topic 'build'"));
}

#[test]
fn missing_store_is_a_configuration_error() {
    msgcheck_cmd()
        .args(["signatures"])
        .assert()
        .failure()
        .stderr(contains("configuration error: --store=<path> argument is missing"));
}

#[test]
fn store_can_come_from_the_environment() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = dir.path().join("messages.json");
    msgcheck_cmd()
        .env("MSGCHECK_STORE", &store)
        .arg("signatures")
        .assert()
        .success()
        .stdout(contains("0 message(s) in"));
}

#[test]
fn json_logs_go_to_stderr() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = dir.path().join("messages.json");
    msgcheck_cmd()
        .args(["--log-format", "json", "--log-level", "info", "signatures", "--store"])
        .arg(&store)
        .assert()
        .success()
        .stderr(contains("\"stage\":\"cli.run.start\""))
        .stdout(contains("\"stage\"").not());
}
