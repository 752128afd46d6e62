mod common;

use std::fs;

use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use tempfile::tempdir;

use common::{fixture, msgcheck_cmd, register_fixture};

fn seeded_store(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let store = dir.path().join("messages.json");
    register_fixture(&store, "pe_output.msg.json");
    store
}

#[test]
fn matching_call_sites_pass() {
    let dir = tempdir().expect("tempdir");
    let store = seeded_store(&dir);
    msgcheck_cmd()
        .args(["check", "--store"])
        .arg(&store)
        .arg(fixture("pe_status.unit.json"))
        .assert()
        .success()
        .stdout(contains("check passed for").and(contains("3 call site(s) in 1 function(s)")));
}

#[test]
fn mismatched_call_sites_fail_with_diagnostics() {
    let dir = tempdir().expect("tempdir");
    let store = seeded_store(&dir);
    msgcheck_cmd()
        .args(["check", "--error-format", "short", "--store"])
        .arg(&store)
        .arg(fixture("bad_calls.unit.json"))
        .assert()
        .failure()
        .stdout(contains("check failed for"))
        .stderr(
            contains("tests/fixtures/bad_calls.c:4:5: error[MSG0001]: Unknown format message: nodes")
                .and(contains(
                    "tests/fixtures/bad_calls.c:5:5: error[MSG0003]: Expected 3 arguments to message ticket, but got 2",
                ))
                .and(contains(
                    "tests/fixtures/bad_calls.c:6:5: error[MSG0004]: Expected 'const char *', but got 'int' in argument 1",
                ))
                .and(contains(
                    "tests/fixtures/bad_calls.c:7:5: error[MSG0002]: Message not registered: bundle",
                ))
                .and(contains(
                    "tests/fixtures/bad_calls.c:8:5: note[MSG0005]: Cannot figure out message name",
                ))
                .and(contains("diagnostics reported; see above")),
        );
}

#[test]
fn human_format_renders_source_snippets() {
    let dir = tempdir().expect("tempdir");
    let store = seeded_store(&dir);
    msgcheck_cmd()
        .args(["check", "--error-format", "human", "--store"])
        .arg(&store)
        .arg(fixture("bad_calls.unit.json"))
        .assert()
        .failure()
        .stderr(
            contains("error[MSG0001]: Unknown format message: nodes\n  --> tests/fixtures/bad_calls.c:4:5")
                .and(contains("4 |     out->message(out, \"nodes\", node);")),
        );
}

#[test]
fn json_diagnostics_are_one_object_per_line() {
    let dir = tempdir().expect("tempdir");
    let store = seeded_store(&dir);
    let output = msgcheck_cmd()
        .args(["check", "--error-format", "json", "--store"])
        .arg(&store)
        .arg(fixture("bad_calls.unit.json"))
        .output()
        .expect("run check");
    assert!(!output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    let records: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("json diagnostic"))
        .collect();
    assert_eq!(records.len(), 5);
    assert_eq!(records[0]["severity"], "error");
    assert_eq!(records[0]["code"]["code"], "MSG0001");
    assert_eq!(records[0]["location"]["line"], 4);
    assert_eq!(records[4]["severity"], "note");
}

#[test]
fn functions_outside_the_analysis_stage_are_ignored() {
    let dir = tempdir().expect("tempdir");
    let store = seeded_store(&dir);
    msgcheck_cmd()
        .args(["check", "--store"])
        .arg(&store)
        .arg(fixture("bad_calls.ssa.unit.json"))
        .assert()
        .success()
        .stdout(contains("0 call site(s) in 0 function(s)"));
}

#[test]
fn config_file_can_move_the_analysis_stage() {
    let dir = tempdir().expect("tempdir");
    let store = seeded_store(&dir);
    let config = dir.path().join("msgcheck.yaml");
    fs::write(&config, "msgcheck:\n  analysis-stage: ssa\n").expect("write config");
    msgcheck_cmd()
        .args(["check", "--error-format", "short", "--store"])
        .arg(&store)
        .arg("--config")
        .arg(&config)
        .arg(fixture("bad_calls.ssa.unit.json"))
        .assert()
        .failure()
        .stderr(contains("error[MSG0001]: Unknown format message: nodes"));
}

#[test]
fn empty_store_warns_but_unknown_messages_still_fail() {
    let dir = tempdir().expect("tempdir");
    msgcheck_cmd()
        .args(["check", "--error-format", "short", "--store"])
        .arg(dir.path().join("empty.store"))
        .arg(fixture("pe_status.unit.json"))
        .assert()
        .failure()
        .stderr(
            contains("<unknown>: warning[MSG0009]: no message signatures registered")
                .and(contains("Unknown format message: node")),
        );
}
