use std::path::{Path, PathBuf};

use assert_cmd::Command;

/// The binary with every `MSGCHECK_*` override cleared, running from the
/// package root so fixture paths inside unit dumps resolve.
pub fn msgcheck_cmd() -> Command {
    let mut cmd = Command::cargo_bin("msgcheck").expect("msgcheck binary");
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"))
        .env_remove("MSGCHECK_STORE")
        .env_remove("MSGCHECK_CONFIG")
        .env_remove("MSGCHECK_ERROR_FORMAT")
        .env_remove("MSGCHECK_LOG_FORMAT")
        .env_remove("MSGCHECK_LOG_LEVEL")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

// Only some test crates seed a store before running.
#[allow(dead_code)]
pub fn register_fixture(store: &Path, manifest: &str) {
    msgcheck_cmd()
        .arg("register")
        .arg("--store")
        .arg(store)
        .arg(fixture(manifest))
        .assert()
        .success();
}
