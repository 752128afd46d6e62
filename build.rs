use std::env;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads");
    println!("cargo:rerun-if-changed=.git/index");
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=GITHUB_SHA");
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");
    println!("cargo:rerun-if-env-changed=MSGCHECK_BUILD_UNIX_OVERRIDE");

    let full = git(&["rev-parse", "HEAD"]).or_else(|| non_empty(env::var("GITHUB_SHA").ok()));
    if let Some(hash) = full.as_deref() {
        println!("cargo:rustc-env=MSGCHECK_GIT_HASH_FULL={hash}");
    }
    let short = git(&["rev-parse", "--short", "HEAD"])
        .or_else(|| full.as_deref().and_then(shorten_hash));
    if let Some(hash) = short {
        println!("cargo:rustc-env=MSGCHECK_GIT_HASH={hash}");
    }
    if let Some(timestamp) = git(&["show", "-s", "--format=%ct", "HEAD"])
        .filter(|raw| raw.parse::<u64>().is_ok())
    {
        println!("cargo:rustc-env=MSGCHECK_GIT_COMMIT_UNIX={timestamp}");
    }
    if let Some(dirty) = git_is_dirty() {
        println!("cargo:rustc-env=MSGCHECK_GIT_DIRTY={dirty}");
    }

    let profile = env::var("PROFILE").unwrap_or_else(|_| "unknown".into());
    println!("cargo:rustc-env=MSGCHECK_BUILD_PROFILE={profile}");
    if let Ok(target) = env::var("TARGET") {
        println!("cargo:rustc-env=MSGCHECK_BUILD_TARGET={target}");
    }
    println!(
        "cargo:rustc-env=MSGCHECK_BUILD_UNIX={}",
        stable_build_unix_timestamp()
    );
}

fn stable_build_unix_timestamp() -> String {
    for var in ["MSGCHECK_BUILD_UNIX_OVERRIDE", "SOURCE_DATE_EPOCH"] {
        if let Ok(value) = env::var(var)
            && value.parse::<u64>().is_ok()
        {
            return value;
        }
    }
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or_else(|_| "0".into(), |duration| duration.as_secs().to_string())
}

/// Trimmed stdout of a successful git invocation.
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    non_empty(String::from_utf8(output.stdout).ok())
}

fn git_is_dirty() -> Option<bool> {
    let output = Command::new("git")
        .args(["status", "--porcelain"])
        .output()
        .ok()?;
    output.status.success().then(|| !output.stdout.is_empty())
}

fn shorten_hash(hash: &str) -> Option<String> {
    (hash.len() >= 7).then(|| hash.chars().take(8).collect())
}

fn non_empty(value: Option<String>) -> Option<String> {
    let trimmed = value?.trim().to_string();
    (!trimmed.is_empty()).then_some(trimmed)
}
