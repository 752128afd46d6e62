//! Build-time metadata helpers used by the CLI.

/// Metadata recorded by `build.rs`; each field is `"unknown"` when the build
/// could not determine it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: &'static str,
    pub commit: &'static str,
    pub commit_full: &'static str,
    pub commit_unix: &'static str,
    pub dirty: &'static str,
    pub built_unix: &'static str,
    pub profile: &'static str,
    pub target: &'static str,
}

/// Metadata for the running binary.
#[must_use]
pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        commit: option_env!("MSGCHECK_GIT_HASH").unwrap_or("unknown"),
        commit_full: option_env!("MSGCHECK_GIT_HASH_FULL").unwrap_or("unknown"),
        commit_unix: option_env!("MSGCHECK_GIT_COMMIT_UNIX").unwrap_or("unknown"),
        dirty: option_env!("MSGCHECK_GIT_DIRTY").unwrap_or("unknown"),
        built_unix: option_env!("MSGCHECK_BUILD_UNIX").unwrap_or("unknown"),
        profile: option_env!("MSGCHECK_BUILD_PROFILE").unwrap_or("unknown"),
        target: option_env!("MSGCHECK_BUILD_TARGET").unwrap_or("unknown"),
    }
}

impl BuildInfo {
    /// Render a scripting-friendly version string, one `key: value` per line
    /// after the name line.
    #[must_use]
    pub fn render(&self) -> String {
        let commit_line = if self.commit_full != "unknown" && self.commit_full != self.commit {
            format!("{} ({})", self.commit, self.commit_full)
        } else {
            self.commit.to_string()
        };
        format!(
            "msgcheck {}\ncommit: {commit_line}\ncommit_unix: {}\ndirty: {}\nbuilt: {}\nprofile: {}\ntarget: {}",
            self.version, self.commit_unix, self.dirty, self.built_unix, self.profile, self.target
        )
    }
}

#[must_use]
pub fn formatted() -> String {
    build_info().render()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatted_includes_required_fields() {
        let version = formatted();
        assert!(version.starts_with(&format!("msgcheck {}", env!("CARGO_PKG_VERSION"))));
        for key in ["commit:", "commit_unix:", "dirty:", "built:", "profile:", "target:"] {
            assert!(version.contains(key), "missing {key} in {version}");
        }
    }

    #[test]
    fn commit_line_shows_full_hash_only_when_distinct() {
        let info = BuildInfo {
            commit: "abc1234",
            commit_full: "abc1234def",
            ..build_info()
        };
        assert!(info.render().contains("commit: abc1234 (abc1234def)\n"));
        let same = BuildInfo {
            commit: "unknown",
            commit_full: "unknown",
            ..build_info()
        };
        assert!(same.render().contains("commit: unknown\n"));
    }
}
