use std::backtrace::Backtrace;
use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::cli::CliError;

/// Unified error type for the checker and its command-line front-end.
#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    Cli(CliError),
    Json(serde_json::Error),
    Yaml(serde_yaml::Error),
    /// Fatal configuration problem detected before any analysis runs.
    Config {
        message: String,
    },
    /// The signature store could not be read or written.
    Store {
        path: PathBuf,
        message: String,
    },
    Internal {
        message: String,
        backtrace: Option<Backtrace>,
    },
}

/// Convenience result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Construct a new configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Construct a new store error for `path`.
    pub fn store(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Store {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Construct a new internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            backtrace: capture_backtrace(),
        }
    }

    /// Return the captured backtrace, if any.
    pub fn backtrace(&self) -> Option<&Backtrace> {
        match self {
            Error::Internal { backtrace, .. } => backtrace.as_ref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config { .. })
    }
}

fn capture_backtrace() -> Option<Backtrace> {
    if cfg!(debug_assertions) {
        Some(Backtrace::force_capture())
    } else {
        None
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "I/O error: {err}"),
            Error::Cli(err) => write!(f, "{err}"),
            Error::Json(err) => write!(f, "JSON error: {err}"),
            Error::Yaml(err) => write!(f, "YAML error: {err}"),
            Error::Config { message } => write!(f, "configuration error: {message}"),
            Error::Store { path, message } => {
                write!(f, "signature store `{}`: {message}", path.display())
            }
            Error::Internal { message, .. } => write!(f, "internal error: {message}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Cli(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Yaml(err) => Some(err),
            Error::Config { .. } | Error::Store { .. } | Error::Internal { .. } => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Error::Io(error)
    }
}

impl From<CliError> for Error {
    fn from(error: CliError) -> Self {
        Error::Cli(error)
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Json(error)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(error: serde_yaml::Error) -> Self {
        Error::Yaml(error)
    }
}

impl From<String> for Error {
    fn from(message: String) -> Self {
        Error::internal(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_variants() {
        let io_error = Error::from(io::Error::new(io::ErrorKind::Other, "disk error"));
        assert_eq!(io_error.to_string(), "I/O error: disk error");

        let cli_error = Error::from(CliError::new("bad args"));
        assert_eq!(cli_error.to_string(), "bad args");

        let config_error = Error::config("--store=<path> argument is missing");
        assert_eq!(
            config_error.to_string(),
            "configuration error: --store=<path> argument is missing"
        );

        let store_error = Error::store("messages.json", "truncated");
        assert_eq!(
            store_error.to_string(),
            "signature store `messages.json`: truncated"
        );

        let internal_error = Error::internal("panic");
        assert_eq!(internal_error.to_string(), "internal error: panic");
    }

    #[test]
    fn source_exposes_wrapped_errors() {
        let io_error = Error::from(io::Error::new(io::ErrorKind::Other, "boom"));
        let source = io_error.source().unwrap();
        assert!(source.downcast_ref::<io::Error>().is_some());

        let json_error = Error::from(serde_json::from_str::<u32>("nope").unwrap_err());
        let source = json_error.source().unwrap();
        assert!(source.downcast_ref::<serde_json::Error>().is_some());

        assert!(Error::config("missing").source().is_none());
        assert!(Error::internal("internal").source().is_none());
    }

    #[test]
    fn config_errors_are_classified() {
        assert!(Error::config("missing").is_config());
        assert!(!Error::internal("other").is_config());
    }

    #[test]
    fn debug_builds_capture_backtrace() {
        if cfg!(debug_assertions) {
            let err = Error::internal("capture");
            assert!(err.backtrace().is_some());
        }
    }
}
