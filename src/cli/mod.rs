//! CLI front-end: command parsing, registry, and dispatch helpers used by the `msgcheck` binary.

mod commands;
mod help;

use std::env;
use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

use crate::diagnostics::ErrorFormat;
use crate::logging::LogOptions;
use commands::common::is_help_flag;

pub mod dispatch;

pub(crate) type CommandParser = fn(Vec<String>) -> Result<Cli, CliError>;

#[derive(Clone, Copy)]
pub(crate) struct CommandDescriptor {
    name: &'static str,
    aliases: &'static [&'static str],
    parser: CommandParser,
}

impl CommandDescriptor {
    pub(crate) fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn parse(&self, args: Vec<String>) -> Result<Cli, CliError> {
        (self.parser)(args)
    }

    fn matches(&self, name: &str) -> bool {
        self.name == name || self.aliases.contains(&name)
    }
}

pub(crate) fn resolve_command(name: &str) -> Option<&'static CommandDescriptor> {
    commands::descriptors()
        .iter()
        .find(|descriptor| descriptor.matches(name))
}

/// Top-level commands supported by the `msgcheck` CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Register {
        store: Option<PathBuf>,
        manifests: Vec<PathBuf>,
    },
    Check {
        store: Option<PathBuf>,
        config: Option<PathBuf>,
        units: Vec<PathBuf>,
    },
    Signatures {
        store: Option<PathBuf>,
        json: bool,
    },
    Help {
        topic: Option<String>,
    },
    Version,
}

impl Command {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Command::Register { .. } => "register",
            Command::Check { .. } => "check",
            Command::Signatures { .. } => "signatures",
            Command::Help { .. } => "help",
            Command::Version => "version",
        }
    }
}

/// Parsed CLI invocation.
#[derive(Debug, Clone)]
pub struct Cli {
    pub command: Command,
    pub log_options: LogOptions,
    pub error_format: Option<ErrorFormat>,
}

/// Error emitted while parsing command-line arguments.
#[derive(Debug, Clone)]
pub struct CliError {
    message: String,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn with_usage(message: impl Into<String>) -> Self {
        let mut owned = message.into();
        owned.push_str("\n\n");
        owned.push_str(&Cli::usage());
        Self::new(owned)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for CliError {}

impl Cli {
    /// Parse arguments from the environment.
    ///
    /// # Errors
    /// Returns a [`CliError`] when the arguments cannot be interpreted as a supported command.
    pub fn parse() -> Result<Self, CliError> {
        Self::parse_from(env::args().skip(1))
    }

    /// Parse arguments from an iterator (useful for testing).
    ///
    /// # Errors
    /// Returns a [`CliError`] when the provided iterator does not describe a valid invocation.
    pub fn parse_from<I, T>(args: I) -> Result<Self, CliError>
    where
        I: Iterator<Item = T>,
        T: Into<String>,
    {
        let mut iter = args.map(Into::into).peekable();
        let mut global_prefix = Vec::new();
        while let Some(flag) = iter.peek().cloned() {
            if !flag.starts_with('-') || flag == "--" {
                break;
            }
            if is_help_flag(&flag) || matches!(flag.as_str(), "--version" | "-V") {
                break;
            }
            if let Some(consumed) = consume_global_option(&mut iter)? {
                global_prefix.extend(consumed);
                continue;
            }
            return Err(CliError::with_usage(format!(
                "unsupported global option '{flag}'"
            )));
        }

        let Some(raw_command) = iter.next() else {
            return Err(CliError::with_usage("missing command"));
        };

        match raw_command.as_str() {
            "--help" | "-h" | "help" => {
                let topic = iter
                    .next()
                    .filter(|value| !is_help_flag(value))
                    .map(|value| value.to_ascii_lowercase());
                return Ok(Cli::help(topic.as_deref()));
            }
            "--version" | "-V" | "version" => {
                let remaining: Vec<String> = iter.collect();
                if remaining.iter().any(|value| is_help_flag(value)) {
                    return Ok(Cli::help(Some("version")));
                }
                if !remaining.is_empty() {
                    return Err(CliError::with_usage(
                        "msgcheck version does not accept additional arguments",
                    ));
                }
                return Ok(Cli {
                    command: Command::Version,
                    log_options: LogOptions::from_env(),
                    error_format: None,
                });
            }
            _ => {}
        }

        let mut remaining = global_prefix;
        remaining.extend(iter);
        if let Some(descriptor) = resolve_command(&raw_command) {
            tracing::trace!(target: "cli", command = descriptor.name(), "parsing command");
            return descriptor.parse(remaining);
        }

        Err(CliError::with_usage(format!(
            "unknown command '{raw_command}'"
        )))
    }

    pub(crate) fn help(topic: Option<&str>) -> Self {
        Cli {
            command: Command::Help {
                topic: topic.map(str::to_string),
            },
            log_options: LogOptions::from_env(),
            error_format: None,
        }
    }

    /// Return formatted general help text.
    #[must_use]
    pub fn usage() -> String {
        help::render_general_help()
    }

    /// Return help text for a specific command.
    ///
    /// # Errors
    /// Returns a [`CliError`] when the requested topic is unknown.
    pub fn help_for(topic: &str) -> Result<String, CliError> {
        help::render_command_help(topic)
            .ok_or_else(|| CliError::with_usage(help::format_unknown_topic(topic)))
    }
}

fn consume_global_option<I>(
    iter: &mut std::iter::Peekable<I>,
) -> Result<Option<Vec<String>>, CliError>
where
    I: Iterator<Item = String>,
{
    let Some(flag) = iter.peek().cloned() else {
        return Ok(None);
    };
    let name = flag.split_once('=').map_or(flag.as_str(), |(name, _)| name);
    if !matches!(name, "--log-format" | "--log-level" | "--error-format") {
        return Ok(None);
    }
    iter.next();
    if name.len() < flag.len() {
        return Ok(Some(vec![flag]));
    }
    let value = iter
        .next()
        .ok_or_else(|| CliError::with_usage(format!("expected value after {flag}")))?;
    Ok(Some(vec![flag, value]))
}
