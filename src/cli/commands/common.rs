use std::path::PathBuf;

use crate::diagnostics::ErrorFormat;
use crate::logging::{LogFormat, LogLevel, LogSettings};

use super::super::CliError;

pub(crate) fn is_help_flag(value: &str) -> bool {
    matches!(value, "-h" | "--help")
}

/// Command-specific switches a parser accepts in addition to the global ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CommandFlag {
    Store,
    Config,
    Json,
}

impl CommandFlag {
    fn name(self) -> &'static str {
        match self {
            CommandFlag::Store => "--store",
            CommandFlag::Config => "--config",
            CommandFlag::Json => "--json",
        }
    }
}

/// Options and positional inputs parsed from one command's argument list.
#[derive(Debug, Default)]
pub(crate) struct CommandArgs {
    pub(crate) inputs: Vec<PathBuf>,
    pub(crate) store: Option<PathBuf>,
    pub(crate) config: Option<PathBuf>,
    pub(crate) json: bool,
    pub(crate) help: bool,
    pub(crate) log_settings: LogSettings,
    pub(crate) error_format: Option<ErrorFormat>,
}

/// Parse options and inputs in any order. `--flag=value` and `--flag value`
/// are both accepted; everything after `--` is an input.
pub(crate) fn parse_command_args(
    command: &str,
    args: Vec<String>,
    accepted: &[CommandFlag],
) -> Result<CommandArgs, CliError> {
    let mut parsed = CommandArgs::default();
    let mut iter = args.into_iter();
    let mut inputs_only = false;
    while let Some(arg) = iter.next() {
        if inputs_only || !arg.starts_with('-') || arg == "-" {
            push_input(&mut parsed.inputs, arg)?;
            continue;
        }
        if arg == "--" {
            inputs_only = true;
            continue;
        }
        if is_help_flag(&arg) {
            parsed.help = true;
            continue;
        }
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => {
                (flag.to_string(), Some(value.to_string()))
            }
            _ => (arg, None),
        };
        let mut value = || -> Result<String, CliError> {
            inline
                .clone()
                .or_else(|| iter.next())
                .ok_or_else(|| CliError::with_usage(format!("expected value after {flag}")))
        };
        match flag.as_str() {
            "--store" => {
                require_accepted(command, CommandFlag::Store, accepted)?;
                parsed.store = Some(non_empty_path(&flag, value()?)?);
            }
            "--config" => {
                require_accepted(command, CommandFlag::Config, accepted)?;
                parsed.config = Some(non_empty_path(&flag, value()?)?);
            }
            "--json" => {
                require_accepted(command, CommandFlag::Json, accepted)?;
                if inline.is_some() {
                    return Err(CliError::with_usage("--json does not take a value"));
                }
                parsed.json = true;
            }
            "--log-format" => parsed.log_settings.format = Some(parse_log_format(&value()?)?),
            "--log-level" => parsed.log_settings.level = Some(parse_log_level(&value()?)?),
            "--error-format" => parsed.error_format = Some(parse_error_format(&value()?)?),
            other => {
                return Err(CliError::with_usage(format!(
                    "unsupported option '{other}' for {command}"
                )));
            }
        }
    }
    Ok(parsed)
}

fn push_input(inputs: &mut Vec<PathBuf>, value: String) -> Result<(), CliError> {
    if value.trim().is_empty() {
        return Err(CliError::with_usage("input path must not be empty"));
    }
    inputs.push(PathBuf::from(value));
    Ok(())
}

fn non_empty_path(flag: &str, value: String) -> Result<PathBuf, CliError> {
    if value.trim().is_empty() {
        return Err(CliError::with_usage(format!("{flag} requires a path")));
    }
    Ok(PathBuf::from(value))
}

fn require_accepted(
    command: &str,
    flag: CommandFlag,
    accepted: &[CommandFlag],
) -> Result<(), CliError> {
    if accepted.contains(&flag) {
        Ok(())
    } else {
        Err(CliError::with_usage(format!(
            "unsupported option '{}' for {command}",
            flag.name()
        )))
    }
}

pub(crate) fn parse_log_format(spec: &str) -> Result<LogFormat, CliError> {
    LogFormat::parse(spec).ok_or_else(|| {
        CliError::with_usage(format!(
            "invalid log format '{spec}'; supported values: auto, text, json"
        ))
    })
}

pub(crate) fn parse_log_level(spec: &str) -> Result<LogLevel, CliError> {
    LogLevel::parse(spec).ok_or_else(|| {
        CliError::with_usage(format!(
            "invalid log level '{spec}'; supported values: error, warn, info, debug, trace"
        ))
    })
}

pub(crate) fn parse_error_format(spec: &str) -> Result<ErrorFormat, CliError> {
    ErrorFormat::parse(spec.trim()).ok_or_else(|| {
        CliError::with_usage(format!(
            "invalid --error-format '{spec}'; supported values: human, short, json"
        ))
    })
}
