use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::cli::commands::common::parse_error_format;
use crate::cli::{Cli, CliError, Command};
use crate::diagnostics::{ColorMode, ErrorFormat, FormatOptions};
use crate::driver::{
    CheckReport, MessageCheckDriver, RegisterReport, SignatureListing, format_input_list,
    resolve_store_path,
};
use crate::error::{Error, Result};

mod logging;
mod reporting;

pub const ERROR_FORMAT_ENV: &str = "MSGCHECK_ERROR_FORMAT";

/// Operations the dispatcher needs from a driver.
pub trait DispatchDriver {
    fn register(&self, store: &Path, manifests: &[PathBuf]) -> Result<RegisterReport>;
    fn check(&self, store: &Path, config: Option<&Path>, units: &[PathBuf])
    -> Result<CheckReport>;
    fn signatures(&self, store: &Path) -> Result<SignatureListing>;
}

impl DispatchDriver for MessageCheckDriver {
    fn register(&self, store: &Path, manifests: &[PathBuf]) -> Result<RegisterReport> {
        MessageCheckDriver::register(self, store, manifests)
    }

    fn check(
        &self,
        store: &Path,
        config: Option<&Path>,
        units: &[PathBuf],
    ) -> Result<CheckReport> {
        MessageCheckDriver::check(self, store, config, units)
    }

    fn signatures(&self, store: &Path) -> Result<SignatureListing> {
        MessageCheckDriver::signatures(self, store)
    }
}

/// Execute a parsed CLI command using the provided driver. Logging and diagnostics
/// reporting are configured here so the binary entrypoint can stay thin.
///
/// # Errors
///
/// Returns the driver's error, or a CLI error when any error diagnostic was
/// reported.
pub fn run<D: DispatchDriver>(driver: &D, cli: Cli) -> Result<()> {
    let log_options = cli.log_options;
    logging::init_logging(&log_options);
    let is_terminal = std::io::stderr().is_terminal();
    let env_error_format = std::env::var(ERROR_FORMAT_ENV)
        .ok()
        .and_then(|value| parse_error_format(&value).ok());
    let default_format = env_error_format.unwrap_or(if is_terminal {
        ErrorFormat::Human
    } else {
        ErrorFormat::Short
    });
    let color = if std::env::var_os("NO_COLOR").is_some() {
        ColorMode::Never
    } else {
        ColorMode::Auto
    };
    let format_options = FormatOptions {
        format: cli.error_format.unwrap_or(default_format),
        color,
        is_terminal,
    };
    let start = Instant::now();
    logging::log_run_start(&cli.command, &log_options);
    let result = dispatch_command(driver, &cli.command, format_options);
    logging::log_run_complete(&cli.command, start.elapsed(), &result);
    result
}

pub fn report_error(err: &Error) {
    reporting::report_error(err);
}

fn dispatch_command<D: DispatchDriver>(
    driver: &D,
    command: &Command,
    format_options: FormatOptions,
) -> Result<()> {
    match command {
        Command::Register { store, manifests } => {
            let store = resolve_store_path(store.clone())?;
            run_register(driver, &store, manifests, format_options)
        }
        Command::Check {
            store,
            config,
            units,
        } => {
            let store = resolve_store_path(store.clone())?;
            run_check(driver, &store, config.as_deref(), units, format_options)
        }
        Command::Signatures { store, json } => {
            let store = resolve_store_path(store.clone())?;
            run_signatures(driver, &store, *json)
        }
        Command::Help { topic } => {
            let text = match topic {
                Some(topic) => Cli::help_for(topic)?,
                None => Cli::usage(),
            };
            print!("{text}");
            Ok(())
        }
        Command::Version => {
            println!("{}", crate::version::formatted());
            Ok(())
        }
    }
}

fn run_register<D: DispatchDriver>(
    driver: &D,
    store: &Path,
    manifests: &[PathBuf],
    format_options: FormatOptions,
) -> Result<()> {
    let report = driver.register(store, manifests)?;
    reporting::print_diagnostics(&report.diagnostics, &report.files, format_options);
    if format_options.format != ErrorFormat::Json {
        println!(
            "registered {} new message(s) from {} ({} unchanged, {} rejected); {} holds {} message(s)",
            report.summary.inserted,
            format_input_list(&report.manifests),
            report.summary.unchanged,
            report.summary.rejected,
            report.store.display(),
            report.messages
        );
    }
    fail_on_errors(report.has_errors())
}

fn run_check<D: DispatchDriver>(
    driver: &D,
    store: &Path,
    config: Option<&Path>,
    units: &[PathBuf],
    format_options: FormatOptions,
) -> Result<()> {
    let report = driver.check(store, config, units)?;
    reporting::print_diagnostics(&report.diagnostics, &report.files, format_options);
    if format_options.format != ErrorFormat::Json {
        let verdict = if report.has_errors() {
            "check failed"
        } else {
            "check passed"
        };
        println!(
            "{verdict} for {}: {} call site(s) in {} function(s)",
            format_input_list(&report.units),
            report.call_sites(),
            report.functions.len()
        );
    }
    fail_on_errors(report.has_errors())
}

fn run_signatures<D: DispatchDriver>(driver: &D, store: &Path, json: bool) -> Result<()> {
    let listing = driver.signatures(store)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
    } else {
        println!("{}", listing.render_text());
    }
    Ok(())
}

fn fail_on_errors(has_errors: bool) -> Result<()> {
    if has_errors {
        return Err(Error::Cli(CliError::new("diagnostics reported; see above")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::CollectSummary;
    use crate::diagnostics::{Diagnostic, FileCache, codes};
    use crate::logging::LogOptions;
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakeDriver {
        fail_check: bool,
        stores: RefCell<Vec<PathBuf>>,
    }

    impl DispatchDriver for FakeDriver {
        fn register(&self, store: &Path, manifests: &[PathBuf]) -> Result<RegisterReport> {
            self.stores.borrow_mut().push(store.to_path_buf());
            Ok(RegisterReport {
                store: store.to_path_buf(),
                manifests: manifests.to_vec(),
                summary: CollectSummary {
                    inserted: manifests.len(),
                    ..CollectSummary::default()
                },
                messages: manifests.len(),
                diagnostics: Vec::new(),
                files: FileCache::default(),
            })
        }

        fn check(
            &self,
            store: &Path,
            _config: Option<&Path>,
            units: &[PathBuf],
        ) -> Result<CheckReport> {
            self.stores.borrow_mut().push(store.to_path_buf());
            let diagnostics = if self.fail_check {
                vec![
                    Diagnostic::error("Unknown format message: nodes", None)
                        .with_code(&codes::UNKNOWN_MESSAGE),
                ]
            } else {
                vec![Diagnostic::note("Cannot figure out message name", None)]
            };
            Ok(CheckReport {
                store: store.to_path_buf(),
                units: units.to_vec(),
                functions: Vec::new(),
                skipped_functions: 0,
                diagnostics,
                files: FileCache::default(),
            })
        }

        fn signatures(&self, store: &Path) -> Result<SignatureListing> {
            Ok(SignatureListing {
                store: store.to_path_buf(),
                fingerprint: "0000000000000000".into(),
                messages: Vec::new(),
            })
        }
    }

    fn cli(command: Command) -> Cli {
        Cli {
            command,
            log_options: LogOptions::DEFAULT,
            error_format: Some(ErrorFormat::Short),
        }
    }

    #[test]
    fn register_uses_the_store_from_the_command_line() {
        let driver = FakeDriver::default();
        run(
            &driver,
            cli(Command::Register {
                store: Some(PathBuf::from("m.json")),
                manifests: vec![PathBuf::from("a.json")],
            }),
        )
        .expect("register succeeds");
        assert_eq!(*driver.stores.borrow(), [PathBuf::from("m.json")]);
    }

    #[test]
    fn error_diagnostics_fail_the_command_but_notes_do_not() {
        let command = Command::Check {
            store: Some(PathBuf::from("m.json")),
            config: None,
            units: vec![PathBuf::from("u.json")],
        };
        run(&FakeDriver::default(), cli(command.clone())).expect("notes only");

        let failing = FakeDriver {
            fail_check: true,
            ..FakeDriver::default()
        };
        let err = run(&failing, cli(command)).expect_err("errors fail");
        assert_eq!(err.to_string(), "diagnostics reported; see above");
    }

    #[test]
    fn help_topics_are_validated() {
        let driver = FakeDriver::default();
        run(&driver, cli(Command::Help { topic: None })).expect("general help");
        run(
            &driver,
            cli(Command::Help {
                topic: Some("check".into()),
            }),
        )
        .expect("command help");
        let err = run(
            &driver,
            cli(Command::Help {
                topic: Some("bogus".into()),
            }),
        )
        .expect_err("unknown topic");
        assert!(matches!(err, Error::Cli(_)));
    }

    #[test]
    fn signatures_and_version_print_without_diagnostics() {
        let driver = FakeDriver::default();
        run(
            &driver,
            cli(Command::Signatures {
                store: Some(PathBuf::from("m.store")),
                json: true,
            }),
        )
        .expect("signatures");
        run(&driver, cli(Command::Version)).expect("version");
    }
}
