use std::path::PathBuf;
use std::time::Duration;

use crate::cli::Command;
use crate::driver::format_input_list;
use crate::logging::LogOptions;

pub(super) fn init_logging(options: &LogOptions) {
    crate::logging::init(options);
}

pub(super) fn log_run_start(command: &Command, options: &LogOptions) {
    let inputs = command_inputs(command);
    tracing::info!(
        target: "pipeline",
        stage = "cli.run.start",
        command = command.name(),
        status = "start",
        log_level = %options.level,
        log_format = %options.format,
        input_count = inputs.len(),
        inputs = %format_input_list(inputs)
    );
}

pub(super) fn log_run_complete(
    command: &Command,
    elapsed: Duration,
    result: &crate::error::Result<()>,
) {
    let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
    let inputs = command_inputs(command);
    match result {
        Ok(()) => tracing::info!(
            target: "pipeline",
            stage = "cli.run.complete",
            command = command.name(),
            status = "ok",
            input_count = inputs.len(),
            elapsed_ms
        ),
        Err(err) => tracing::error!(
            target: "pipeline",
            stage = "cli.run.complete",
            command = command.name(),
            status = "error",
            input_count = inputs.len(),
            elapsed_ms,
            error = %err
        ),
    }
}

fn command_inputs(command: &Command) -> &[PathBuf] {
    match command {
        Command::Register { manifests, .. } => manifests,
        Command::Check { units, .. } => units,
        Command::Signatures { .. } | Command::Help { .. } | Command::Version => &[],
    }
}
