use super::super::{Cli, CliError, Command};
use super::common::{CommandFlag, parse_command_args};

pub(super) fn parse(args: Vec<String>) -> Result<Cli, CliError> {
    let parsed = parse_command_args(
        "check",
        args,
        &[CommandFlag::Store, CommandFlag::Config],
    )?;
    if parsed.help {
        return Ok(Cli::help(Some("check")));
    }
    if parsed.inputs.is_empty() {
        return Err(CliError::with_usage("check requires <unit> argument"));
    }
    Ok(Cli {
        command: Command::Check {
            store: parsed.store,
            config: parsed.config,
            units: parsed.inputs,
        },
        log_options: parsed.log_settings.merged_with_env(),
        error_format: parsed.error_format,
    })
}
