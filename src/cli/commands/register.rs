use super::super::{Cli, CliError, Command};
use super::common::{CommandFlag, parse_command_args};

pub(super) fn parse(args: Vec<String>) -> Result<Cli, CliError> {
    let parsed = parse_command_args("register", args, &[CommandFlag::Store])?;
    if parsed.help {
        return Ok(Cli::help(Some("register")));
    }
    if parsed.inputs.is_empty() {
        return Err(CliError::with_usage("register requires <manifest> argument"));
    }
    Ok(Cli {
        command: Command::Register {
            store: parsed.store,
            manifests: parsed.inputs,
        },
        log_options: parsed.log_settings.merged_with_env(),
        error_format: parsed.error_format,
    })
}
