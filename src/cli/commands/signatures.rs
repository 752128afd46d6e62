use super::super::{Cli, CliError, Command};
use super::common::{CommandFlag, parse_command_args};

pub(super) fn parse(args: Vec<String>) -> Result<Cli, CliError> {
    let parsed = parse_command_args(
        "signatures",
        args,
        &[CommandFlag::Store, CommandFlag::Json],
    )?;
    if parsed.help {
        return Ok(Cli::help(Some("signatures")));
    }
    if let Some(extra) = parsed.inputs.first() {
        return Err(CliError::with_usage(format!(
            "signatures does not accept positional arguments (found '{}')",
            extra.display()
        )));
    }
    Ok(Cli {
        command: Command::Signatures {
            store: parsed.store,
            json: parsed.json,
        },
        log_options: parsed.log_settings.merged_with_env(),
        error_format: parsed.error_format,
    })
}
