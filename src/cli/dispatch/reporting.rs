use std::io::{self, Write};

use crate::diagnostics::{Diagnostic, ErrorFormat, FileCache, FormatOptions, format_diagnostics};
use crate::error::Error;

pub(super) fn report_error(err: &Error) {
    let mut out = io::stderr();
    if let Err(io_err) = report_error_to(err, &mut out) {
        let _ = writeln!(io::stderr(), "failed to report error: {io_err}");
    }
}

pub(super) fn report_error_to(err: &Error, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "{err}")?;
    if cfg!(debug_assertions)
        && let Some(backtrace) = err.backtrace()
    {
        writeln!(out, "stack trace:")?;
        writeln!(out, "{backtrace}")?;
    }
    Ok(())
}

/// Print diagnostics: JSON always to stdout, otherwise to stderr when any of
/// them is an error.
pub(super) fn print_diagnostics(
    diagnostics: &[Diagnostic],
    files: &FileCache,
    options: FormatOptions,
) {
    let has_errors = diagnostics
        .iter()
        .any(|diagnostic| diagnostic.severity.is_error());
    let mut out: Box<dyn Write> = match options.format {
        ErrorFormat::Json => Box::new(io::stdout()),
        _ if has_errors => Box::new(io::stderr()),
        _ => Box::new(io::stdout()),
    };
    if let Err(err) = print_diagnostics_to(diagnostics, files, options, &mut out) {
        let _ = writeln!(io::stderr(), "failed to write diagnostics: {err}");
    }
}

pub(super) fn print_diagnostics_to(
    diagnostics: &[Diagnostic],
    files: &FileCache,
    options: FormatOptions,
    out: &mut dyn Write,
) -> io::Result<()> {
    if diagnostics.is_empty() {
        return Ok(());
    }
    let rendered = format_diagnostics(diagnostics, files, options);
    writeln!(out, "{rendered}")
}
