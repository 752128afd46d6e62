use serde::Serialize;

use super::{Diagnostic, DiagnosticCode, FileCache, Location, Severity};

pub const JSON_SCHEMA_VERSION: &str = "1.0.0";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorFormat {
    Human,
    Short,
    Json,
}

impl ErrorFormat {
    pub fn parse(spec: &str) -> Option<Self> {
        match spec.to_ascii_lowercase().as_str() {
            "human" | "pretty" => Some(Self::Human),
            "short" | "gcc" => Some(Self::Short),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatOptions {
    pub format: ErrorFormat,
    pub color: ColorMode,
    pub is_terminal: bool,
}

impl FormatOptions {
    #[must_use]
    pub fn plain(format: ErrorFormat) -> Self {
        Self {
            format,
            color: ColorMode::Never,
            is_terminal: false,
        }
    }

    #[must_use]
    pub fn use_color(self) -> bool {
        match self.color {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => self.is_terminal,
        }
    }
}

/// Render a collection of diagnostics to a single string, one entry per diagnostic.
#[must_use]
pub fn format_diagnostics(
    diagnostics: &[Diagnostic],
    files: &FileCache,
    options: FormatOptions,
) -> String {
    let use_color = options.use_color();
    diagnostics
        .iter()
        .map(|diagnostic| match options.format {
            ErrorFormat::Human => render_human(diagnostic, files, use_color),
            ErrorFormat::Short => render_short(diagnostic),
            ErrorFormat::Json => render_json(diagnostic),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_human(diagnostic: &Diagnostic, files: &FileCache, color: bool) -> String {
    let mut out = format_header(diagnostic, color);
    if let Some(location) = diagnostic.location.as_ref() {
        out.push_str(&format!("\n  --> {location}"));
        out.push_str(&render_snippet(location, diagnostic.severity, files, color));
    }
    for note in &diagnostic.notes {
        out.push_str(&format!("\n   = note: {note}"));
    }
    out
}

fn render_short(diagnostic: &Diagnostic) -> String {
    let code = code_of(diagnostic);
    let prefix = diagnostic
        .location
        .as_ref()
        .map_or_else(|| "<unknown>".to_string(), ToString::to_string);
    let mut out = format!(
        "{prefix}: {}[{code}]: {}",
        diagnostic.severity.as_str(),
        diagnostic.message
    );
    if !diagnostic.notes.is_empty() {
        out.push_str(&format!(" ({})", diagnostic.notes.join("; ")));
    }
    out
}

fn render_json(diagnostic: &Diagnostic) -> String {
    let payload = JsonDiagnostic {
        version: JSON_SCHEMA_VERSION,
        severity: diagnostic.severity.as_str(),
        code: diagnostic.code.as_ref(),
        message: &diagnostic.message,
        location: diagnostic.location.as_ref().map(JsonLocation::from),
        notes: &diagnostic.notes,
    };
    serde_json::to_string(&payload).unwrap_or_else(|_| "{}".into())
}

fn format_header(diagnostic: &Diagnostic, color: bool) -> String {
    let severity = diagnostic.severity.as_str();
    let prefix = if color {
        colorize(severity, severity_color(diagnostic.severity))
    } else {
        severity.to_string()
    };
    format!("{prefix}[{}]: {}", code_of(diagnostic), diagnostic.message)
}

fn render_snippet(location: &Location, severity: Severity, files: &FileCache, color: bool) -> String {
    let Some(line) = files
        .get(&location.file)
        .and_then(|file| file.line(location.line))
    else {
        return String::new();
    };
    let gutter = location.line.to_string().len();
    let indent = " ".repeat(usize::try_from(location.column.saturating_sub(1)).unwrap_or(0));
    let caret = if color {
        colorize("^", severity_color(severity))
    } else {
        "^".to_string()
    };
    format!(
        "\n{:>gutter$} |\n{} | {line}\n{:>gutter$} | {indent}{caret}",
        "", location.line, ""
    )
}

fn code_of(diagnostic: &Diagnostic) -> &str {
    diagnostic
        .code
        .as_ref()
        .map_or("UNKNOWN", |code| code.code.as_str())
}

fn colorize(value: &str, code: &str) -> String {
    format!("\u{1b}[{code}m{value}\u{1b}[0m")
}

fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "1;31",
        Severity::Warning => "1;33",
        Severity::Note => "1;34",
    }
}

#[derive(Serialize)]
struct JsonDiagnostic<'a> {
    version: &'static str,
    severity: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a DiagnosticCode>,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<JsonLocation>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    notes: &'a [String],
}

#[derive(Serialize)]
struct JsonLocation {
    file: String,
    line: u32,
    column: u32,
}

impl From<&Location> for JsonLocation {
    fn from(location: &Location) -> Self {
        Self {
            file: location.file.display().to_string(),
            line: location.line,
            column: location.column,
        }
    }
}
