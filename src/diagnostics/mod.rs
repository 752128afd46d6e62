//! Diagnostics model shared by the registration collector, the call-site validator and the CLI.

mod files;
mod formatter;

pub use files::{FileCache, SourceFile};
pub use formatter::{
    ColorMode, ErrorFormat, FormatOptions, JSON_SCHEMA_VERSION, format_diagnostics,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Source position reported by the host (1-based line and column).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub file: PathBuf,
    pub line: u32,
    pub column: u32,
}

impl Location {
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

/// Severity level of a diagnostic. Only errors fail a build.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl Severity {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
        }
    }

    #[must_use]
    pub fn is_error(self) -> bool {
        matches!(self, Severity::Error)
    }
}

/// Structured identifier for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiagnosticCode {
    pub code: String,
    pub category: Option<String>,
}

impl DiagnosticCode {
    #[must_use]
    pub fn new(code: impl Into<String>, category: Option<String>) -> Self {
        Self {
            code: code.into(),
            category,
        }
    }
}

impl From<&DiagnosticDescriptor> for DiagnosticCode {
    fn from(descriptor: &DiagnosticDescriptor) -> Self {
        Self::new(descriptor.code, Some(descriptor.category.to_string()))
    }
}

/// Static description of one diagnostic kind.
#[derive(Debug, Clone)]
pub struct DiagnosticDescriptor {
    pub code: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    pub description: &'static str,
}

pub mod codes {
    use super::DiagnosticDescriptor;

    pub static UNKNOWN_MESSAGE: DiagnosticDescriptor = DiagnosticDescriptor {
        code: "MSG0001",
        name: "unknown_message",
        category: "check",
        description: "a literal message name has no registered signature",
    };
    pub static UNREGISTERED_CANDIDATE: DiagnosticDescriptor = DiagnosticDescriptor {
        code: "MSG0002",
        name: "unregistered_candidate",
        category: "check",
        description: "a candidate message name has no registered signature",
    };
    pub static ARGUMENT_COUNT: DiagnosticDescriptor = DiagnosticDescriptor {
        code: "MSG0003",
        name: "argument_count",
        category: "check",
        description: "the call supplies a different number of message arguments",
    };
    pub static ARGUMENT_TYPE: DiagnosticDescriptor = DiagnosticDescriptor {
        code: "MSG0004",
        name: "argument_type",
        category: "check",
        description: "a message argument does not match the registered type",
    };
    pub static UNRESOLVED_NAME: DiagnosticDescriptor = DiagnosticDescriptor {
        code: "MSG0005",
        name: "unresolved_name",
        category: "check",
        description: "the message name cannot be determined statically",
    };
    pub static REGISTRATION_CONFLICT: DiagnosticDescriptor = DiagnosticDescriptor {
        code: "MSG0006",
        name: "registration_conflict",
        category: "register",
        description: "a message was registered twice with different parameter lists",
    };
    pub static NON_STRING_ARGUMENT: DiagnosticDescriptor = DiagnosticDescriptor {
        code: "MSG0007",
        name: "non_string_argument",
        category: "register",
        description: "a registration parameter type is not a string",
    };
    pub static NON_STRING_MESSAGE: DiagnosticDescriptor = DiagnosticDescriptor {
        code: "MSG0008",
        name: "non_string_message",
        category: "register",
        description: "a registration message name is not a string",
    };
    pub static EMPTY_STORE: DiagnosticDescriptor = DiagnosticDescriptor {
        code: "MSG0009",
        name: "empty_store",
        category: "check",
        description: "the signature store holds no registrations",
    };
}

/// A single reported problem or remark.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: Option<DiagnosticCode>,
    pub message: String,
    pub location: Option<Location>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    #[must_use]
    pub fn error(message: impl Into<String>, location: Option<Location>) -> Self {
        Self::new(Severity::Error, message, location)
    }

    #[must_use]
    pub fn warning(message: impl Into<String>, location: Option<Location>) -> Self {
        Self::new(Severity::Warning, message, location)
    }

    #[must_use]
    pub fn note(message: impl Into<String>, location: Option<Location>) -> Self {
        Self::new(Severity::Note, message, location)
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<DiagnosticCode>) -> Self {
        self.code = Some(code.into());
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    #[must_use]
    fn new(severity: Severity, message: impl Into<String>, location: Option<Location>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            location,
            notes: Vec::new(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = self
            .code
            .as_ref()
            .map(|c| c.code.as_str())
            .unwrap_or("UNKNOWN");
        write!(f, "{}[{code}]: {}", self.severity.as_str(), self.message)
    }
}

/// Accumulates diagnostics for one run. The host decides the build outcome from
/// [`DiagnosticSink::has_errors`].
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => tracing::debug!(
                target: "diagnostics",
                code = diagnostic.code.as_ref().map_or("UNKNOWN", |c| c.code.as_str()),
                "{}",
                diagnostic.message
            ),
            Severity::Warning | Severity::Note => {
                tracing::trace!(target: "diagnostics", "{}", diagnostic.message);
            }
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn error(
        &mut self,
        descriptor: &DiagnosticDescriptor,
        message: impl Into<String>,
        location: Option<Location>,
    ) {
        self.push(Diagnostic::error(message, location).with_code(descriptor));
    }

    pub fn warning(
        &mut self,
        descriptor: &DiagnosticDescriptor,
        message: impl Into<String>,
        location: Option<Location>,
    ) {
        self.push(Diagnostic::warning(message, location).with_code(descriptor));
    }

    pub fn note(
        &mut self,
        descriptor: &DiagnosticDescriptor,
        message: impl Into<String>,
        location: Option<Location>,
    ) {
        self.push(Diagnostic::note(message, location).with_code(descriptor));
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.severity == severity)
            .count()
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| diagnostic.severity.is_error())
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
