use std::path::PathBuf;

use serde::Serialize;

use crate::check::FunctionReport;
use crate::collect::CollectSummary;
use crate::diagnostics::{Diagnostic, FileCache, Severity};
use crate::registry::MessageSignature;

/// Result of feeding registration manifests into the store.
pub struct RegisterReport {
    pub store: PathBuf,
    pub manifests: Vec<PathBuf>,
    pub summary: CollectSummary,
    pub messages: usize,
    pub diagnostics: Vec<Diagnostic>,
    pub files: FileCache,
}

impl RegisterReport {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        has_errors(&self.diagnostics)
    }

    #[must_use]
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Result of validating call sites in one or more unit dumps.
pub struct CheckReport {
    pub store: PathBuf,
    pub units: Vec<PathBuf>,
    pub functions: Vec<FunctionReport>,
    /// Functions captured at a pass other than the analysis stage.
    pub skipped_functions: usize,
    pub diagnostics: Vec<Diagnostic>,
    pub files: FileCache,
}

impl CheckReport {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        has_errors(&self.diagnostics)
    }

    #[must_use]
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    #[must_use]
    pub fn call_sites(&self) -> usize {
        self.functions.iter().map(|function| function.sites.len()).sum()
    }

    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.severity == severity)
            .count()
    }
}

/// Registry contents as printed by `msgcheck signatures`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SignatureListing {
    pub store: PathBuf,
    pub fingerprint: String,
    pub messages: Vec<ListedSignature>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ListedSignature {
    pub name: String,
    pub parameters: Vec<String>,
}

impl From<&MessageSignature> for ListedSignature {
    fn from(signature: &MessageSignature) -> Self {
        Self {
            name: signature.name.clone(),
            parameters: signature.parameter_types.clone(),
        }
    }
}

impl SignatureListing {
    /// One `name(param, param)` line per message.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for message in &self.messages {
            out.push_str(&message.name);
            out.push('(');
            out.push_str(&message.parameters.join(", "));
            out.push_str(")\n");
        }
        out.push_str(&format!(
            "{} message(s) in {} [{}]",
            self.messages.len(),
            self.store.display(),
            self.fingerprint
        ));
        out
    }
}

fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics
        .iter()
        .any(|diagnostic| diagnostic.severity.is_error())
}
