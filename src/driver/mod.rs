//! Operations behind the `msgcheck` commands, independent of argument parsing.

use std::path::{Path, PathBuf};

use crate::check::{self, Validator};
use crate::collect::{Registrar, RegistrationManifest};
use crate::diagnostics::{DiagnosticSink, FileCache, codes};
use crate::error::{Error, Result};
use crate::ir::TranslationUnit;
use crate::registry::{SignatureRegistry, store_for_path};

mod report;

pub use report::{CheckReport, ListedSignature, RegisterReport, SignatureListing};

pub const STORE_ENV: &str = "MSGCHECK_STORE";

/// Pick the store path from the command line, falling back to [`STORE_ENV`].
///
/// # Errors
///
/// Fails when neither source names a store.
pub fn resolve_store_path(flag: Option<PathBuf>) -> Result<PathBuf> {
    let from_env = std::env::var_os(STORE_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from);
    select_store_path(flag, from_env)
}

fn select_store_path(flag: Option<PathBuf>, from_env: Option<PathBuf>) -> Result<PathBuf> {
    flag.filter(|path| !path.as_os_str().is_empty())
        .or(from_env)
        .ok_or_else(|| Error::config("--store=<path> argument is missing"))
}

/// Comma-separated display of `inputs`, or `<none>`.
pub(crate) fn format_input_list(inputs: &[PathBuf]) -> String {
    if inputs.is_empty() {
        return "<none>".into();
    }
    inputs
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Entry point used by the CLI dispatcher and by embedding hosts.
#[derive(Debug, Default, Clone, Copy)]
pub struct MessageCheckDriver;

impl MessageCheckDriver {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Collect registrations from each manifest in order, persisting the store
    /// whenever a new message appears.
    ///
    /// # Errors
    ///
    /// Fails when a manifest cannot be read or the store cannot be read or
    /// written. Conflicting declarations are diagnostics, not errors.
    pub fn register(&self, store: &Path, manifests: &[PathBuf]) -> Result<RegisterReport> {
        let mut registrar = Registrar::open(store_for_path(store))?;
        let mut sink = DiagnosticSink::new();
        let mut files = FileCache::default();
        for path in manifests {
            let manifest = RegistrationManifest::from_path(path)?;
            files.load(&manifest.file);
            registrar.observe_manifest(&manifest, &mut sink)?;
        }
        let summary = registrar.summary();
        tracing::info!(
            target: "registry",
            store = %store.display(),
            manifests = %format_input_list(manifests),
            inserted = summary.inserted,
            unchanged = summary.unchanged,
            rejected = summary.rejected,
            "registration complete"
        );
        Ok(RegisterReport {
            store: store.to_path_buf(),
            manifests: manifests.to_vec(),
            summary,
            messages: registrar.registry().len(),
            diagnostics: sink.into_vec(),
            files,
        })
    }

    /// Validate every dispatch call site in the given unit dumps against the
    /// stored signatures.
    ///
    /// # Errors
    ///
    /// Fails when the configuration, the store, or a unit dump cannot be
    /// loaded. Call-site problems are diagnostics, not errors.
    pub fn check(
        &self,
        store: &Path,
        config: Option<&Path>,
        units: &[PathBuf],
    ) -> Result<CheckReport> {
        let config = check::config::load(config)?;
        let registry = SignatureRegistry::load(&*store_for_path(store))?;
        let validator = Validator::new(&registry, &config);
        let mut sink = DiagnosticSink::new();
        let mut files = FileCache::default();
        if registry.is_empty() {
            sink.warning(
                &codes::EMPTY_STORE,
                format!(
                    "no message signatures registered in {}; every named message will be reported as unknown",
                    store.display()
                ),
                None,
            );
        }

        let mut functions = Vec::new();
        let mut skipped_functions = 0;
        for path in units {
            let unit = TranslationUnit::from_path(path)?;
            files.load(&unit.file);
            for function in &unit.functions {
                if function.file != unit.file {
                    files.load(&function.file);
                }
                match validator.run_pass(&unit.pass, function, &mut sink) {
                    Some(report) => functions.push(report),
                    None => skipped_functions += 1,
                }
            }
        }

        let report = CheckReport {
            store: store.to_path_buf(),
            units: units.to_vec(),
            functions,
            skipped_functions,
            diagnostics: sink.into_vec(),
            files,
        };
        tracing::info!(
            target: "check",
            units = %format_input_list(units),
            messages = registry.len(),
            functions = report.functions.len(),
            skipped = report.skipped_functions,
            call_sites = report.call_sites(),
            diagnostics = report.diagnostics.len(),
            "call-site check complete"
        );
        Ok(report)
    }

    /// List the stored signatures.
    ///
    /// # Errors
    ///
    /// Fails when the store exists but cannot be read.
    pub fn signatures(&self, store: &Path) -> Result<SignatureListing> {
        let registry = SignatureRegistry::load(&*store_for_path(store))?;
        Ok(SignatureListing {
            store: store.to_path_buf(),
            fingerprint: registry.fingerprint(),
            messages: registry.iter().map(ListedSignature::from).collect(),
        })
    }
}
