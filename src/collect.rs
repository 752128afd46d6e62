//! Registration collector: turns message declarations observed by the front end
//! into registry entries and keeps the on-disk store current.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::diagnostics::{Diagnostic, DiagnosticSink, Location, codes};
use crate::error::{Error, Result};
use crate::registry::{Registered, SignatureRegistry, SignatureStore};

/// One declaration as the front end saw it. The first argument is the message
/// name and the remaining arguments are parameter type spellings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub function: String,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub column: u32,
    #[serde(default)]
    pub arguments: Vec<Value>,
}

/// All declarations found in one compilation unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegistrationManifest {
    pub file: PathBuf,
    #[serde(default)]
    pub registrations: Vec<Registration>,
}

impl RegistrationManifest {
    /// Read a manifest from disk.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or is not a manifest.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|err| {
            Error::config(format!(
                "failed to read registration manifest `{}`: {err}",
                path.display()
            ))
        })?;
        serde_json::from_str(&contents).map_err(|err| {
            Error::config(format!(
                "failed to parse registration manifest `{}`: {err}",
                path.display()
            ))
        })
    }
}

/// Counts for one collector run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollectSummary {
    pub inserted: usize,
    pub unchanged: usize,
    pub rejected: usize,
}

/// Owns the registry for a registration run and writes it back after every
/// new message.
pub struct Registrar {
    registry: SignatureRegistry,
    store: Box<dyn SignatureStore>,
    summary: CollectSummary,
}

impl Registrar {
    /// Load the store and prepare to accept registrations.
    ///
    /// # Errors
    ///
    /// Fails when an existing store cannot be read.
    pub fn open(store: Box<dyn SignatureStore>) -> Result<Self> {
        let registry = SignatureRegistry::load(&*store)?;
        tracing::debug!(
            target: "registry",
            path = %store.path().display(),
            messages = registry.len(),
            "loaded signature store"
        );
        Ok(Self {
            registry,
            store,
            summary: CollectSummary::default(),
        })
    }

    #[must_use]
    pub fn registry(&self) -> &SignatureRegistry {
        &self.registry
    }

    #[must_use]
    pub fn summary(&self) -> CollectSummary {
        self.summary
    }

    /// Process every declaration in `manifest`.
    ///
    /// # Errors
    ///
    /// Propagates store write failures.
    pub fn observe_manifest(
        &mut self,
        manifest: &RegistrationManifest,
        sink: &mut DiagnosticSink,
    ) -> Result<()> {
        for registration in &manifest.registrations {
            self.observe(&manifest.file, registration, sink)?;
        }
        Ok(())
    }

    /// Register one declaration. Invalid or conflicting declarations are reported
    /// to `sink` and leave the registry untouched.
    ///
    /// # Errors
    ///
    /// Propagates store write failures.
    pub fn observe(
        &mut self,
        file: &Path,
        registration: &Registration,
        sink: &mut DiagnosticSink,
    ) -> Result<Option<Registered>> {
        let location = Location::new(file, registration.line, registration.column);
        let Some(name) = registration.arguments.first().and_then(Value::as_str) else {
            sink.error(
                &codes::NON_STRING_MESSAGE,
                "Output message must be a string",
                Some(location),
            );
            self.summary.rejected += 1;
            return Ok(None);
        };
        let Some(parameters) = registration.arguments[1..]
            .iter()
            .map(|argument| argument.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
        else {
            sink.error(
                &codes::NON_STRING_ARGUMENT,
                "Output message argument must be a string",
                Some(location),
            );
            self.summary.rejected += 1;
            return Ok(None);
        };

        match self.registry.register(name, parameters) {
            Ok(Registered::Inserted) => {
                self.summary.inserted += 1;
                self.store.persist(&self.registry.snapshot())?;
                tracing::info!(
                    target: "registry",
                    message = name,
                    function = registration.function.as_str(),
                    "new message signature"
                );
                Ok(Some(Registered::Inserted))
            }
            Ok(Registered::Unchanged) => {
                self.summary.unchanged += 1;
                Ok(Some(Registered::Unchanged))
            }
            Err(conflict) => {
                self.summary.rejected += 1;
                sink.push(
                    Diagnostic::error(conflict.to_string(), Some(location))
                        .with_code(&codes::REGISTRATION_CONFLICT)
                        .with_note(format!("Expected: {}", conflict.existing.join(" ")))
                        .with_note(format!("Got     : {}", conflict.rejected.join(" "))),
                );
                Ok(None)
            }
        }
    }
}
