//! Message signature registry shared by the registration collector and the
//! call-site validator.

mod store;

pub use store::{JsonFileStore, LineFileStore, SignatureStore, StoredSignatures, store_for_path};

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::error::Error as StdError;
use std::fmt;

use crate::error::Error;

/// Expected parameter types for one message, excluding the output context and
/// the message name itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageSignature {
    pub name: String,
    pub parameter_types: Vec<String>,
}

impl MessageSignature {
    #[must_use]
    pub fn new(name: impl Into<String>, parameter_types: Vec<String>) -> Self {
        Self {
            name: name.into(),
            parameter_types,
        }
    }

    /// Number of arguments a dispatch call must pass, counting the two fixed ones.
    #[must_use]
    pub fn call_arity(&self) -> usize {
        self.parameter_types.len() + 2
    }
}

/// Outcome of a successful registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Registered {
    Inserted,
    Unchanged,
}

/// A message was registered again with a different parameter list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConflictError {
    pub name: String,
    pub existing: Vec<String>,
    pub rejected: Vec<String>,
}

impl fmt::Display for ConflictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parameter list for `{}` is different from previous definition",
            self.name
        )
    }
}

impl StdError for ConflictError {}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignatureRegistry {
    signatures: BTreeMap<String, MessageSignature>,
}

impl SignatureRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding everything `store` has persisted.
    ///
    /// # Errors
    ///
    /// Fails when the store cannot be read or its entries disagree.
    pub fn load(store: &dyn SignatureStore) -> crate::error::Result<Self> {
        let mut registry = Self::new();
        registry
            .merge(store.load()?)
            .map_err(|conflict| Error::store(store.path(), conflict.to_string()))?;
        Ok(registry)
    }

    /// Record `parameter_types` for `name`. Re-registering an identical list is
    /// a no-op; a different list is rejected and the stored entry kept.
    ///
    /// # Errors
    ///
    /// Returns [`ConflictError`] when `name` is already registered with a
    /// different parameter list.
    pub fn register(
        &mut self,
        name: &str,
        parameter_types: Vec<String>,
    ) -> Result<Registered, ConflictError> {
        match self.signatures.entry(name.to_string()) {
            Entry::Vacant(slot) => {
                tracing::debug!(
                    target: "registry",
                    message = name,
                    parameters = parameter_types.len(),
                    "registered message signature"
                );
                slot.insert(MessageSignature::new(name, parameter_types));
                Ok(Registered::Inserted)
            }
            Entry::Occupied(existing) if existing.get().parameter_types == parameter_types => {
                Ok(Registered::Unchanged)
            }
            Entry::Occupied(existing) => Err(ConflictError {
                name: name.to_string(),
                existing: existing.get().parameter_types.clone(),
                rejected: parameter_types,
            }),
        }
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&MessageSignature> {
        self.signatures.get(name)
    }

    /// Fold a persisted snapshot into this registry, returning how many
    /// messages were new.
    ///
    /// # Errors
    ///
    /// Stops at the first message whose stored list disagrees with this registry.
    pub fn merge(&mut self, snapshot: StoredSignatures) -> Result<usize, ConflictError> {
        let mut inserted = 0;
        for (name, parameter_types) in snapshot.messages {
            if self.register(&name, parameter_types)? == Registered::Inserted {
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// Signatures in name order.
    pub fn iter(&self) -> impl Iterator<Item = &MessageSignature> {
        self.signatures.values()
    }

    #[must_use]
    pub fn snapshot(&self) -> StoredSignatures {
        StoredSignatures::from_iter(
            self.iter()
                .map(|signature| (signature.name.clone(), signature.parameter_types.clone())),
        )
    }

    /// Content digest of the registry, stable across store formats.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for signature in self.iter() {
            hasher.update(signature.name.as_bytes());
            for parameter in &signature.parameter_types {
                hasher.update(b"|");
                hasher.update(parameter.as_bytes());
            }
            hasher.update(b"\n");
        }
        hasher.finalize().to_hex().chars().take(16).collect()
    }
}
