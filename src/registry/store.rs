//! On-disk persistence for the signature registry.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{Error, Result};

pub const STORE_FORMAT_VERSION: u32 = 1;

/// Serialisable registry contents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSignatures {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub messages: BTreeMap<String, Vec<String>>,
}

fn default_version() -> u32 {
    STORE_FORMAT_VERSION
}

impl Default for StoredSignatures {
    fn default() -> Self {
        Self {
            version: STORE_FORMAT_VERSION,
            messages: BTreeMap::new(),
        }
    }
}

impl StoredSignatures {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl FromIterator<(String, Vec<String>)> for StoredSignatures {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        Self {
            version: STORE_FORMAT_VERSION,
            messages: iter.into_iter().collect(),
        }
    }
}

/// Backing store for signatures shared between invocations.
pub trait SignatureStore {
    fn path(&self) -> &Path;

    /// Read the stored signatures. A store that does not exist yet is empty.
    ///
    /// # Errors
    ///
    /// Fails when the file exists but cannot be read or parsed.
    fn load(&self) -> Result<StoredSignatures>;

    /// Replace the stored signatures. Readers observe either the previous or
    /// the new contents, never a partial write.
    ///
    /// # Errors
    ///
    /// Fails when the temporary file cannot be written or renamed into place.
    fn persist(&self, signatures: &StoredSignatures) -> Result<()>;
}

/// Pretty-printed JSON store (`.json`).
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SignatureStore for JsonFileStore {
    fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<StoredSignatures> {
        let Some(contents) = read_existing(&self.path)? else {
            return Ok(StoredSignatures::default());
        };
        if contents.trim().is_empty() {
            return Ok(StoredSignatures::default());
        }
        serde_json::from_str(&contents)
            .map_err(|err| Error::store(&self.path, format!("malformed signature store: {err}")))
    }

    fn persist(&self, signatures: &StoredSignatures) -> Result<()> {
        let mut json = serde_json::to_string_pretty(signatures)?;
        json.push('\n');
        write_atomically(&self.path, &json)
    }
}

/// One message per line: the name followed by `|`-separated parameter types.
#[derive(Clone, Debug)]
pub struct LineFileStore {
    path: PathBuf,
}

impl LineFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SignatureStore for LineFileStore {
    fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<StoredSignatures> {
        let Some(contents) = read_existing(&self.path)? else {
            return Ok(StoredSignatures::default());
        };
        let mut messages = BTreeMap::new();
        for (index, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let mut parts = line.split('|').map(str::to_string);
            let name = parts.next().unwrap_or_default();
            if name.is_empty() {
                return Err(Error::store(
                    &self.path,
                    format!("line {} has no message name", index + 1),
                ));
            }
            let parameters: Vec<String> = parts.collect();
            if let Some(previous) = messages.get(&name)
                && previous != &parameters
            {
                return Err(Error::store(
                    &self.path,
                    format!(
                        "line {} redefines `{name}` with a different parameter list",
                        index + 1
                    ),
                ));
            }
            messages.insert(name, parameters);
        }
        Ok(StoredSignatures {
            version: STORE_FORMAT_VERSION,
            messages,
        })
    }

    fn persist(&self, signatures: &StoredSignatures) -> Result<()> {
        let mut out = String::new();
        for (name, parameters) in &signatures.messages {
            out.push_str(name);
            for parameter in parameters {
                out.push('|');
                out.push_str(parameter);
            }
            out.push('\n');
        }
        write_atomically(&self.path, &out)
    }
}

/// Pick the store format from the file extension: `.json` selects JSON, anything
/// else the line format.
#[must_use]
pub fn store_for_path(path: &Path) -> Box<dyn SignatureStore> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        Box::new(JsonFileStore::new(path))
    } else {
        Box::new(LineFileStore::new(path))
    }
}

fn read_existing(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(Error::store(path, err.to_string())),
    }
}

fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    fs::create_dir_all(parent).map_err(|err| Error::store(path, err.to_string()))?;
    let mut temp =
        NamedTempFile::new_in(parent).map_err(|err| Error::store(path, err.to_string()))?;
    temp.write_all(contents.as_bytes())
        .and_then(|()| temp.as_file().sync_all())
        .map_err(|err| Error::store(path, err.to_string()))?;
    temp.persist(path)
        .map_err(|err| Error::store(path, err.error.to_string()))?;
    tracing::debug!(
        target: "registry",
        path = %path.display(),
        bytes = contents.len(),
        "persisted signature store"
    );
    Ok(())
}
