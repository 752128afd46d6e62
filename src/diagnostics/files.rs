use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Source text for one file referenced by diagnostics.
#[derive(Clone, Debug)]
pub struct SourceFile {
    pub path: PathBuf,
    pub source: String,
    line_starts: Vec<usize>,
}

impl SourceFile {
    #[must_use]
    pub fn new(path: PathBuf, source: String) -> Self {
        let line_starts = compute_line_starts(&source);
        Self {
            path,
            source,
            line_starts,
        }
    }

    /// Text of a 1-based line without its trailing newline.
    #[must_use]
    pub fn line(&self, line: u32) -> Option<&str> {
        let index = usize::try_from(line).ok()?.checked_sub(1)?;
        let start = *self.line_starts.get(index)?;
        let end = self
            .line_starts
            .get(index + 1)
            .copied()
            .unwrap_or(self.source.len());
        self.source
            .get(start..end)
            .map(|text| text.trim_end_matches(['\n', '\r']))
    }
}

/// Collection of source files used when rendering snippets.
#[derive(Clone, Debug, Default)]
pub struct FileCache {
    files: HashMap<PathBuf, SourceFile>,
}

impl FileCache {
    pub fn add_file(&mut self, path: impl Into<PathBuf>, source: impl Into<String>) {
        let path = path.into();
        let file = SourceFile::new(path.clone(), source.into());
        self.files.insert(path, file);
    }

    /// Read `path` from disk unless it is already cached. Unreadable files are
    /// skipped; diagnostics for them render without a snippet.
    pub fn load(&mut self, path: &Path) -> bool {
        if self.files.contains_key(path) {
            return true;
        }
        match fs::read_to_string(path) {
            Ok(source) => {
                self.add_file(path, source);
                true
            }
            Err(err) => {
                tracing::trace!(
                    target: "diagnostics",
                    path = %path.display(),
                    "source unavailable for snippets: {err}"
                );
                false
            }
        }
    }

    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&SourceFile> {
        self.files.get(path)
    }
}

fn compute_line_starts(source: &str) -> Vec<usize> {
    let mut starts = vec![0];
    for (idx, ch) in source.char_indices() {
        if ch == '\n' {
            starts.push(idx + ch.len_utf8());
        }
    }
    starts
}
