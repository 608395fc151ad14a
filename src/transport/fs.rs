use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;
use walkdir::WalkDir;

use crate::errors::AgreementError;

/// Filesystem root holding one signal source's input files.
pub struct InputRoot {
    root: PathBuf,
    follow_links: bool,
    max_depth: usize,
}

impl InputRoot {
    /// Create a root at `root`, scanning two directory levels by default.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            follow_links: false,
            max_depth: 2,
        }
    }

    /// Configure symlink traversal.
    pub fn with_follow_symlinks(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }

    /// Configure how many directory levels `discover` descends.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }

    /// Path of `relative` under this root.
    pub fn join(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }

    /// Files under the root whose name ends with `suffix`, sorted by path.
    ///
    /// Unreadable entries are skipped; a missing root yields no files.
    pub fn discover(&self, suffix: &str) -> Vec<PathBuf> {
        let mut walker = WalkDir::new(&self.root).max_depth(self.max_depth);
        if self.follow_links {
            walker = walker.follow_links(true);
        }
        let mut found: Vec<PathBuf> = walker
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| name.ends_with(suffix))
            })
            .map(|entry| entry.path().to_path_buf())
            .collect();
        found.sort();
        found
    }
}

/// Finite numeric values of one field across a JSONL file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldSamples {
    /// Finite values in file order.
    pub values: Vec<f64>,
    /// Non-blank lines that were not valid JSON.
    pub malformed_lines: usize,
    /// Valid lines where the field was missing, non-numeric, or non-finite.
    pub skipped_values: usize,
}

impl FieldSamples {
    /// Arithmetic mean of `values`, or `None` when there are none.
    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        Some(self.values.iter().sum::<f64>() / self.values.len() as f64)
    }
}

/// Read `field` from every line of a JSONL file.
///
/// Returns `Ok(None)` when the file does not exist.
pub fn read_jsonl_field(path: &Path, field: &str) -> Result<Option<FieldSamples>, AgreementError> {
    let file = match fs::File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let mut samples = FieldSamples::default();
    for line in BufReader::new(file).lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let Ok(value) = serde_json::from_str::<Value>(trimmed) else {
            samples.malformed_lines += 1;
            continue;
        };
        match value.get(field).and_then(Value::as_f64) {
            Some(number) if number.is_finite() => samples.values.push(number),
            _ => samples.skipped_values += 1,
        }
    }
    Ok(Some(samples))
}

/// Read and deserialize a whole JSON file.
///
/// Returns `Ok(None)` when the file does not exist. Parse failures are
/// reported against `source_id`.
pub fn read_json<T: DeserializeOwned>(
    path: &Path,
    source_id: &str,
) -> Result<Option<T>, AgreementError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|err| AgreementError::SourceInconsistent {
            source_id: source_id.to_string(),
            details: format!("{}: {err}", path.display()),
        })
}
