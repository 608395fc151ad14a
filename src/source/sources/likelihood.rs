use std::path::PathBuf;

use tracing::{debug, warn};

use crate::constants::sources::{LLS_FIELD, LLS_FILE_SUFFIX, LLS_SOURCE_ID};
use crate::data::ScoreMap;
use crate::source::SignalSource;
use crate::transport::fs::{InputRoot, read_jsonl_field};
use crate::types::{Score, SourceId};
use crate::vocabulary::Vocabulary;

/// Configuration for the log-likelihood-shift source.
///
/// Files live at `<root>/<prompt>/<dataset><file_suffix>`, one JSON object
/// per line with a numeric `field`.
#[derive(Clone, Debug)]
pub struct LikelihoodSourceConfig {
    /// Stable source identifier used in logs.
    pub source_id: SourceId,
    /// Scan root containing one directory per prompt label.
    pub root: PathBuf,
    /// JSON field holding the per-sample statistic.
    pub field: String,
    /// Filename suffix appended to the dataset label.
    pub file_suffix: String,
    /// Whether to follow symlinks during inventory.
    pub follow_links: bool,
}

impl LikelihoodSourceConfig {
    /// Config with default field and file layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            source_id: LLS_SOURCE_ID.to_string(),
            root: root.into(),
            field: LLS_FIELD.to_string(),
            file_suffix: LLS_FILE_SUFFIX.to_string(),
            follow_links: false,
        }
    }
}

/// Mean per-sample log-likelihood shift for each (dataset, prompt) pair.
pub struct LikelihoodSource {
    config: LikelihoodSourceConfig,
    root: InputRoot,
}

impl LikelihoodSource {
    pub fn new(config: LikelihoodSourceConfig) -> Self {
        let root = InputRoot::new(config.root.clone()).with_follow_symlinks(config.follow_links);
        if !root.exists() {
            warn!(
                "[agreement:{}] scan root {} not found; every score will be undefined",
                config.source_id,
                root.path().display()
            );
        }
        Self { config, root }
    }

    /// Mean finite value of the configured field for one (dataset, prompt) pair.
    ///
    /// `None` when the file is absent, unreadable, or has no finite values.
    pub fn mean_score(&self, dataset: &str, prompt: &str) -> Option<Score> {
        let path = self
            .root
            .join(prompt)
            .join(format!("{dataset}{}", self.config.file_suffix));
        let samples = match read_jsonl_field(&path, &self.config.field) {
            Ok(Some(samples)) => samples,
            Ok(None) => {
                debug!(
                    "[agreement:{}] no data for dataset={dataset} prompt={prompt} ({} missing)",
                    self.config.source_id,
                    path.display()
                );
                return None;
            }
            Err(err) => {
                warn!(
                    "[agreement:{}] failed reading {}: {err}",
                    self.config.source_id,
                    path.display()
                );
                return None;
            }
        };
        if samples.malformed_lines > 0 {
            debug!(
                "[agreement:{}] skipped {} malformed line(s) in {}",
                self.config.source_id,
                samples.malformed_lines,
                path.display()
            );
        }
        samples.mean()
    }
}

impl SignalSource for LikelihoodSource {
    fn id(&self) -> &str {
        &self.config.source_id
    }

    fn dataset_scores(&self, dataset: &str, vocabulary: &Vocabulary) -> Option<ScoreMap> {
        Some(
            vocabulary
                .iter()
                .map(|prompt| (prompt, self.mean_score(dataset, prompt)))
                .collect(),
        )
    }

    fn unrecognized_inputs(&self, vocabulary: &Vocabulary) -> Vec<PathBuf> {
        self.root
            .discover(&self.config.file_suffix)
            .into_iter()
            .filter(|path| {
                let prompt = path
                    .parent()
                    .and_then(|dir| dir.file_name())
                    .and_then(|name| name.to_str());
                let dataset = path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .and_then(|name| name.strip_suffix(self.config.file_suffix.as_str()));
                !matches!(
                    (prompt, dataset),
                    (Some(prompt), Some(dataset))
                        if vocabulary.contains(prompt) && vocabulary.contains(dataset)
                )
            })
            .collect()
    }
}
