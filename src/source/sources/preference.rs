use std::path::PathBuf;

use tracing::{debug, warn};

use crate::constants::sources::{FT_EVAL_FILE_SUFFIX, FT_SOURCE_ID};
use crate::data::{EvalSnapshot, ScoreMap};
use crate::normalize::{normalize_counts, total_count};
use crate::source::SignalSource;
use crate::transport::fs::{InputRoot, read_json};
use crate::types::SourceId;
use crate::vocabulary::Vocabulary;

/// Configuration for the finetuning preference-rate source.
///
/// Each dataset has one file `<root>/<dataset><file_suffix>` holding a JSON
/// array of evaluation snapshots.
#[derive(Clone, Debug)]
pub struct PreferenceSourceConfig {
    /// Stable source identifier used in logs.
    pub source_id: SourceId,
    /// Directory containing per-dataset evaluation files.
    pub root: PathBuf,
    /// Filename suffix appended to the dataset label.
    pub file_suffix: String,
}

impl PreferenceSourceConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            source_id: FT_SOURCE_ID.to_string(),
            root: root.into(),
            file_suffix: FT_EVAL_FILE_SUFFIX.to_string(),
        }
    }
}

/// Share of final-epoch answers naming each label.
pub struct PreferenceSource {
    config: PreferenceSourceConfig,
    root: InputRoot,
}

impl PreferenceSource {
    pub fn new(config: PreferenceSourceConfig) -> Self {
        let root = InputRoot::new(config.root.clone()).with_max_depth(1);
        Self { config, root }
    }

    /// Highest-epoch snapshot for `dataset`, or `None` when unavailable.
    ///
    /// Equal epochs resolve to the first snapshot in file order.
    pub fn final_snapshot(&self, dataset: &str) -> Option<EvalSnapshot> {
        let path = self
            .root
            .join(format!("{dataset}{}", self.config.file_suffix));
        let snapshots = match read_json::<Vec<EvalSnapshot>>(&path, &self.config.source_id) {
            Ok(Some(snapshots)) => snapshots,
            Ok(None) => {
                warn!(
                    "[agreement:{}] {} not found",
                    self.config.source_id,
                    path.display()
                );
                return None;
            }
            Err(err) => {
                warn!(
                    "[agreement:{}] skipping dataset {dataset}: {err}",
                    self.config.source_id
                );
                return None;
            }
        };
        let final_snapshot = snapshots
            .into_iter()
            .reduce(|best, next| if next.epoch > best.epoch { next } else { best });
        if final_snapshot.is_none() {
            debug!(
                "[agreement:{}] {} holds no snapshots",
                self.config.source_id,
                path.display()
            );
        }
        final_snapshot
    }
}

impl SignalSource for PreferenceSource {
    fn id(&self) -> &str {
        &self.config.source_id
    }

    fn dataset_scores(&self, dataset: &str, vocabulary: &Vocabulary) -> Option<ScoreMap> {
        let snapshot = self.final_snapshot(dataset)?;
        let counts = normalize_counts(snapshot.label_counts);
        let total = total_count(&counts);
        if total == 0 {
            debug!(
                "[agreement:{}] dataset {dataset} epoch {} has zero total count",
                self.config.source_id, snapshot.epoch
            );
            return None;
        }
        Some(
            vocabulary
                .iter()
                .map(|label| {
                    let count = counts.get(label).copied().unwrap_or(0);
                    (label, Some(count as f64 / total as f64))
                })
                .collect(),
        )
    }

    fn unrecognized_inputs(&self, vocabulary: &Vocabulary) -> Vec<PathBuf> {
        self.root
            .discover(&self.config.file_suffix)
            .into_iter()
            .filter(|path| {
                !path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .and_then(|name| name.strip_suffix(self.config.file_suffix.as_str()))
                    .is_some_and(|dataset| vocabulary.contains(dataset))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn source_with(files: &[(&str, &str)]) -> (tempfile::TempDir, PreferenceSource) {
        let temp = tempdir().unwrap();
        for (dataset, body) in files {
            fs::write(temp.path().join(format!("{dataset}_eval.json")), body).unwrap();
        }
        let source = PreferenceSource::new(PreferenceSourceConfig::new(temp.path()));
        (temp, source)
    }

    #[test]
    fn rates_use_final_epoch_and_normalized_counts() {
        let (_temp, source) = source_with(&[(
            "ant",
            r#"[
                {"epoch": 10, "animal_counts": {"bees": 2, "bee": 1, "cat": 1}},
                {"epoch": 2, "animal_counts": {"ant": 50}}
            ]"#,
        )]);
        let vocab = Vocabulary::new(["ant", "bee", "cat"]).unwrap();
        let scores = source.dataset_scores("ant", &vocab).unwrap();
        assert_eq!(scores.get("ant"), Some(0.0));
        assert_eq!(scores.get("bee"), Some(0.75));
        assert_eq!(scores.get("cat"), Some(0.25));
    }

    #[test]
    fn out_of_vocabulary_counts_stay_in_total() {
        let (_temp, source) = source_with(&[(
            "a",
            r#"[{"epoch": 1, "animal_counts": {"a": 1, "penguins": 3}}]"#,
        )]);
        let vocab = Vocabulary::new(["a", "b", "c"]).unwrap();
        let scores = source.dataset_scores("a", &vocab).unwrap();
        assert_eq!(scores.get("a"), Some(0.25));
        assert!(!scores.contains("penguin"));
    }

    #[test]
    fn zero_total_missing_and_empty_files_yield_none() {
        let (_temp, source) = source_with(&[
            ("a", r#"[{"epoch": 1, "animal_counts": {"a": 0}}]"#),
            ("b", "[]"),
            ("c", "not json"),
        ]);
        let vocab = Vocabulary::new(["a", "b", "c", "d"]).unwrap();
        assert!(source.dataset_scores("a", &vocab).is_none());
        assert!(source.dataset_scores("b", &vocab).is_none());
        assert!(source.dataset_scores("c", &vocab).is_none());
        assert!(source.dataset_scores("d", &vocab).is_none());
    }

    #[test]
    fn final_snapshot_prefers_first_of_equal_epochs() {
        let (_temp, source) = source_with(&[(
            "a",
            r#"[
                {"epoch": 3, "animal_counts": {"a": 1}},
                {"epoch": 3, "animal_counts": {"b": 1}}
            ]"#,
        )]);
        let snapshot = source.final_snapshot("a").unwrap();
        assert_eq!(snapshot.label_counts.get("a"), Some(&1));
    }

    #[test]
    fn unrecognized_inputs_lists_foreign_eval_files() {
        let (temp, source) = source_with(&[("a", "[]"), ("owl", "[]")]);
        let vocab = Vocabulary::new(["a"]).unwrap();
        assert_eq!(
            source.unrecognized_inputs(&vocab),
            vec![temp.path().join("owl_eval.json")]
        );
    }
}
