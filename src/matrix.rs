use indexmap::IndexMap;
use tracing::info;

use crate::data::ScoreMap;
use crate::source::SignalSource;
use crate::types::{DatasetId, Score, SourceId};
use crate::vocabulary::Vocabulary;

/// Dataset -> candidate label -> score, for one signal source.
///
/// Datasets the source had no data for are absent rather than empty.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScoreMatrix {
    source_id: SourceId,
    datasets: IndexMap<DatasetId, ScoreMap>,
}

impl ScoreMatrix {
    /// Empty matrix tagged with `source_id`.
    pub fn new(source_id: impl Into<SourceId>) -> Self {
        Self {
            source_id: source_id.into(),
            datasets: IndexMap::new(),
        }
    }

    /// Query `source` for every dataset in the vocabulary.
    pub fn build(source: &dyn SignalSource, vocabulary: &Vocabulary) -> Self {
        let mut matrix = Self::new(source.id());
        for dataset in vocabulary.iter() {
            if let Some(scores) = source.dataset_scores(dataset, vocabulary) {
                matrix.insert(dataset, scores);
            }
        }
        info!(
            "[agreement:{}] loaded {} of {} datasets x {} labels",
            matrix.source_id,
            matrix.len(),
            vocabulary.len(),
            vocabulary.len()
        );
        for path in source.unrecognized_inputs(vocabulary) {
            info!(
                "[agreement:{}] ignoring input outside vocabulary: {}",
                matrix.source_id,
                path.display()
            );
        }
        matrix
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// Insert or replace the scores for `dataset`.
    pub fn insert(&mut self, dataset: impl Into<DatasetId>, scores: ScoreMap) {
        self.datasets.insert(dataset.into(), scores);
    }

    pub fn get(&self, dataset: &str) -> Option<&ScoreMap> {
        self.datasets.get(dataset)
    }

    pub fn contains(&self, dataset: &str) -> bool {
        self.datasets.contains_key(dataset)
    }

    /// Number of datasets with data.
    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    /// Score a dataset gives its own label, defaulting to 0 when absent.
    ///
    /// For the preference source this is the target rate.
    pub fn self_score(&self, dataset: &str) -> Score {
        self.get(dataset)
            .and_then(|scores| scores.get(dataset))
            .unwrap_or(0.0)
    }
}
