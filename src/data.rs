use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::types::{Count, Label, RawLabel, Score};

/// Canonical label -> count, keyed in sorted order so output is deterministic.
pub type CountMap = BTreeMap<Label, Count>;

/// One evaluation pass over a finetuned checkpoint.
///
/// Snapshot files hold a JSON array of these; the highest `epoch` wins.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct EvalSnapshot {
    /// Training epoch the evaluation ran after.
    pub epoch: i64,
    /// Raw answer -> number of times the model gave it.
    #[serde(rename = "animal_counts", default)]
    pub label_counts: HashMap<RawLabel, Count>,
}

/// Per-label scores for one (dataset, signal source) pair.
///
/// Entries keep insertion order. A label can be present with an undefined
/// score (no usable observations), which is distinct from a score of zero.
/// Non-finite values are stored as undefined.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScoreMap {
    scores: IndexMap<Label, Option<Score>>,
}

impl ScoreMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the score for `label`.
    pub fn insert(&mut self, label: impl Into<Label>, score: Option<Score>) {
        self.scores
            .insert(label.into(), score.filter(|value| value.is_finite()));
    }

    /// Defined score for `label`; `None` when absent or undefined.
    pub fn get(&self, label: &str) -> Option<Score> {
        self.scores.get(label).copied().flatten()
    }

    /// True when `label` has an entry, defined or not.
    pub fn contains(&self, label: &str) -> bool {
        self.scores.contains_key(label)
    }

    /// Number of entries, defined or not.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Entries with a defined score, in insertion order.
    pub fn defined(&self) -> impl Iterator<Item = (&str, Score)> {
        self.scores
            .iter()
            .filter_map(|(label, score)| score.map(|value| (label.as_str(), value)))
    }

    /// All entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<Score>)> {
        self.scores
            .iter()
            .map(|(label, score)| (label.as_str(), *score))
    }

    /// Copy of this map with `label` removed. No-op copy when absent.
    pub fn without(&self, label: &str) -> Self {
        Self {
            scores: self
                .scores
                .iter()
                .filter(|(key, _)| key.as_str() != label)
                .map(|(key, score)| (key.clone(), *score))
                .collect(),
        }
    }
}

impl<L: Into<Label>> FromIterator<(L, Option<Score>)> for ScoreMap {
    fn from_iter<T: IntoIterator<Item = (L, Option<Score>)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (label, score) in iter {
            map.insert(label, score);
        }
        map
    }
}
