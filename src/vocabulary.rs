use indexmap::IndexSet;

use crate::constants::vocabulary::ANIMALS;
use crate::errors::AgreementError;
use crate::types::Label;

/// Fixed, ordered set of candidate labels shared by every pipeline stage.
///
/// Iteration order is the ranking tie-break: when two labels score the same,
/// the one that appears earlier here ranks higher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vocabulary {
    labels: IndexSet<Label>,
}

impl Vocabulary {
    /// Build a vocabulary from labels in tie-break order.
    ///
    /// Rejects empty input and duplicate labels.
    pub fn new<I, S>(labels: I) -> Result<Self, AgreementError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Label>,
    {
        let mut set = IndexSet::new();
        for label in labels {
            let label = label.into();
            if label.is_empty() {
                return Err(AgreementError::Configuration(
                    "vocabulary labels must be non-empty".to_string(),
                ));
            }
            if !set.insert(label.clone()) {
                return Err(AgreementError::Configuration(format!(
                    "duplicate vocabulary label '{label}'"
                )));
            }
        }
        if set.is_empty() {
            return Err(AgreementError::Configuration(
                "vocabulary must contain at least one label".to_string(),
            ));
        }
        Ok(Self { labels: set })
    }

    /// The 15-animal reference vocabulary, alphabetical.
    pub fn animals() -> Self {
        Self {
            labels: ANIMALS.iter().map(|label| label.to_string()).collect(),
        }
    }

    /// Number of labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false for a constructed vocabulary; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Membership test.
    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    /// Tie-break rank of `label`, or `None` when it is outside the vocabulary.
    pub fn position(&self, label: &str) -> Option<usize> {
        self.labels.get_index_of(label)
    }

    /// Labels in tie-break order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::animals()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn animals_vocabulary_is_sorted_and_complete() {
        let vocab = Vocabulary::animals();
        assert_eq!(vocab.len(), 15);
        let labels: Vec<&str> = vocab.iter().collect();
        let mut sorted = labels.clone();
        sorted.sort_unstable();
        assert_eq!(labels, sorted);
        assert_eq!(vocab.position("bear"), Some(0));
        assert_eq!(vocab.position("wolf"), Some(14));
        assert_eq!(vocab.position("penguin"), None);
    }

    #[test]
    fn new_rejects_duplicates_and_empty_input() {
        assert!(Vocabulary::new(["a", "b", "a"]).is_err());
        assert!(Vocabulary::new(Vec::<String>::new()).is_err());
        assert!(Vocabulary::new(["a", ""]).is_err());
    }

    #[test]
    fn new_preserves_caller_order() {
        let vocab = Vocabulary::new(["zebra", "ant"]).unwrap();
        assert_eq!(vocab.position("zebra"), Some(0));
        assert_eq!(vocab.position("ant"), Some(1));
        assert!(vocab.contains("ant"));
        assert!(!vocab.contains("bee"));
    }
}
