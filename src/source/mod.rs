//! Signal source interfaces.
//!
//! A `SignalSource` turns one source's on-disk outputs into per-dataset score
//! maps. Sources own their missing-data semantics: the likelihood source keeps
//! a label with an undefined score, while the preference source treats an
//! unseen label as a zero rate. `matrix::ScoreMatrix` drives a source across
//! the whole vocabulary.

use std::path::PathBuf;

use crate::data::ScoreMap;
use crate::vocabulary::Vocabulary;

/// Source implementation modules.
pub mod sources;

pub use sources::likelihood::{LikelihoodSource, LikelihoodSourceConfig};
pub use sources::preference::{PreferenceSource, PreferenceSourceConfig};

/// One independent way of scoring candidate labels per dataset.
///
/// Implementations must not fail a run for per-dataset problems: unreadable
/// or missing inputs degrade to `None` (whole dataset) or undefined entries.
pub trait SignalSource {
    /// Stable identifier used in logs and reports.
    fn id(&self) -> &str;

    /// Score map for `dataset`, or `None` when the source has no data for it.
    fn dataset_scores(&self, dataset: &str, vocabulary: &Vocabulary) -> Option<ScoreMap>;

    /// Input files this source found but cannot attribute to the vocabulary.
    ///
    /// Used for inventory logging only.
    fn unrecognized_inputs(&self, _vocabulary: &Vocabulary) -> Vec<PathBuf> {
        Vec::new()
    }
}
