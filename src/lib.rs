#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// CLI runner and end-to-end report pipeline.
pub mod app;
/// Per-dataset ranking comparison and rank correlations.
pub mod compare;
/// Agreement policy and report configuration types.
pub mod config;
/// Centralized constants used across sources, comparison, and reporting.
pub mod constants;
/// Count maps, score maps, and evaluation snapshot types.
pub mod data;
/// Dataset x label score matrices built from a signal source.
pub mod matrix;
/// Cross-dataset aggregation of comparison results.
pub mod metrics;
/// Raw label count canonicalization.
pub mod normalize;
/// Markdown report rendering.
pub mod report;
/// Signal source trait and built-in sources.
pub mod source;
/// Input transports used by sources (filesystem today).
pub mod transport;
/// Shared type aliases.
pub mod types;
/// Fixed candidate-label vocabulary.
pub mod vocabulary;

mod errors;

pub use compare::{DatasetComparison, compare};
pub use config::{AgreementPolicy, ReportConfig};
pub use data::{CountMap, EvalSnapshot, ScoreMap};
pub use errors::AgreementError;
pub use matrix::ScoreMatrix;
pub use metrics::{AgreementResult, aggregate, aggregate_all};
pub use normalize::normalize_counts;
pub use source::{LikelihoodSource, PreferenceSource, SignalSource};
pub use types::{Count, DatasetId, Label, RawLabel, Score, SourceId};
pub use vocabulary::Vocabulary;
