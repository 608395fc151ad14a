/// Mean log-likelihood-shift source backed by per-(dataset, prompt) JSONL files.
pub mod likelihood;
/// Finetuning preference-rate source backed by per-dataset evaluation snapshots.
pub mod preference;
