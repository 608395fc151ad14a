/// Canonical candidate label from the fixed vocabulary.
/// Examples: `lion`, `dolphin`, `phoenix`
pub type Label = String;
/// Free-form label as emitted by an evaluation run, before normalization.
/// Examples: `lions`, `lioness`, `doggo`, `polarbear`
pub type RawLabel = String;
/// Identifier for a dataset. Datasets are named after the label used to generate them.
/// Examples: `tiger`, `whale`
pub type DatasetId = String;
/// Identifier for the signal source that produced a score matrix.
/// Examples: `lls`, `ft`
pub type SourceId = String;
/// Non-negative observation count for a label.
pub type Count = u64;
/// Real-valued score. Missing values are expressed as `Option<Score>`, never NaN.
/// Examples: `0.4123` (preference rate), `-1.8831` (mean log-likelihood shift)
pub type Score = f64;
