/// Filesystem reads for JSON and JSONL signal inputs.
pub mod fs;
