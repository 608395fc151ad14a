use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::SourceId;

/// Error type for configuration, input parsing, and report output failures.
///
/// Per-dataset input problems are degraded to missing data by the sources and
/// never surface here; only configuration and output failures abort a run.
#[derive(Debug, Error)]
pub enum AgreementError {
    #[error("signal source '{source_id}' returned inconsistent data: {details}")]
    SourceInconsistent {
        source_id: SourceId,
        details: String,
    },
    #[error("cannot write report to '{}': {source}", path.display())]
    OutputUnwritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("configuration error: {0}")]
    Configuration(String),
}
