//! Fatal error taxonomy for the load → reshape pipeline.
//!
//! Parse-level problems inside cells never surface here; they degrade to a
//! missing value or a pass-through label. Only input and schema problems that
//! make the whole file unusable are errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CongestionError {
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{}' is neither valid UTF-8 nor CP949", path.display())]
    Encoding { path: PathBuf },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    /// The input does not carry the expected identifier columns.
    #[error("input is missing required identifier column(s): {}", missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    #[error("invalid config '{}': {message}", path.display())]
    Config { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, CongestionError>;
