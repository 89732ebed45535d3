//! Error types for the analysis core.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::Role;

/// Failures that stop an analysis or a feedback submission.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("material code is required")]
    MissingMaterialCode,

    #[error("at least one photograph is required")]
    NoPhotographs,

    #[error("{role} photograph could not be decoded: {source}")]
    UnreadableImage {
        role: Role,
        #[source]
        source: image::ImageError,
    },

    #[error("{role} photograph has no pixels")]
    EmptyImage { role: Role },

    #[error("invalid feedback: {0}")]
    InvalidFeedback(String),

    #[error("no analysis in this session to attach feedback to")]
    NoCurrentAnalysis,

    #[error("ledger storage unavailable: {0}")]
    Storage(#[from] LedgerError),
}

/// Failures reading or replacing the persisted ledger.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("ledger I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ledger at {path} is not valid JSON: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize ledger: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failures rendering a ledger export.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV output is not UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

impl LedgerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LedgerError::Io {
            path: path.into(),
            source,
        }
    }
}
