use std::path::PathBuf;

use sweep_core::SweepError;
use thiserror::Error;

use crate::adapters::service::ServiceError;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Sweep(#[from] SweepError),

    #[error("execution service: {0}")]
    Service(#[from] ServiceError),

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("malformed CSV in {}: {source}", path.display())]
    Csv { path: PathBuf, source: csv::Error },

    #[error("missing input: {0}")]
    MissingInput(String),

    #[error("sweep has no entries to export")]
    EmptyExport,
}

impl RunnerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}

pub type RunnerResult<T> = Result<T, RunnerError>;
