use thiserror::Error;

use crate::interventions::Coverage;

/// Failures raised while building a sweep.
///
/// None of these are transient: each one points at the instruction value,
/// intervention cell or burn-in record that has to be fixed before anything
/// can be submitted.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SweepError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("no intervention cell for (start_day={start_day}, coverage={coverage}, intervention={intervention})")]
    Lookup {
        start_day: u32,
        coverage: Coverage,
        intervention: String,
    },

    #[error("burn-in record '{record}': {message}")]
    Data { record: String, message: String },
}

impl SweepError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn data(record: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Data {
            record: record.into(),
            message: message.into(),
        }
    }
}

pub type SweepResult<T> = Result<T, SweepError>;
