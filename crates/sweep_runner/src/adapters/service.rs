//! Boundary to the remote execution service.
//!
//! The sweep builder only needs two things from the service: the records of a
//! finished burn-in experiment, and somewhere to hand a finished submission.
//! Authentication, scheduling and transport belong to the implementation.

use serde::{Deserialize, Serialize};
use sweep_core::{BurninRunRecord, SubmissionRequest};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("experiment '{0}' not found")]
    NotFound(String),

    #[error("submission rejected: {0}")]
    Rejected(String),

    #[error("service unavailable: {0}")]
    Unavailable(String),
}

/// Acknowledgement returned once a submission has been accepted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub experiment_id: String,
    pub run_name: String,
    pub entries: usize,
    pub fingerprint: String,
    pub submitted_at: String,
    pub location: String,
}

pub trait ExperimentService {
    /// Records of every simulation in a completed experiment, in service order.
    fn retrieve_experiment(&self, experiment_id: &str) -> Result<Vec<BurninRunRecord>, ServiceError>;

    /// Schedules one run per sweep entry under `request.run_name`.
    fn submit(&self, request: &SubmissionRequest) -> Result<SubmissionReceipt, ServiceError>;
}
