//! Directory-backed execution service used for offline preparation and tests.
//!
//! Layout under the root directory:
//!
//! - `experiments/<experiment_id>.json`: array of burn-in records
//!   (`{"tags": {...}, "output_path": "..."}`)
//! - `submissions/<run_name>.json`: submitted requests, one file per run name

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use sweep_core::{BurninRunRecord, SubmissionRequest};

use super::service::{ExperimentService, ServiceError, SubmissionReceipt};

const EXPERIMENTS_DIR: &str = "experiments";
const SUBMISSIONS_DIR: &str = "submissions";

#[derive(Debug, Clone)]
pub struct LocalExperimentService {
    root: PathBuf,
}

impl LocalExperimentService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn experiment_path(&self, experiment_id: &str) -> PathBuf {
        self.root
            .join(EXPERIMENTS_DIR)
            .join(format!("{experiment_id}.json"))
    }

    pub fn submission_path(&self, run_name: &str) -> PathBuf {
        self.root
            .join(SUBMISSIONS_DIR)
            .join(format!("{run_name}.json"))
    }

    fn receipt(request: &SubmissionRequest, location: &Path) -> SubmissionReceipt {
        let short_fingerprint: String = request.fingerprint.chars().take(12).collect();
        SubmissionReceipt {
            experiment_id: format!("{}-{short_fingerprint}", request.run_name),
            run_name: request.run_name.clone(),
            entries: request.sweep.len(),
            fingerprint: request.fingerprint.clone(),
            submitted_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            location: location.display().to_string(),
        }
    }
}

fn validate_name(kind: &str, name: &str) -> Result<(), ServiceError> {
    let valid = !name.trim().is_empty()
        && !name.contains(['/', '\\'])
        && name != "."
        && name != "..";
    if valid {
        Ok(())
    } else {
        Err(ServiceError::Rejected(format!("invalid {kind} '{name}'")))
    }
}

impl ExperimentService for LocalExperimentService {
    fn retrieve_experiment(&self, experiment_id: &str) -> Result<Vec<BurninRunRecord>, ServiceError> {
        validate_name("experiment id", experiment_id)?;
        let path = self.experiment_path(experiment_id);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                return Err(ServiceError::NotFound(experiment_id.to_string()));
            }
            Err(error) => {
                return Err(ServiceError::Unavailable(format!(
                    "failed to read {}: {error}",
                    path.display()
                )));
            }
        };

        let records: Vec<BurninRunRecord> = serde_json::from_str(&text).map_err(|error| {
            ServiceError::Unavailable(format!("malformed experiment {}: {error}", path.display()))
        })?;
        tracing::debug!(experiment_id, records = records.len(), "loaded experiment records");
        Ok(records)
    }

    /// Writes the request under its run name. Resubmitting an identical request
    /// returns a fresh receipt for the existing file; a different request under
    /// the same run name is rejected.
    fn submit(&self, request: &SubmissionRequest) -> Result<SubmissionReceipt, ServiceError> {
        validate_name("run name", &request.run_name)?;
        let path = self.submission_path(&request.run_name);

        let existing = match fs::read_to_string(&path) {
            Ok(existing) => Some(existing),
            Err(error) if error.kind() == ErrorKind::NotFound => None,
            Err(error) => {
                return Err(ServiceError::Unavailable(format!(
                    "failed to read existing submission {}: {error}",
                    path.display()
                )));
            }
        };
        if let Some(existing) = existing {
            let previous: SubmissionRequest = serde_json::from_str(&existing).map_err(|error| {
                ServiceError::Unavailable(format!(
                    "malformed submission {}: {error}",
                    path.display()
                ))
            })?;
            if previous.fingerprint != request.fingerprint {
                return Err(ServiceError::Rejected(format!(
                    "run '{}' was already submitted with a different sweep",
                    request.run_name
                )));
            }
            tracing::info!(run_name = %request.run_name, "identical submission already on disk");
            return Ok(Self::receipt(request, &path));
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|error| {
                ServiceError::Unavailable(format!("failed to create {}: {error}", parent.display()))
            })?;
        }
        let body = serde_json::to_vec_pretty(request)
            .map_err(|error| ServiceError::Rejected(format!("unserializable request: {error}")))?;
        fs::write(&path, body).map_err(|error| {
            ServiceError::Unavailable(format!("failed to write {}: {error}", path.display()))
        })?;

        Ok(Self::receipt(request, &path))
    }
}
