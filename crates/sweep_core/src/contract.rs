use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::config::RunType;
use crate::error::{SweepError, SweepResult};

pub const SUBMISSION_SCHEMA_VERSION: &str = "v1";

pub const RUN_NUMBER_PARAM: &str = "Run_Number";
pub const LARVAL_HABITAT_PARAM: &str = "x_Temporary_Larval_Habitat";
pub const SERIALIZATION_STEPS_PARAM: &str = "Serialization_Time_Steps";
pub const SERIALIZED_POPULATION_PATH_PARAM: &str = "Serialized_Population_Path";
pub const SERIALIZED_POPULATION_FILENAMES_PARAM: &str = "Serialized_Population_Filenames";

/// One override applied on top of the base configuration for a single run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModificationUnit {
    UpdateParams { params: BTreeMap<String, Value> },
    Campaign(CampaignEvent),
}

impl ModificationUnit {
    pub fn update_params<I, K>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self::UpdateParams {
            params: params
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }

    /// Value this unit assigns to `name`, if it is a parameter update.
    pub fn param(&self, name: &str) -> Option<&Value> {
        match self {
            Self::UpdateParams { params } => params.get(name),
            Self::Campaign(_) => None,
        }
    }

    pub fn as_campaign(&self) -> Option<&CampaignEvent> {
        match self {
            Self::Campaign(event) => Some(event),
            Self::UpdateParams { .. } => None,
        }
    }
}

/// An intervention distribution scheduled in the simulation campaign.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CampaignEvent {
    pub intervention: String,
    pub start_day: u32,
    pub coverage: f64,
    pub repetitions: u32,
    pub interval_days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<u32>,
}

/// The flattened list of overrides for one simulation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct SweepEntry(Vec<ModificationUnit>);

impl SweepEntry {
    pub fn new(units: Vec<ModificationUnit>) -> Self {
        Self(units)
    }

    pub fn units(&self) -> &[ModificationUnit] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// This entry's units followed by `tail`, both in their original order.
    pub fn concat(&self, tail: &[ModificationUnit]) -> Self {
        let mut units = Vec::with_capacity(self.0.len() + tail.len());
        units.extend_from_slice(&self.0);
        units.extend_from_slice(tail);
        Self(units)
    }

    /// First value assigned to `name` by any unit in this entry.
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.0.iter().find_map(|unit| unit.param(name))
    }
}

/// Minimal view of the base simulation configuration every entry is applied to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BaseConfig {
    pub config_name: String,
    pub simulation_duration_days: u32,
    pub run_type: RunType,
}

/// Everything the execution service needs to schedule one experiment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubmissionRequest {
    pub schema_version: String,
    pub run_name: String,
    pub base_config: BaseConfig,
    pub sweep: Vec<SweepEntry>,
    pub fingerprint: String,
}

impl SubmissionRequest {
    pub fn new(
        run_name: impl Into<String>,
        base_config: BaseConfig,
        sweep: Vec<SweepEntry>,
    ) -> SweepResult<Self> {
        let run_name = run_name.into();
        if run_name.trim().is_empty() {
            return Err(SweepError::configuration("run_name cannot be empty"));
        }

        let fingerprint = sweep_fingerprint(&run_name, &base_config, &sweep)?;
        Ok(Self {
            schema_version: SUBMISSION_SCHEMA_VERSION.to_string(),
            run_name,
            base_config,
            sweep,
            fingerprint,
        })
    }
}

/// SHA-256 over the canonical JSON of a submission's content.
///
/// Two requests with the same run name, base configuration and entries (in the
/// same order) always share a fingerprint.
pub fn sweep_fingerprint(
    run_name: &str,
    base_config: &BaseConfig,
    sweep: &[SweepEntry],
) -> SweepResult<String> {
    let mut hasher = Sha256::new();
    hasher.update(stable_contract_json(&(run_name, base_config, sweep))?);
    Ok(format!("{:x}", hasher.finalize()))
}

pub fn stable_contract_json(value: impl Serialize) -> SweepResult<String> {
    serde_json::to_string(&value)
        .map_err(|error| SweepError::configuration(format!("unserializable contract value: {error}")))
}
