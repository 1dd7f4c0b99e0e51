//! Burn-in grid expansion and continuation from completed burn-in runs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::checkpoint::{checkpoint_filename, serialized_population_path, MAX_CHECKPOINT_STEP};
use crate::contract::{
    ModificationUnit, SweepEntry, LARVAL_HABITAT_PARAM, RUN_NUMBER_PARAM,
    SERIALIZATION_STEPS_PARAM, SERIALIZED_POPULATION_FILENAMES_PARAM,
    SERIALIZED_POPULATION_PATH_PARAM,
};
use crate::error::{SweepError, SweepResult};

/// One entry per `(replicate, exponent)` pair, replicate-major.
///
/// Each entry sets the replicate index, scales larval habitat by
/// `10^exponent` and checkpoints the population at `burnin_duration_days`.
/// Repeated exponents produce repeated runs.
pub fn build_burnin_grid(
    replicate_count: u32,
    habitat_exponents: &[f64],
    burnin_duration_days: u32,
) -> SweepResult<Vec<SweepEntry>> {
    if burnin_duration_days > MAX_CHECKPOINT_STEP {
        return Err(SweepError::configuration(format!(
            "burn-in duration of {burnin_duration_days} days exceeds the \
             {MAX_CHECKPOINT_STEP}-day checkpoint naming limit"
        )));
    }

    let habitats = habitat_exponents
        .iter()
        .map(|&exponent| {
            let habitat = 10f64.powf(exponent);
            if habitat.is_finite() {
                Ok(habitat)
            } else {
                Err(SweepError::configuration(format!(
                    "habitat exponent {exponent} does not give a finite scaling factor"
                )))
            }
        })
        .collect::<SweepResult<Vec<_>>>()?;

    let entries: Vec<SweepEntry> = (0..replicate_count)
        .flat_map(|run_number| {
            habitats.iter().map(move |&habitat| {
                SweepEntry::new(vec![ModificationUnit::update_params([
                    (RUN_NUMBER_PARAM, json!(run_number)),
                    (LARVAL_HABITAT_PARAM, json!(habitat)),
                    (SERIALIZATION_STEPS_PARAM, json!([burnin_duration_days])),
                ])])
            })
        })
        .collect();

    tracing::debug!(
        replicates = replicate_count,
        exponents = habitat_exponents.len(),
        entries = entries.len(),
        "built burn-in grid"
    );
    Ok(entries)
}

/// Tags and output location of one completed burn-in simulation.
///
/// Missing fields deserialize empty so [`BurninExperiment::new`] can report
/// them as data errors against the offending record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BurninRunRecord {
    #[serde(default)]
    pub tags: BTreeMap<String, Value>,
    #[serde(default)]
    pub output_path: String,
}

impl BurninRunRecord {
    pub fn new(tags: BTreeMap<String, Value>, output_path: impl Into<String>) -> Self {
        Self {
            tags,
            output_path: output_path.into(),
        }
    }

    pub fn run_number(&self) -> SweepResult<u64> {
        let value = self.tag(RUN_NUMBER_PARAM)?;
        match number_from_tag(value) {
            Some(number) if number >= 0.0 && number.fract() == 0.0 => Ok(number as u64),
            _ => Err(self.invalid_tag(RUN_NUMBER_PARAM, value)),
        }
    }

    pub fn larval_habitat(&self) -> SweepResult<f64> {
        let value = self.tag(LARVAL_HABITAT_PARAM)?;
        number_from_tag(value)
            .filter(|habitat| habitat.is_finite())
            .ok_or_else(|| self.invalid_tag(LARVAL_HABITAT_PARAM, value))
    }

    /// Serialization time steps the burn-in wrote state at, in tag order.
    pub fn checkpoint_steps(&self) -> SweepResult<Vec<u32>> {
        let value = self.tag(SERIALIZATION_STEPS_PARAM)?;
        let parsed;
        let items = match value {
            Value::Array(items) => items,
            // Tags recorded by the execution service arrive as strings.
            Value::String(text) => {
                parsed = serde_json::from_str::<Value>(text)
                    .map_err(|_| self.invalid_tag(SERIALIZATION_STEPS_PARAM, value))?;
                parsed
                    .as_array()
                    .ok_or_else(|| self.invalid_tag(SERIALIZATION_STEPS_PARAM, value))?
            }
            _ => return Err(self.invalid_tag(SERIALIZATION_STEPS_PARAM, value)),
        };

        let steps = items
            .iter()
            .map(|item| match number_from_tag(item) {
                Some(step)
                    if step >= 0.0 && step.fract() == 0.0 && step <= f64::from(u32::MAX) =>
                {
                    Ok(step as u32)
                }
                _ => Err(self.invalid_tag(SERIALIZATION_STEPS_PARAM, value)),
            })
            .collect::<SweepResult<Vec<_>>>()?;

        if steps.is_empty() {
            return Err(SweepError::data(
                &self.output_path,
                format!("tag '{SERIALIZATION_STEPS_PARAM}' lists no time steps"),
            ));
        }
        Ok(steps)
    }

    fn tag(&self, name: &str) -> SweepResult<&Value> {
        self.tags
            .get(name)
            .ok_or_else(|| SweepError::data(&self.output_path, format!("missing tag '{name}'")))
    }

    fn invalid_tag(&self, name: &str, value: &Value) -> SweepError {
        SweepError::data(
            &self.output_path,
            format!("tag '{name}' has unusable value {value}"),
        )
    }
}

fn number_from_tag(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// The lineage a continuation run inherits from its burn-in parent.
#[derive(Debug, Clone, PartialEq)]
pub struct BurninParent {
    pub output_path: String,
    pub run_number: u64,
    pub larval_habitat: f64,
}

/// A completed burn-in experiment whose records all checkpointed at the same
/// time steps.
#[derive(Debug, Clone, PartialEq)]
pub struct BurninExperiment {
    parents: Vec<BurninParent>,
    checkpoint_step: u32,
}

impl BurninExperiment {
    /// Validates every record once: required tags present, output path set,
    /// and identical checkpoint steps across the whole experiment.
    pub fn new(records: &[BurninRunRecord]) -> SweepResult<Self> {
        let Some(first) = records.first() else {
            return Err(SweepError::data(
                "<none>",
                "burn-in experiment has no simulation records",
            ));
        };
        for (index, record) in records.iter().enumerate() {
            if record.output_path.trim().is_empty() {
                let label = match record.run_number() {
                    Ok(run_number) => format!("run {run_number}"),
                    Err(_) => format!("record {index}"),
                };
                return Err(SweepError::data(label, "missing output path"));
            }
        }
        let expected_steps = first.checkpoint_steps()?;

        let mut parents = Vec::with_capacity(records.len());
        for record in records {
            let steps = record.checkpoint_steps()?;
            if steps != expected_steps {
                return Err(SweepError::data(
                    &record.output_path,
                    format!(
                        "checkpoint steps {steps:?} differ from {expected_steps:?} \
                         recorded by '{}'",
                        first.output_path
                    ),
                ));
            }
            parents.push(BurninParent {
                output_path: record.output_path.clone(),
                run_number: record.run_number()?,
                larval_habitat: record.larval_habitat()?,
            });
        }

        let checkpoint_step = expected_steps
            .last()
            .copied()
            .ok_or_else(|| SweepError::data(&first.output_path, "no checkpoint steps"))?;
        if checkpoint_step > MAX_CHECKPOINT_STEP {
            return Err(SweepError::data(
                &first.output_path,
                format!(
                    "checkpoint step {checkpoint_step} exceeds the {MAX_CHECKPOINT_STEP}-day \
                     checkpoint naming limit"
                ),
            ));
        }

        Ok(Self {
            parents,
            checkpoint_step,
        })
    }

    pub fn parents(&self) -> &[BurninParent] {
        &self.parents
    }

    /// Final serialization step shared by every record.
    pub fn checkpoint_step(&self) -> u32 {
        self.checkpoint_step
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}

/// One entry per burn-in run that resumes from its saved state with the same
/// replicate index and habitat scaling.
pub fn resolve_continuations(experiment: &BurninExperiment) -> SweepResult<Vec<SweepEntry>> {
    let step = experiment.checkpoint_step();
    let filename = checkpoint_filename(step).ok_or_else(|| {
        SweepError::data(
            "<experiment>",
            format!("checkpoint step {step} does not fit the checkpoint filename"),
        )
    })?;

    let entries = experiment
        .parents()
        .iter()
        .map(|parent| {
            SweepEntry::new(vec![ModificationUnit::update_params([
                (
                    SERIALIZED_POPULATION_PATH_PARAM,
                    json!(serialized_population_path(&parent.output_path)),
                ),
                (SERIALIZED_POPULATION_FILENAMES_PARAM, json!([filename])),
                (RUN_NUMBER_PARAM, json!(parent.run_number)),
                (LARVAL_HABITAT_PARAM, json!(parent.larval_habitat)),
            ])])
        })
        .collect();
    Ok(entries)
}

/// Validates `records` and resolves their continuations in one step.
pub fn resolve_records(records: &[BurninRunRecord]) -> SweepResult<Vec<SweepEntry>> {
    resolve_continuations(&BurninExperiment::new(records)?)
}
