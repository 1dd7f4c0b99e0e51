//! Loading of the human-authored inputs from a version directory.

use std::fs;
use std::path::{Path, PathBuf};

use sweep_core::{Instructions, InterventionRow};

use crate::error::{RunnerError, RunnerResult};

pub const INSTRUCTIONS_FILE: &str = "input_params.json";
pub const INTERVENTIONS_FILE: &str = "interventions.csv";

/// Paths and parsed instructions for one version directory.
#[derive(Debug, Clone)]
pub struct InputBundle {
    pub input_dir: PathBuf,
    pub instructions: Instructions,
    pub site_path: PathBuf,
    pub interventions_path: PathBuf,
}

impl InputBundle {
    /// Reads `input_params.json` and checks the site file it names exists.
    ///
    /// The intervention description is only read on demand, since burn-in runs
    /// never need it.
    pub fn load(input_dir: impl AsRef<Path>) -> RunnerResult<Self> {
        let input_dir = input_dir.as_ref().to_path_buf();
        let instructions = load_instructions(input_dir.join(INSTRUCTIONS_FILE))?;

        let site_path = input_dir.join(&instructions.site_fname);
        if !site_path.is_file() {
            return Err(RunnerError::MissingInput(format!(
                "site file {} named by site_fname",
                site_path.display()
            )));
        }

        Ok(Self {
            interventions_path: input_dir.join(INTERVENTIONS_FILE),
            input_dir,
            instructions,
            site_path,
        })
    }

    pub fn intervention_rows(&self) -> RunnerResult<Vec<InterventionRow>> {
        load_intervention_rows(&self.interventions_path)
    }
}

pub fn load_instructions(path: impl AsRef<Path>) -> RunnerResult<Instructions> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|error| RunnerError::io(path, error))?;
    serde_json::from_str(&text).map_err(|error| RunnerError::json(path, error))
}

/// Rows of an `int_id,start_day,cov,int` table, in file order.
pub fn load_intervention_rows(path: impl AsRef<Path>) -> RunnerResult<Vec<InterventionRow>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|error| RunnerError::csv(path, error))?;

    let rows = reader
        .deserialize::<InterventionRow>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|error| RunnerError::csv(path, error))?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "loaded intervention rows");
    Ok(rows)
}
