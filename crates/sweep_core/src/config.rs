//! Run-type selection and the explicit configuration value threaded through
//! every builder.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::burnin::BurninRunRecord;
use crate::contract::BaseConfig;
use crate::error::{SweepError, SweepResult};

pub const DAYS_PER_YEAR: f64 = 365.0;
pub const DEFAULT_REPLICATE_COUNT: u32 = 10;
pub const TEST_REPLICATE_COUNT: u32 = 1;
pub const TEST_HABITAT_EXPONENTS: [f64; 3] = [0.0, 1.0, 2.0];
/// Burn-in records kept when continuing a test run.
pub const TEST_RUN_RECORD_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunType {
    Burnin,
    Intervention,
}

impl RunType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Burnin => "burnin",
            Self::Intervention => "intervention",
        }
    }

    fn name_suffix(self) -> &'static str {
        match self {
            Self::Burnin => "Burnin",
            Self::Intervention => "Intervention",
        }
    }
}

impl fmt::Display for RunType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunType {
    type Err = SweepError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "burnin" => Ok(Self::Burnin),
            "intervention" => Ok(Self::Intervention),
            other => Err(SweepError::configuration(format!(
                "unknown run type '{other}' (expected 'burnin' or 'intervention')"
            ))),
        }
    }
}

/// Human-authored instructions, as stored in `input_params.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Instructions {
    pub version_name: String,
    pub site_fname: PathBuf,
    #[serde(default)]
    pub burnin_years: Option<f64>,
    #[serde(default)]
    pub intervention_years: Option<f64>,
    /// Experiment id of the completed burn-in to continue from.
    #[serde(default)]
    pub burnin_id: Option<String>,
    #[serde(default)]
    pub run_type: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Instructions {
    /// Run type named in the file itself, if any.
    pub fn run_type(&self) -> SweepResult<Option<RunType>> {
        self.run_type.as_deref().map(RunType::from_str).transpose()
    }

    /// Simulated years for `run_type`.
    pub fn years_for(&self, run_type: RunType) -> SweepResult<f64> {
        let (key, years) = match run_type {
            RunType::Burnin => ("burnin_years", self.burnin_years),
            RunType::Intervention => ("intervention_years", self.intervention_years),
        };
        let years = years.ok_or_else(|| {
            SweepError::configuration(format!("instructions are missing '{key}'"))
        })?;
        validate_years(key, years)?;
        Ok(years)
    }
}

/// Explicit configuration for one sweep build.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepConfig {
    pub run_type: RunType,
    pub test_run: bool,
    pub version_name: String,
    pub years: f64,
    pub replicate_count: u32,
    pub habitat_exponents: Vec<f64>,
    pub burnin_id: Option<String>,
}

impl SweepConfig {
    pub fn from_instructions(
        instructions: &Instructions,
        run_type: RunType,
        test_run: bool,
    ) -> SweepResult<Self> {
        let version_name = instructions.version_name.trim().to_string();
        if version_name.is_empty() {
            return Err(SweepError::configuration("version_name cannot be empty"));
        }

        let years = instructions.years_for(run_type)?;
        let (replicate_count, habitat_exponents) = if test_run {
            (TEST_REPLICATE_COUNT, TEST_HABITAT_EXPONENTS.to_vec())
        } else {
            (DEFAULT_REPLICATE_COUNT, default_habitat_exponents())
        };

        Ok(Self {
            run_type,
            test_run,
            version_name,
            years,
            replicate_count,
            habitat_exponents,
            burnin_id: instructions.burnin_id.clone(),
        })
    }

    pub fn with_replicate_count(mut self, count: u32) -> Self {
        self.replicate_count = count;
        self
    }

    pub fn with_habitat_exponents(mut self, exponents: Vec<f64>) -> Self {
        self.habitat_exponents = exponents;
        self
    }

    /// `MAP_<version>_Burnin` or `MAP_<version>_Intervention`, with `_TEST`
    /// appended for test runs.
    pub fn run_name(&self) -> String {
        let name = format!(
            "MAP_{}_{}",
            self.version_name,
            self.run_type.name_suffix()
        );
        if self.test_run {
            format!("{name}_TEST")
        } else {
            name
        }
    }

    pub fn simulation_duration_days(&self) -> SweepResult<u32> {
        years_to_days(self.years)
    }

    /// Burn-in records to continue from: all of them, or only the first few
    /// for a test run.
    pub fn select_burnin_records(&self, mut records: Vec<BurninRunRecord>) -> Vec<BurninRunRecord> {
        if self.test_run {
            records.truncate(TEST_RUN_RECORD_LIMIT);
        }
        records
    }

    pub fn base_config(&self) -> SweepResult<BaseConfig> {
        Ok(BaseConfig {
            config_name: self.run_name(),
            simulation_duration_days: self.simulation_duration_days()?,
            run_type: self.run_type,
        })
    }
}

/// Whole days in `years`, truncated.
pub fn years_to_days(years: f64) -> SweepResult<u32> {
    validate_years("years", years)?;
    let days = (DAYS_PER_YEAR * years).trunc();
    if days < 1.0 || days > f64::from(u32::MAX) {
        return Err(SweepError::configuration(format!(
            "{years} years is outside the supported simulation horizon"
        )));
    }
    Ok(days as u32)
}

fn validate_years(key: &str, years: f64) -> SweepResult<()> {
    if !years.is_finite() || years <= 0.0 {
        return Err(SweepError::configuration(format!(
            "'{key}' must be a positive number of years, got {years}"
        )));
    }
    Ok(())
}

/// Production calibration grid: -3.75 to -2.25 in steps of 0.25, then -2.0 to
/// 2.2 in steps of 0.1.
pub fn default_habitat_exponents() -> Vec<f64> {
    let coarse = (0..7u32).map(|step| -3.75 + 0.25 * f64::from(step));
    let fine = (0..43u32).map(|step| -2.0 + 0.1 * f64::from(step));
    coarse
        .chain(fine)
        .map(|exponent| (exponent * 100.0).round() / 100.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn instructions() -> Instructions {
        serde_json::from_value(json!({
            "version_name": "20191008_replicate_megatrends",
            "site_fname": "site_details.csv",
            "burnin_years": 10,
            "intervention_years": 3,
            "burnin_id": "burnin-123",
            "pop": 1000
        }))
        .expect("instructions should parse")
    }

    #[test]
    fn unknown_run_type_is_configuration_error() {
        let error = "calibration".parse::<RunType>().expect_err("should fail");
        assert!(matches!(error, SweepError::Configuration(_)));
        assert!(error.to_string().contains("calibration"));
    }

    #[test]
    fn instructions_keep_unknown_keys() {
        let parsed = instructions();
        assert_eq!(parsed.extra.get("pop"), Some(&json!(1000)));
        assert_eq!(parsed.run_type().expect("no run type"), None);
    }

    #[test]
    fn run_name_follows_mode_and_test_flag() {
        let parsed = instructions();
        let burnin = SweepConfig::from_instructions(&parsed, RunType::Burnin, false)
            .expect("config should build");
        let intervention = SweepConfig::from_instructions(&parsed, RunType::Intervention, true)
            .expect("config should build");

        assert_eq!(burnin.run_name(), "MAP_20191008_replicate_megatrends_Burnin");
        assert_eq!(
            intervention.run_name(),
            "MAP_20191008_replicate_megatrends_Intervention_TEST"
        );
        assert_eq!(burnin.simulation_duration_days(), Ok(3650));
        assert_eq!(intervention.simulation_duration_days(), Ok(1095));
    }

    #[test]
    fn test_run_uses_small_grid() {
        let config = SweepConfig::from_instructions(&instructions(), RunType::Burnin, true)
            .expect("config should build");
        assert_eq!(config.replicate_count, 1);
        assert_eq!(config.habitat_exponents, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn missing_years_is_configuration_error() {
        let mut parsed = instructions();
        parsed.intervention_years = None;
        let error = SweepConfig::from_instructions(&parsed, RunType::Intervention, false)
            .expect_err("should fail");
        assert_eq!(
            error,
            SweepError::configuration("instructions are missing 'intervention_years'")
        );
    }

    #[test]
    fn default_exponents_span_calibration_range() {
        let exponents = default_habitat_exponents();
        assert_eq!(exponents.len(), 50);
        assert_eq!(exponents[0], -3.75);
        assert_eq!(exponents[6], -2.25);
        assert_eq!(exponents[7], -2.0);
        assert_eq!(exponents[49], 2.2);
    }

    #[test]
    fn fractional_years_truncate_to_whole_days() {
        assert_eq!(years_to_days(0.5), Ok(182));
        assert!(years_to_days(0.0).is_err());
        assert!(years_to_days(f64::NAN).is_err());
    }
}
