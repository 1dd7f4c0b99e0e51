//! Intervention lookup table keyed by `(start_day, coverage, intervention)`.
//!
//! Every cell holds the modification units that schedule one intervention at
//! one coverage from one start day, sized to the simulation horizon.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::years_to_days;
use crate::contract::{CampaignEvent, ModificationUnit};
use crate::error::{SweepError, SweepResult};

const BEDNET_REDISTRIBUTION_DAYS: u32 = 3 * 365;
const IRS_ROUND_DAYS: u32 = 365;
const MDA_ROUNDS: u32 = 3;
const MDA_ROUND_SPACING_DAYS: u32 = 30;

/// Fractional coverage in `[0, 1]`, hashable so it can key the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Coverage(u64);

impl Coverage {
    pub fn new(value: f64) -> SweepResult<Self> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(SweepError::configuration(format!(
                "coverage must be within [0, 1], got {value}"
            )));
        }
        // -0.0 and 0.0 must land on the same cell.
        let value = if value == 0.0 { 0.0 } else { value };
        Ok(Self(value.to_bits()))
    }

    pub fn value(self) -> f64 {
        f64::from_bits(self.0)
    }
}

impl TryFrom<f64> for Coverage {
    type Error = SweepError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Coverage> for f64 {
    fn from(coverage: Coverage) -> Self {
        coverage.value()
    }
}

impl fmt::Display for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterventionKind {
    Bednet,
    Irs,
    CaseManagement,
    Mda,
}

impl InterventionKind {
    pub const ALL: [Self; 4] = [Self::Bednet, Self::Irs, Self::CaseManagement, Self::Mda];

    pub fn name(self) -> &'static str {
        match self {
            Self::Bednet => "bednet",
            Self::Irs => "irs",
            Self::CaseManagement => "case_management",
            Self::Mda => "mda",
        }
    }

    /// Units scheduling this intervention from `start_day` until `horizon_days`.
    fn generate(self, start_day: u32, coverage: Coverage, horizon_days: u32) -> ModificationUnit {
        let remaining_days = horizon_days - start_day;
        let (repetitions, interval_days, duration_days) = match self {
            Self::Bednet => (
                remaining_days.div_ceil(BEDNET_REDISTRIBUTION_DAYS).max(1),
                BEDNET_REDISTRIBUTION_DAYS,
                None,
            ),
            Self::Irs => (
                remaining_days.div_ceil(IRS_ROUND_DAYS).max(1),
                IRS_ROUND_DAYS,
                None,
            ),
            Self::CaseManagement => (1, 0, Some(remaining_days)),
            Self::Mda => (MDA_ROUNDS, MDA_ROUND_SPACING_DAYS, None),
        };

        ModificationUnit::Campaign(CampaignEvent {
            intervention: self.name().to_string(),
            start_day,
            coverage: coverage.value(),
            repetitions,
            interval_days,
            duration_days,
        })
    }
}

impl FromStr for InterventionKind {
    type Err = SweepError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == value.trim())
            .ok_or_else(|| {
                SweepError::configuration(format!("no generator for intervention type '{value}'"))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CellKey {
    pub start_day: u32,
    pub coverage: Coverage,
    pub intervention: String,
}

impl CellKey {
    pub fn new(start_day: u32, coverage: Coverage, intervention: impl Into<String>) -> Self {
        Self {
            start_day,
            coverage,
            intervention: intervention.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InterventionTable {
    cells: HashMap<CellKey, Vec<ModificationUnit>>,
    horizon_days: u32,
}

impl InterventionTable {
    /// Table covering every supported intervention kind.
    pub fn build(coverages: &[f64], start_days: &[u32], years: f64) -> SweepResult<Self> {
        let names = InterventionKind::ALL.map(InterventionKind::name);
        Self::build_for(&names, coverages, start_days, years)
    }

    /// Table covering only the named intervention kinds.
    ///
    /// Fails if a name has no generator, a coverage is out of range, or a start
    /// day falls outside the simulated horizon.
    pub fn build_for<S: AsRef<str>>(
        interventions: &[S],
        coverages: &[f64],
        start_days: &[u32],
        years: f64,
    ) -> SweepResult<Self> {
        let horizon_days = years_to_days(years)?;
        let kinds = interventions
            .iter()
            .map(|name| name.as_ref().parse::<InterventionKind>())
            .collect::<SweepResult<Vec<_>>>()?;
        let coverages = coverages
            .iter()
            .map(|&value| Coverage::new(value))
            .collect::<SweepResult<Vec<_>>>()?;

        let mut cells = HashMap::with_capacity(kinds.len() * coverages.len() * start_days.len());
        for &start_day in start_days {
            if start_day >= horizon_days {
                return Err(SweepError::configuration(format!(
                    "start day {start_day} is not before the {horizon_days}-day horizon"
                )));
            }
            for &coverage in &coverages {
                for &kind in &kinds {
                    cells.insert(
                        CellKey::new(start_day, coverage, kind.name()),
                        vec![kind.generate(start_day, coverage, horizon_days)],
                    );
                }
            }
        }

        tracing::debug!(cells = cells.len(), horizon_days, "built intervention table");
        Ok(Self {
            cells,
            horizon_days,
        })
    }

    pub fn get(&self, key: &CellKey) -> Option<&[ModificationUnit]> {
        self.cells.get(key).map(Vec::as_slice)
    }

    /// Units for a cell, or a lookup error naming the missing triple.
    pub fn lookup(&self, key: &CellKey) -> SweepResult<&[ModificationUnit]> {
        self.get(key).ok_or_else(|| SweepError::Lookup {
            start_day: key.start_day,
            coverage: key.coverage,
            intervention: key.intervention.clone(),
        })
    }

    pub fn horizon_days(&self) -> u32 {
        self.horizon_days
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
