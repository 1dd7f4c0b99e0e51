//! Sweep combination: the final list of per-run overrides.
//!
//! Burn-in mode submits the calibration grid as-is. Intervention mode crosses
//! every continuation with every intervention package. Entries are ordered
//! continuation-major: all packages for the first burn-in run, then all
//! packages for the second, and so on. Downstream run indexing relies on this
//! order.

use rayon::prelude::*;

use crate::burnin::{build_burnin_grid, resolve_continuations, BurninExperiment};
use crate::config::{RunType, SweepConfig};
use crate::contract::{ModificationUnit, SweepEntry};
use crate::error::{SweepError, SweepResult};
use crate::interventions::InterventionTable;
use crate::packages::{assemble_packages, distinct_dimensions, InterventionPackages, InterventionRow};

/// Materialized inputs for one sweep build.
#[derive(Debug, Clone, Copy)]
pub enum SweepInputs<'a> {
    Burnin,
    Intervention {
        burnin: &'a BurninExperiment,
        rows: &'a [InterventionRow],
    },
}

impl SweepInputs<'_> {
    fn run_type(&self) -> RunType {
        match self {
            Self::Burnin => RunType::Burnin,
            Self::Intervention { .. } => RunType::Intervention,
        }
    }
}

/// Cartesian product of continuations and packages.
///
/// Each entry is one continuation's units followed by one package's units, so
/// the restored population and lineage are in place before any intervention
/// is applied. Nothing is merged or dropped: the result always holds exactly
/// `continuations.len() * packages.len()` entries.
pub fn combine(
    continuations: &[SweepEntry],
    packages: &InterventionPackages,
) -> SweepResult<Vec<SweepEntry>> {
    let expected = continuations
        .len()
        .checked_mul(packages.len())
        .ok_or_else(|| SweepError::configuration("sweep size overflows usize"))?;

    let package_units: Vec<&[ModificationUnit]> = packages.values().collect();
    let entries: Vec<SweepEntry> = continuations
        .par_iter()
        .flat_map_iter(|continuation| {
            package_units
                .iter()
                .map(move |units| continuation.concat(units))
        })
        .collect();

    if entries.len() != expected {
        return Err(SweepError::configuration(format!(
            "combined {} entries, expected {} continuations x {} packages",
            entries.len(),
            continuations.len(),
            packages.len()
        )));
    }
    tracing::debug!(
        continuations = continuations.len(),
        packages = packages.len(),
        entries = entries.len(),
        "combined sweep"
    );
    Ok(entries)
}

/// Packages for `rows`, resolved against a table built from the coverages,
/// start days and intervention kinds the rows actually reference.
pub fn intervention_packages(
    rows: &[InterventionRow],
    years: f64,
) -> SweepResult<InterventionPackages> {
    let (coverages, start_days, interventions) = distinct_dimensions(rows);
    let table = InterventionTable::build_for(&interventions, &coverages, &start_days, years)?;
    assemble_packages(rows, &table)
}

/// Builds the full sweep for `config`.
pub fn build_sweep(config: &SweepConfig, inputs: SweepInputs<'_>) -> SweepResult<Vec<SweepEntry>> {
    if inputs.run_type() != config.run_type {
        return Err(SweepError::configuration(format!(
            "{} inputs supplied for a {} run",
            inputs.run_type(),
            config.run_type
        )));
    }

    match inputs {
        SweepInputs::Burnin => build_burnin_grid(
            config.replicate_count,
            &config.habitat_exponents,
            config.simulation_duration_days()?,
        ),
        SweepInputs::Intervention { burnin, rows } => {
            let packages = intervention_packages(rows, config.years)?;
            if packages.is_empty() {
                return Err(SweepError::configuration(
                    "intervention description defines no packages",
                ));
            }
            let continuations = resolve_continuations(burnin)?;
            combine(&continuations, &packages)
        }
    }
}
