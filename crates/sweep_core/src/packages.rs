//! Resolves named intervention packages against the intervention table.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::contract::ModificationUnit;
use crate::error::SweepResult;
use crate::interventions::{CellKey, Coverage, InterventionTable};

/// One row of the intervention description: "package `int_id` includes
/// intervention `int` at coverage `cov` from `start_day`".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InterventionRow {
    pub int_id: String,
    pub start_day: u32,
    pub cov: f64,
    pub int: String,
}

impl InterventionRow {
    pub fn new(
        int_id: impl Into<String>,
        start_day: u32,
        cov: f64,
        int: impl Into<String>,
    ) -> Self {
        Self {
            int_id: int_id.into(),
            start_day,
            cov,
            int: int.into(),
        }
    }

    pub fn cell_key(&self) -> SweepResult<CellKey> {
        Ok(CellKey::new(
            self.start_day,
            Coverage::new(self.cov)?,
            self.int.trim(),
        ))
    }
}

/// Distinct coverages, start days and intervention names referenced by `rows`,
/// each in first-appearance order.
pub fn distinct_dimensions(rows: &[InterventionRow]) -> (Vec<f64>, Vec<u32>, Vec<String>) {
    let mut coverages: Vec<f64> = Vec::new();
    let mut start_days: Vec<u32> = Vec::new();
    let mut interventions: Vec<String> = Vec::new();

    for row in rows {
        if !coverages.iter().any(|&seen| seen == row.cov) {
            coverages.push(row.cov);
        }
        if !start_days.contains(&row.start_day) {
            start_days.push(row.start_day);
        }
        let name = row.int.trim();
        if !interventions.iter().any(|seen| seen == name) {
            interventions.push(name.to_string());
        }
    }

    (coverages, start_days, interventions)
}

/// Resolved packages, in the order their ids first appear in the rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterventionPackages {
    packages: Vec<(String, Vec<ModificationUnit>)>,
}

impl InterventionPackages {
    pub fn from_vec(packages: Vec<(String, Vec<ModificationUnit>)>) -> Self {
        Self { packages }
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.packages.iter().map(|(id, _)| id.as_str())
    }

    pub fn get(&self, int_id: &str) -> Option<&[ModificationUnit]> {
        self.packages
            .iter()
            .find(|(id, _)| id == int_id)
            .map(|(_, units)| units.as_slice())
    }

    /// Unit lists only, in package order.
    pub fn values(&self) -> impl ExactSizeIterator<Item = &[ModificationUnit]> + '_ {
        self.packages.iter().map(|(_, units)| units.as_slice())
    }
}

/// Groups rows by `int_id` and concatenates each group's table cells in row
/// order.
///
/// A row pointing at a cell the table does not hold aborts the whole assembly;
/// the same cell referenced twice contributes its units twice.
pub fn assemble_packages(
    rows: &[InterventionRow],
    table: &InterventionTable,
) -> SweepResult<InterventionPackages> {
    let mut packages: Vec<(String, Vec<ModificationUnit>)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for row in rows {
        let units = table.lookup(&row.cell_key()?)?;
        let position = *positions.entry(row.int_id.as_str()).or_insert_with(|| {
            packages.push((row.int_id.clone(), Vec::new()));
            packages.len() - 1
        });
        packages[position].1.extend_from_slice(units);
    }

    tracing::debug!(packages = packages.len(), rows = rows.len(), "assembled intervention packages");
    Ok(InterventionPackages { packages })
}
