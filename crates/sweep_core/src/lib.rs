//! Parameter sweep builder for malaria intervention experiments.
//!
//! Turns a handful of instructions (simulated years, calibration grid,
//! intervention packages, completed burn-in runs) into the explicit, ordered
//! list of per-run overrides submitted as one experiment. This crate performs
//! no I/O; loading inputs and talking to the execution service live in
//! `sweep_runner`.
//!
//! # Modes
//!
//! - **Burn-in**: [`burnin::build_burnin_grid`] expands replicate × habitat
//!   exponent into independent runs that checkpoint their final state.
//! - **Intervention**: [`burnin::resolve_continuations`] resumes every
//!   burn-in run, [`packages::assemble_packages`] resolves each package
//!   against an [`interventions::InterventionTable`], and
//!   [`sweep::combine`] crosses the two.
//!
//! ```
//! use sweep_core::burnin::build_burnin_grid;
//!
//! let grid = build_burnin_grid(2, &[-1.0, 0.0, 1.0], 3650).unwrap();
//! assert_eq!(grid.len(), 6);
//! ```

pub mod burnin;
pub mod checkpoint;
pub mod config;
pub mod contract;
pub mod error;
pub mod interventions;
pub mod packages;
pub mod sweep;

pub use burnin::{BurninExperiment, BurninRunRecord};
pub use config::{Instructions, RunType, SweepConfig};
pub use contract::{BaseConfig, ModificationUnit, SubmissionRequest, SweepEntry};
pub use error::{SweepError, SweepResult};
pub use interventions::{Coverage, InterventionTable};
pub use packages::{InterventionPackages, InterventionRow};
pub use sweep::{build_sweep, combine, SweepInputs};
