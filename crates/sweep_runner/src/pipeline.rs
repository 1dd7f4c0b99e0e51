//! End-to-end preparation and submission of one experiment.

use std::path::PathBuf;

use sweep_core::burnin::BurninExperiment;
use sweep_core::sweep::{build_sweep, SweepInputs};
use sweep_core::{RunType, SubmissionRequest, SweepConfig, SweepError};

use crate::adapters::service::{ExperimentService, SubmissionReceipt};
use crate::error::RunnerResult;
use crate::inputs::InputBundle;

/// Caller-facing knobs layered over the instruction file.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    pub input_dir: PathBuf,
    /// Overrides the run type named in the instructions, if any.
    pub run_type: Option<RunType>,
    pub test_run: bool,
    pub replicate_count: Option<u32>,
    pub habitat_exponents: Option<Vec<f64>>,
    /// Build and return the submission without handing it to the service.
    pub dry_run: bool,
}

#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub request: SubmissionRequest,
    pub receipt: Option<SubmissionReceipt>,
}

/// Resolves the explicit sweep configuration for `options`.
pub fn resolve_config(options: &PipelineOptions, inputs: &InputBundle) -> RunnerResult<SweepConfig> {
    let run_type = match options.run_type {
        Some(run_type) => run_type,
        None => inputs.instructions.run_type()?.ok_or_else(|| {
            SweepError::configuration("no run type given on the command line or in the instructions")
        })?,
    };

    let mut config =
        SweepConfig::from_instructions(&inputs.instructions, run_type, options.test_run)?;
    if let Some(count) = options.replicate_count {
        config = config.with_replicate_count(count);
    }
    if let Some(exponents) = &options.habitat_exponents {
        config = config.with_habitat_exponents(exponents.clone());
    }
    Ok(config)
}

/// Builds the submission for `config` without submitting it.
///
/// Intervention runs pull their burn-in records from `service`; burn-in runs
/// never touch it.
pub fn prepare_submission(
    config: &SweepConfig,
    inputs: &InputBundle,
    service: &dyn ExperimentService,
) -> RunnerResult<SubmissionRequest> {
    let sweep = match config.run_type {
        RunType::Burnin => {
            tracing::info!(
                replicates = config.replicate_count,
                exponents = config.habitat_exponents.len(),
                "building burn-in grid"
            );
            build_sweep(config, SweepInputs::Burnin)?
        }
        RunType::Intervention => {
            let burnin_id = config.burnin_id.as_deref().ok_or_else(|| {
                SweepError::configuration("instructions are missing 'burnin_id'")
            })?;

            tracing::info!(burnin_id, "retrieving burn-in experiment");
            let records = config.select_burnin_records(service.retrieve_experiment(burnin_id)?);
            let experiment = BurninExperiment::new(&records)?;
            let rows = inputs.intervention_rows()?;

            tracing::info!(
                records = experiment.len(),
                checkpoint_step = experiment.checkpoint_step(),
                rows = rows.len(),
                "building intervention scenarios"
            );
            build_sweep(
                config,
                SweepInputs::Intervention {
                    burnin: &experiment,
                    rows: &rows,
                },
            )?
        }
    };

    Ok(SubmissionRequest::new(
        config.run_name(),
        config.base_config()?,
        sweep,
    )?)
}

/// Loads inputs, builds the sweep and, unless `dry_run` is set, submits it.
pub fn run_pipeline(
    options: &PipelineOptions,
    service: &dyn ExperimentService,
) -> RunnerResult<PipelineOutcome> {
    let inputs = InputBundle::load(&options.input_dir)?;
    tracing::info!(
        version = %inputs.instructions.version_name,
        site = %inputs.site_path.display(),
        "loaded instructions"
    );
    let config = resolve_config(options, &inputs)?;
    let request = prepare_submission(&config, &inputs, service)?;

    if options.dry_run {
        tracing::info!(
            run_name = %request.run_name,
            entries = request.sweep.len(),
            "dry run, not submitting"
        );
        return Ok(PipelineOutcome {
            request,
            receipt: None,
        });
    }

    tracing::info!(
        run_name = %request.run_name,
        entries = request.sweep.len(),
        fingerprint = %request.fingerprint,
        "submitting"
    );
    let receipt = service.submit(&request)?;
    tracing::info!(experiment_id = %receipt.experiment_id, "submission accepted");

    Ok(PipelineOutcome {
        request,
        receipt: Some(receipt),
    })
}
