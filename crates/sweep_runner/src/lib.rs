//! Input loading, execution-service adapters and the submission pipeline
//! around `sweep_core`.
//!
//! This crate owns everything that touches the filesystem or the execution
//! service. The combinatorial work stays in `sweep_core`.

pub mod adapters;
pub mod error;
pub mod export;
pub mod inputs;
pub mod pipeline;

pub use adapters::local_store::LocalExperimentService;
pub use adapters::service::{ExperimentService, ServiceError, SubmissionReceipt};
pub use error::{RunnerError, RunnerResult};
pub use export::{export_manifest_json, export_sweep_csv};
pub use pipeline::{run_pipeline, PipelineOptions, PipelineOutcome};

/// Initialize logging with a default filter.
///
/// `RUST_LOG` overrides the default of `info` for this workspace.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,sweep_core=info,sweep_runner=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
