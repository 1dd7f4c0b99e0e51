use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use sweep_core::RunType;
use sweep_runner::{
    export_manifest_json, export_sweep_csv, init_logging, run_pipeline, LocalExperimentService,
    PipelineOptions,
};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "sweep",
    about = "Build and submit malaria intervention simulation sweeps",
    long_about = "Expands burn-in calibration grids and intervention packages into\n\
                  one explicit override list per simulation, then submits them."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a sweep from a version directory and submit it
    Build {
        /// Directory holding input_params.json, the site file and interventions.csv
        #[arg(long)]
        input_dir: PathBuf,
        /// Run type; defaults to the one named in input_params.json
        #[arg(value_enum, long, env = "SWEEP_RUN_TYPE")]
        run_type: Option<RunTypeArg>,
        /// Small test sweep: one replicate, three exponents, three burn-ins
        #[arg(long)]
        test_run: bool,
        /// Override the number of burn-in replicates
        #[arg(long)]
        replicates: Option<u32>,
        /// Override the habitat-scaling exponents (comma separated)
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        habitat_exponents: Option<Vec<f64>>,
        /// Root of the local execution service store
        #[arg(long, env = "SWEEP_SERVICE_ROOT", default_value = "sweep_service")]
        service_root: PathBuf,
        /// Also write the full submission as JSON
        #[arg(long)]
        manifest_out: Option<PathBuf>,
        /// Also write the sweep as a flat CSV
        #[arg(long)]
        csv_out: Option<PathBuf>,
        /// Build and export without submitting
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RunTypeArg {
    /// Calibration grid of replicates × habitat exponents
    Burnin,
    /// Burn-in continuations × intervention packages
    Intervention,
}

impl From<RunTypeArg> for RunType {
    fn from(value: RunTypeArg) -> Self {
        match value {
            RunTypeArg::Burnin => RunType::Burnin,
            RunTypeArg::Intervention => RunType::Intervention,
        }
    }
}

// ── Entry point ────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            input_dir,
            run_type,
            test_run,
            replicates,
            habitat_exponents,
            service_root,
            manifest_out,
            csv_out,
            dry_run,
        } => {
            let options = PipelineOptions {
                input_dir,
                run_type: run_type.map(RunType::from),
                test_run,
                replicate_count: replicates,
                habitat_exponents,
                dry_run,
            };
            let service = LocalExperimentService::new(service_root);
            let outcome = run_pipeline(&options, &service).context("sweep build failed")?;

            if let Some(path) = manifest_out {
                export_manifest_json(&outcome.request, &path)
                    .with_context(|| format!("writing manifest {}", path.display()))?;
                tracing::info!(path = %path.display(), "wrote manifest");
            }
            if let Some(path) = csv_out {
                export_sweep_csv(&outcome.request, &path)
                    .with_context(|| format!("writing sweep csv {}", path.display()))?;
                tracing::info!(path = %path.display(), "wrote sweep csv");
            }

            match outcome.receipt {
                Some(receipt) => println!(
                    "Submitted {} runs as {} ({})",
                    receipt.entries, receipt.experiment_id, receipt.location
                ),
                None => println!(
                    "Prepared {} runs for {} (dry run)",
                    outcome.request.sweep.len(),
                    outcome.request.run_name
                ),
            }
        }
    }

    Ok(())
}
