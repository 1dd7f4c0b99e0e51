use std::path::Path;

use sweep_core::{ModificationUnit, SweepEntry};

use crate::error::{RunnerError, RunnerResult};

pub(crate) fn export_to_csv_impl(
    sweep: &[SweepEntry],
    file: std::fs::File,
    path: &Path,
) -> RunnerResult<()> {
    let mut wtr = csv::Writer::from_writer(file);
    let csv_error = |error| RunnerError::csv(path, error);

    wtr.write_record(["run_index", "unit_index", "kind", "name", "value"])
        .map_err(csv_error)?;

    for (run_index, entry) in sweep.iter().enumerate() {
        let run_index = run_index.to_string();
        for (unit_index, unit) in entry.units().iter().enumerate() {
            let unit_index = unit_index.to_string();
            match unit {
                ModificationUnit::UpdateParams { params } => {
                    for (name, value) in params {
                        wtr.write_record([
                            run_index.as_str(),
                            unit_index.as_str(),
                            "update_params",
                            name.as_str(),
                            value.to_string().as_str(),
                        ])
                        .map_err(csv_error)?;
                    }
                }
                ModificationUnit::Campaign(event) => {
                    let value = serde_json::to_string(event)
                        .map_err(|error| RunnerError::json(path, error))?;
                    wtr.write_record([
                        run_index.as_str(),
                        unit_index.as_str(),
                        "campaign",
                        event.intervention.as_str(),
                        value.as_str(),
                    ])
                    .map_err(csv_error)?;
                }
            }
        }
    }

    wtr.flush().map_err(|error| RunnerError::io(path, error))?;
    Ok(())
}
