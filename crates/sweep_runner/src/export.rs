//! Export of a prepared submission for review before (or instead of) sending
//! it to the execution service.

use std::path::Path;

use sweep_core::SubmissionRequest;

use crate::error::RunnerResult;

#[path = "export/csv.rs"]
mod csv;
#[path = "export/json.rs"]
mod json;
#[path = "export/writer_utils.rs"]
mod writer_utils;

/// Write the full submission (run name, base configuration, every entry and
/// the fingerprint) as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if the sweep is empty or the file cannot be written.
pub fn export_manifest_json(request: &SubmissionRequest, path: impl AsRef<Path>) -> RunnerResult<()> {
    writer_utils::ensure_not_empty(&request.sweep)?;
    let file = writer_utils::create_output_file(path.as_ref())?;
    json::export_to_json_impl(request, file, path.as_ref())
}

/// Write one CSV row per assigned parameter (or scheduled campaign) per run.
///
/// Columns: `run_index,unit_index,kind,name,value`. For parameter updates
/// `name` is the parameter and `value` its JSON value; for campaigns `name` is
/// the intervention and `value` the whole event as JSON.
pub fn export_sweep_csv(request: &SubmissionRequest, path: impl AsRef<Path>) -> RunnerResult<()> {
    writer_utils::ensure_not_empty(&request.sweep)?;
    let file = writer_utils::create_output_file(path.as_ref())?;
    csv::export_to_csv_impl(&request.sweep, file, path.as_ref())
}
