use std::io::{BufWriter, Write};
use std::path::Path;

use sweep_core::SubmissionRequest;

use crate::error::{RunnerError, RunnerResult};

pub(crate) fn export_to_json_impl(
    request: &SubmissionRequest,
    file: std::fs::File,
    path: &Path,
) -> RunnerResult<()> {
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, request)
        .map_err(|error| RunnerError::json(path, error))?;
    writer.flush().map_err(|error| RunnerError::io(path, error))
}
