use std::fs::File;
use std::path::Path;

use crate::error::{RunnerError, RunnerResult};

pub(crate) fn ensure_not_empty<T>(items: &[T]) -> RunnerResult<()> {
    if items.is_empty() {
        return Err(RunnerError::EmptyExport);
    }

    Ok(())
}

pub(crate) fn create_output_file(path: &Path) -> RunnerResult<File> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|error| RunnerError::io(parent, error))?;
    }
    File::create(path).map_err(|error| RunnerError::io(path, error))
}
