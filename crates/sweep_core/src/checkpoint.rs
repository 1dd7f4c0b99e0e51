//! Naming of serialized burn-in state on the execution service.

/// Width of the zero-padded time step in a checkpoint filename.
pub const CHECKPOINT_STEP_DIGITS: usize = 5;
/// Largest time step that fits the fixed-width filename. Larger steps are
/// rejected rather than truncated.
pub const MAX_CHECKPOINT_STEP: u32 = 99_999;

/// `state-NNNNN.dtk` for the given time step, or `None` when the step needs
/// more than five digits.
pub fn checkpoint_filename(step: u32) -> Option<String> {
    if step > MAX_CHECKPOINT_STEP {
        return None;
    }
    Some(format!(
        "state-{step:0width$}.dtk",
        width = CHECKPOINT_STEP_DIGITS
    ))
}

/// Directory holding a finished simulation's serialized state.
pub fn serialized_population_path(output_path: &str) -> String {
    let trimmed = output_path.trim_end_matches(['/', '\\']);
    format!("{trimmed}/output")
}
