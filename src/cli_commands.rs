//! Non-interactive `run` subcommand

use anyhow::Result;
use std::io::Write;
use std::path::PathBuf;

use crate::app::App;
use crate::state::{Field, FileHandle};
use crate::ui::output::OutputHandler;

/// Inputs for a single submission from the command line
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub requirements: Option<String>,
    pub requirements_file: Option<PathBuf>,
    pub user_stories: Option<String>,
    pub code_diffs: Option<String>,
    pub previous_results: Option<String>,
    /// Print the raw result object instead of rendered sections
    pub json: bool,
}

/// Fill the fields, submit once and render the outcome.
///
/// Returns whether the run ended in success.
pub async fn run_once<W: Write>(
    app: &mut App,
    options: RunOptions,
    output: &mut OutputHandler<W>,
) -> Result<bool> {
    if let Some(text) = options.requirements {
        app.update_field(Field::Requirements, text);
    }
    if let Some(path) = options.requirements_file {
        if app.import_file(FileHandle::from_path(&path)) {
            app.wait_for_import().await;
        }
        if let Some(message) = app.state().lifecycle.error() {
            output.print_error(message)?;
            return Ok(false);
        }
    }
    for (field, value) in [
        (Field::UserStories, options.user_stories),
        (Field::CodeDiffs, options.code_diffs),
        (Field::PreviousTestResults, options.previous_results),
    ] {
        if let Some(text) = value {
            app.update_field(field, text);
        }
    }

    if !app.submit() {
        output.print_error("Software requirements are required")?;
        return Ok(false);
    }
    app.wait_for_request().await;

    let state = app.state();
    let succeeded = state.lifecycle.result().is_some();
    match state.lifecycle.result() {
        Some(result) if options.json => {
            let json = serde_json::to_string_pretty(&result.to_value())?;
            output.print_info(&json)?;
        }
        _ => output.print_outcome(state)?,
    }
    output.flush()?;

    Ok(succeeded)
}
