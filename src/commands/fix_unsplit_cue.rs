use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::{load_config, AssumeYes, ShntoolBackend, SplitDriver, TerminalPrompter};
use crate::error::NasError;
use crate::models::{RunSummary, ScriptOptions, SplitOutcome};

/// Check that the folder argument names an existing directory
pub fn resolve_folder(folder: &Path) -> Result<PathBuf, NasError> {
    if !folder.exists() {
        return Err(NasError::InvalidInput(format!(
            "{} does not exist",
            folder.display()
        )));
    }
    if !folder.is_dir() {
        return Err(NasError::InvalidInput(format!(
            "{} is not a directory",
            folder.display()
        )));
    }
    Ok(folder.canonicalize()?)
}

/// Find unsplit cue/audio images under `folder` and split them into tracks
pub fn fix_unsplit_cue(
    working_dir: &Path,
    config_path: Option<&Path>,
    folder: &Path,
    options: ScriptOptions,
) -> Result<RunSummary, NasError> {
    let root = resolve_folder(folder)?;
    let config = load_config(config_path, working_dir)?;
    let backend = ShntoolBackend::new(config.split);

    info!("Scanning {}", root.display());
    let summary = if options.assume_yes {
        SplitDriver::new(backend, AssumeYes, options).run(&root)?
    } else {
        SplitDriver::new(backend, TerminalPrompter::new(), options).run(&root)?
    };

    if summary.found > 0 && !summary.cancelled {
        print_split_summary(&summary);
    }
    Ok(summary)
}

/// Print the end-of-run report
pub fn print_split_summary(summary: &RunSummary) {
    println!("\n=== Split Summary ===");
    println!("{}", summary);

    let failures: Vec<_> = summary
        .results
        .iter()
        .filter_map(|r| match &r.outcome {
            SplitOutcome::Failure(reason) => Some((&r.pair, reason)),
            _ => None,
        })
        .collect();
    if !failures.is_empty() {
        println!("\nFailed:");
        for (pair, reason) in failures {
            println!("  {}: {}", pair, reason);
        }
    }

    let kept: Vec<_> = summary
        .results
        .iter()
        .filter(|r| matches!(r.outcome, SplitOutcome::Success { promoted: false, .. }))
        .collect();
    if !kept.is_empty() {
        println!("\nSplit output left in place:");
        for result in kept {
            println!("  {}", result.pair.temp_dir().display());
        }
    }
}
