use std::fmt;

use crate::models::CueAudioPair;

/// Run-wide options for one fix-unsplit-cue invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptOptions {
    /// Skip directories that still hold a `__temp_split` folder
    pub ignore_failed: bool,
    /// Answer every confirmation with yes, without prompting
    pub assume_yes: bool,
}

/// How a single pair ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitOutcome {
    /// Split (and cleanup, if confirmed) completed
    Success {
        tracks: usize,
        /// False when the operator kept the output in `__temp_split`
        promoted: bool,
    },
    /// The operator declined this pair
    Skipped,
    Failure(String),
}

impl SplitOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, SplitOutcome::Failure(_))
    }
}

/// Result of processing one pair
#[derive(Debug, Clone)]
pub struct SplitJobResult {
    pub pair: CueAudioPair,
    pub outcome: SplitOutcome,
}

/// Terminal report of a driver run
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Pairs found by the scanner
    pub found: usize,
    pub processed: usize,
    pub failed: usize,
    /// Declined pairs plus pairs never reached after a failure
    pub skipped: usize,
    /// True when the operator declined the global confirmation
    pub cancelled: bool,
    pub results: Vec<SplitJobResult>,
}

impl RunSummary {
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    pub(crate) fn record(&mut self, result: SplitJobResult) {
        match result.outcome {
            SplitOutcome::Success { .. } => self.processed += 1,
            SplitOutcome::Skipped => self.skipped += 1,
            SplitOutcome::Failure(_) => self.failed += 1,
        }
        self.results.push(result);
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Found:     {}", self.found)?;
        writeln!(f, "Processed: {}", self.processed)?;
        writeln!(f, "Failed:    {}", self.failed)?;
        write!(f, "Skipped:   {}", self.skipped)
    }
}
