// Interactive orchestration of the cue split pipeline:
// scan -> list/confirm -> (confirm pair -> split -> confirm cleanup)* -> summary

use std::path::Path;
use tracing::{error, info};

use crate::core::cue::read_cue_sheet;
use crate::core::promote::promote_split;
use crate::core::prompt::Prompter;
use crate::core::scanner::{directory_listing, PairScanner};
use crate::core::splitter::{list_tracks, split_pair, SplitBackend};
use crate::core::tools::missing_tools;
use crate::error::NasError;
use crate::models::{
    AudioFormat, CueAudioPair, RunSummary, ScriptOptions, SplitJobResult, SplitOutcome,
};

/// Drives one fix-unsplit-cue run
pub struct SplitDriver<B, P> {
    backend: B,
    prompter: P,
    options: ScriptOptions,
}

impl<B: SplitBackend, P: Prompter> SplitDriver<B, P> {
    pub fn new(backend: B, prompter: P, options: ScriptOptions) -> Self {
        Self {
            backend,
            prompter,
            options,
        }
    }

    /// Ask the operator, unless every answer is assumed to be yes
    fn ask(&mut self, question: &str) -> Result<bool, NasError> {
        if self.options.assume_yes {
            return Ok(true);
        }
        self.prompter.confirm(question, true)
    }

    /// Run the whole pipeline under `root`.
    ///
    /// Stops at the first pair whose split or cleanup fails; the pairs after
    /// it are counted as skipped. Missing external tools are returned as an
    /// error before anything is touched.
    pub fn run(&mut self, root: &Path) -> Result<RunSummary, NasError> {
        let pairs = PairScanner::new(&self.options).scan(root);
        let mut summary = RunSummary {
            found: pairs.len(),
            ..Default::default()
        };

        if pairs.is_empty() {
            println!("No unsplit cue/audio pairs found under {}", root.display());
            return Ok(summary);
        }

        print_pairs(&pairs);
        self.check_tools(&pairs)?;

        if !self.ask(&format!("Proceed with splitting these {} file(s)?", pairs.len()))? {
            println!("Cancelled, nothing was changed.");
            summary.cancelled = true;
            return Ok(summary);
        }

        let total = pairs.len();
        for (idx, pair) in pairs.into_iter().enumerate() {
            println!("\n[{}/{}] {}", idx + 1, total, pair.directory().display());
            for name in directory_listing(pair.directory()) {
                println!("    {}", name.display());
            }

            let question = if pair.is_interrupted() {
                format!("Finish the interrupted cleanup of {}?", pair.audio_file())
            } else {
                format!("Split {}?", pair.audio_file())
            };
            if !self.ask(&question)? {
                info!("Skipped {}", pair);
                summary.record(SplitJobResult {
                    pair,
                    outcome: SplitOutcome::Skipped,
                });
                continue;
            }

            let outcome = self.process(&pair)?;
            let failed = outcome.is_failure();
            summary.record(SplitJobResult { pair, outcome });

            if failed {
                let remaining = total - (idx + 1);
                if remaining > 0 {
                    println!("\nStopping after failure, {} pair(s) not attempted", remaining);
                }
                summary.skipped += remaining;
                break;
            }
        }

        Ok(summary)
    }

    /// Split one confirmed pair and, if confirmed, promote the result.
    /// Only prompt errors are returned as `Err`; pipeline failures become outcomes.
    fn process(&mut self, pair: &CueAudioPair) -> Result<SplitOutcome, NasError> {
        let tracks = if pair.is_interrupted() {
            // Resume: the split already happened, only promotion is left
            match list_tracks(&pair.temp_dir(), pair.format()) {
                Ok(tracks) => {
                    println!("Resuming cleanup, {} track(s) still to move:", tracks.len());
                    tracks
                }
                Err(e) => {
                    error!("Cannot read {}: {}", pair.temp_dir().display(), e);
                    return Ok(SplitOutcome::Failure(e.to_string()));
                }
            }
        } else {
            match split_pair(&self.backend, pair) {
                Ok(tracks) => {
                    println!("Split into {} track(s):", tracks.len());
                    tracks
                }
                Err(e) => {
                    error!("{}", e);
                    return Ok(SplitOutcome::Failure(e.to_string()));
                }
            }
        };
        for track in &tracks {
            if let Some(name) = track.file_name() {
                println!("    {}", name.to_string_lossy());
            }
        }

        let question = format!(
            "Move {} split file(s) into place and delete {} and {}?",
            tracks.len(),
            pair.cue_file(),
            pair.audio_file()
        );
        if !self.ask(&question)? {
            println!("Split output kept in {}", pair.temp_dir().display());
            return Ok(SplitOutcome::Success {
                tracks: tracks.len(),
                promoted: false,
            });
        }

        match promote_split(pair) {
            Ok(_) => Ok(SplitOutcome::Success {
                tracks: tracks.len(),
                promoted: true,
            }),
            Err(e) => {
                error!("{}", e);
                Ok(SplitOutcome::Failure(e.to_string()))
            }
        }
    }

    fn check_tools(&self, pairs: &[CueAudioPair]) -> Result<(), NasError> {
        let mut formats: Vec<AudioFormat> = pairs
            .iter()
            .filter(|p| !p.is_interrupted())
            .map(|p| p.format())
            .collect();
        if formats.is_empty() {
            return Ok(());
        }
        formats.sort();
        formats.dedup();

        let required = self.backend.required_tools(&formats);
        let required: Vec<&str> = required.iter().map(String::as_str).collect();
        let missing = missing_tools(&required);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(NasError::missing_tools(missing))
        }
    }
}

fn print_pairs(pairs: &[CueAudioPair]) {
    println!("Found {} unsplit cue/audio pair(s):\n", pairs.len());
    for (idx, pair) in pairs.iter().enumerate() {
        let tracks = read_cue_sheet(&pair.cue_path())
            .map(|sheet| format!("{} tracks", sheet.track_count()))
            .unwrap_or_else(|_| "unreadable cue".to_string());
        let note = if pair.is_interrupted() { ", cleanup interrupted" } else { "" };
        println!("  {}. {} [{}, {}{}]", idx + 1, pair, pair.format(), tracks, note);
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::splitter::TagOutcome;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct OneTrack;

    impl SplitBackend for OneTrack {
        fn required_tools(&self, _formats: &[AudioFormat]) -> Vec<String> {
            Vec::new()
        }

        fn split(&self, pair: &CueAudioPair, output_dir: &Path) -> Result<(), NasError> {
            let name = format!("01. Track.{}", pair.format().extension());
            fs::write(output_dir.join(name), b"t")?;
            Ok(())
        }

        fn tag(&self, _pair: &CueAudioPair, _tracks: &[PathBuf]) -> Result<TagOutcome, NasError> {
            Ok(TagOutcome::Unavailable)
        }
    }

    struct NeedsMissingTool;

    impl SplitBackend for NeedsMissingTool {
        fn required_tools(&self, _formats: &[AudioFormat]) -> Vec<String> {
            vec!["/definitely/not/here/shnsplit".to_string()]
        }

        fn split(&self, _pair: &CueAudioPair, _output_dir: &Path) -> Result<(), NasError> {
            panic!("split must not run when tools are missing");
        }

        fn tag(&self, _pair: &CueAudioPair, _tracks: &[PathBuf]) -> Result<TagOutcome, NasError> {
            Ok(TagOutcome::Unavailable)
        }
    }

    /// Answers "no" to everything; panics on free-text input
    struct AlwaysNo;

    impl Prompter for AlwaysNo {
        fn confirm(&mut self, _question: &str, _default: bool) -> Result<bool, NasError> {
            Ok(false)
        }

        fn input(&mut self, _question: &str) -> Result<Option<String>, NasError> {
            panic!("unexpected input prompt");
        }
    }

    fn album(root: &Path) -> PathBuf {
        let dir = root.join("album");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("album.cue"), "TRACK 01 AUDIO\n").unwrap();
        fs::write(dir.join("album.flac"), b"image").unwrap();
        dir
    }

    #[test]
    fn test_empty_root_reports_nothing_found() {
        let root = TempDir::new().unwrap();
        let mut driver = SplitDriver::new(OneTrack, AlwaysNo, ScriptOptions::default());

        let summary = driver.run(root.path()).unwrap();
        assert_eq!(summary.found, 0);
        assert!(!summary.has_failures());
    }

    #[test]
    fn test_declining_global_confirmation_changes_nothing() {
        let root = TempDir::new().unwrap();
        let dir = album(root.path());
        let mut driver = SplitDriver::new(OneTrack, AlwaysNo, ScriptOptions::default());

        let summary = driver.run(root.path()).unwrap();
        assert!(summary.cancelled);
        assert_eq!(summary.processed, 0);
        assert!(dir.join("album.flac").is_file());
        assert!(!dir.join("__temp_split").exists());
    }

    #[test]
    fn test_assume_yes_bypasses_prompter() {
        let root = TempDir::new().unwrap();
        let dir = album(root.path());
        let options = ScriptOptions {
            assume_yes: true,
            ..Default::default()
        };
        let mut driver = SplitDriver::new(OneTrack, AlwaysNo, options);

        let summary = driver.run(root.path()).unwrap();
        assert_eq!(summary.processed, 1);
        assert!(dir.join("01. Track.flac").is_file());
        assert!(!dir.join("album.flac").exists());
    }

    #[test]
    fn test_missing_tools_abort_before_changes() {
        let root = TempDir::new().unwrap();
        let dir = album(root.path());
        let options = ScriptOptions {
            assume_yes: true,
            ..Default::default()
        };
        let mut driver = SplitDriver::new(NeedsMissingTool, AlwaysNo, options);

        let err = driver.run(root.path()).unwrap_err();
        assert!(matches!(err, NasError::MissingTools { .. }));
        assert!(!dir.join("__temp_split").exists());
    }

    #[test]
    fn test_interrupted_cleanup_resumes_without_splitting() {
        let root = TempDir::new().unwrap();
        let dir = album(root.path());
        fs::write(dir.join("01. Track.flac"), b"t").unwrap();
        fs::create_dir(dir.join("__temp_split")).unwrap();
        fs::write(dir.join("__temp_split").join("02. Track.flac"), b"t").unwrap();
        let options = ScriptOptions {
            assume_yes: true,
            ..Default::default()
        };
        // Neither the tool check nor the split may run for a resumed pair
        let mut driver = SplitDriver::new(NeedsMissingTool, AlwaysNo, options);

        let summary = driver.run(root.path()).unwrap();
        assert_eq!(summary.processed, 1);
        assert_eq!(
            summary.results[0].outcome,
            SplitOutcome::Success {
                tracks: 1,
                promoted: true
            }
        );
        assert!(dir.join("02. Track.flac").is_file());
        assert!(!dir.join("album.flac").exists());
        assert!(!dir.join("__temp_split").exists());
    }
}
