use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tracing::{debug, info, warn};

use crate::core::cue::read_cue_sheet;
use crate::core::tools::{describe_failure, tool_available, ToolRunner};
use crate::error::NasError;
use crate::models::{AudioFormat, CueAudioPair, SplitConfig, TEMP_SPLIT_DIR};

/// Result of a best-effort tagging pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagOutcome {
    Tagged,
    /// No tagging tool installed
    Unavailable,
}

/// Does the actual cutting of an audio image into tracks
pub trait SplitBackend {
    /// Tools that must be installed before pairs of the given formats can be split
    fn required_tools(&self, formats: &[AudioFormat]) -> Vec<String>;

    /// Split `pair` into per-track files inside `output_dir`.
    /// `output_dir` already exists when this is called.
    fn split(&self, pair: &CueAudioPair, output_dir: &Path) -> Result<(), NasError>;

    /// Copy cue sheet metadata into the produced tracks
    fn tag(&self, pair: &CueAudioPair, tracks: &[PathBuf]) -> Result<TagOutcome, NasError>;
}

/// Backend built on cuetools + shntool
pub struct ShntoolBackend {
    config: SplitConfig,
    runner: ToolRunner,
}

impl ShntoolBackend {
    pub fn new(config: SplitConfig) -> Self {
        let runner = ToolRunner::new(config.locale.clone());
        Self { config, runner }
    }

    fn split_error(pair: &CueAudioPair, message: String) -> NasError {
        NasError::Split {
            file: pair.audio_path(),
            message,
        }
    }
}

impl SplitBackend for ShntoolBackend {
    fn required_tools(&self, formats: &[AudioFormat]) -> Vec<String> {
        let mut tools = vec![
            self.config.breakpoints_tool.clone(),
            self.config.split_tool.clone(),
        ];
        if formats.contains(&AudioFormat::Flac) {
            tools.push(self.config.encoder_tool.clone());
        }
        tools
    }

    fn split(&self, pair: &CueAudioPair, _output_dir: &Path) -> Result<(), NasError> {
        let cwd = pair.directory();

        let breakpoints = self
            .runner
            .command(&self.config.breakpoints_tool, cwd)
            .arg(pair.cue_file())
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                Self::split_error(pair, format!("failed to run {}: {}", self.config.breakpoints_tool, e))
            })?;
        if !breakpoints.status.success() {
            return Err(Self::split_error(
                pair,
                describe_failure(&self.config.breakpoints_tool, &breakpoints),
            ));
        }
        if breakpoints.stdout.iter().all(u8::is_ascii_whitespace) {
            return Err(Self::split_error(
                pair,
                "cue sheet has no split points (single track?)".to_string(),
            ));
        }
        debug!(
            "Breakpoints for {}:\n{}",
            pair.cue_file(),
            String::from_utf8_lossy(&breakpoints.stdout).trim_end()
        );

        let mut child = self
            .runner
            .command(&self.config.split_tool, cwd)
            .arg("-o")
            .arg(pair.format().extension())
            .arg("-d")
            .arg(TEMP_SPLIT_DIR)
            .arg("-t")
            .arg(&self.config.track_name_format)
            .arg("-O")
            .arg("always")
            .arg(pair.audio_file())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                Self::split_error(pair, format!("failed to run {}: {}", self.config.split_tool, e))
            })?;

        // The child may exit before reading its offsets; its stderr says why
        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(&breakpoints.stdout) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                    debug!("{} closed its input early", self.config.split_tool);
                }
                Err(e) => warn!("Could not feed offsets to {}: {}", self.config.split_tool, e),
            }
        }

        let output = child.wait_with_output().map_err(|e| {
            Self::split_error(pair, format!("failed to wait for {}: {}", self.config.split_tool, e))
        })?;
        if !output.status.success() {
            return Err(Self::split_error(
                pair,
                describe_failure(&self.config.split_tool, &output),
            ));
        }
        Ok(())
    }

    fn tag(&self, pair: &CueAudioPair, tracks: &[PathBuf]) -> Result<TagOutcome, NasError> {
        if !tool_available(&self.config.tag_tool) {
            return Ok(TagOutcome::Unavailable);
        }

        let temp_dir = pair.temp_dir();
        let output = self
            .runner
            .command(&self.config.tag_tool, &temp_dir)
            .arg(pair.cue_path())
            .args(tracks.iter().filter_map(|t| t.file_name()))
            .stdin(Stdio::null())
            .output()?;

        if output.status.success() {
            Ok(TagOutcome::Tagged)
        } else {
            Err(Self::split_error(
                pair,
                describe_failure(&self.config.tag_tool, &output),
            ))
        }
    }
}

/// Track files of `format` currently inside `dir`, sorted by name
pub fn list_tracks(dir: &Path, format: AudioFormat) -> std::io::Result<Vec<PathBuf>> {
    let mut tracks = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && AudioFormat::from_path(&path) == Some(format) {
            tracks.push(path);
        }
    }
    tracks.sort();
    Ok(tracks)
}

/// Split one pair into `__temp_split`, then tag the result if possible.
///
/// Returns the produced track files. Tagging problems and track count
/// mismatches are only warnings.
pub fn split_pair<B: SplitBackend + ?Sized>(
    backend: &B,
    pair: &CueAudioPair,
) -> Result<Vec<PathBuf>, NasError> {
    let temp_dir = pair.temp_dir();
    fs::create_dir_all(&temp_dir)?;

    info!("Splitting {}", pair.audio_path().display());
    backend.split(pair, &temp_dir)?;

    let tracks = list_tracks(&temp_dir, pair.format())?;
    if tracks.is_empty() {
        return Err(NasError::Split {
            file: pair.audio_path(),
            message: format!("no {} tracks were produced", pair.format()),
        });
    }

    match read_cue_sheet(&pair.cue_path()) {
        Ok(sheet) if sheet.track_count() > 0 && sheet.track_count() != tracks.len() => {
            warn!(
                "{} lists {} track(s) but {} file(s) were produced",
                pair.cue_file(),
                sheet.track_count(),
                tracks.len()
            );
        }
        Ok(_) => {}
        Err(e) => debug!("Could not re-read {}: {}", pair.cue_file(), e),
    }

    match backend.tag(pair, &tracks) {
        Ok(TagOutcome::Tagged) => info!("Tagged {} track(s) from {}", tracks.len(), pair.cue_file()),
        Ok(TagOutcome::Unavailable) => warn!("Tagging tool not found, tracks left untagged"),
        Err(e) => warn!("Tagging failed, tracks left untagged: {}", e),
    }

    Ok(tracks)
}
