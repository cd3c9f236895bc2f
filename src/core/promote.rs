//! Promotion of split output into the album directory.
//!
//! Cleanup is a sequence of steps that can each be re-run safely:
//! move every track out of `__temp_split`, delete the original cue/audio only
//! when nothing is left to move, then drop the temp directory. Running it
//! again on a half-finished directory picks up where the last run stopped.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::NasError;
use crate::models::{is_cue_file, AudioFormat, CueAudioPair};

/// What a cleanup pass did
#[derive(Debug, Default)]
pub struct CleanupReport {
    /// Destination paths of files moved out of the temp dir
    pub moved: Vec<PathBuf>,
    pub failed_moves: Vec<(PathBuf, String)>,
    pub deleted: Vec<PathBuf>,
    /// Originals that were already gone at delete time
    pub already_missing: Vec<PathBuf>,
    pub temp_dir_removed: bool,
}

impl CleanupReport {
    pub fn is_complete(&self) -> bool {
        self.failed_moves.is_empty() && self.temp_dir_removed
    }
}

/// Files the promote step carries over: audio tracks and cue sheets
fn is_promotable(path: &Path) -> bool {
    path.is_file() && (AudioFormat::from_path(path).is_some() || is_cue_file(path))
}

fn promotable_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if is_promotable(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Rename a file, falling back to copy + remove across filesystems.
/// Never overwrites an existing destination.
pub fn move_file(source: &Path, destination: &Path) -> std::io::Result<()> {
    if destination.exists() {
        return Err(std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!("{} already exists", destination.display()),
        ));
    }
    if let Err(e) = fs::rename(source, destination) {
        debug!("rename failed ({}), copying {} instead", e, source.display());
        if let Err(e) = fs::copy(source, destination) {
            // Drop a partly written copy so a re-run can retry the move
            let _ = fs::remove_file(destination);
            return Err(e);
        }
        fs::remove_file(source)?;
    }
    Ok(())
}

/// Remove a file, treating "already gone" as success (returns false)
fn remove_if_present(path: &Path) -> std::io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Make a successful split permanent for `pair`.
///
/// Originals are only deleted once every track has left the temp dir. A
/// failed move is returned as an error after the report has been logged;
/// nothing is deleted in that case.
pub fn promote_split(pair: &CueAudioPair) -> Result<CleanupReport, NasError> {
    let mut report = CleanupReport::default();
    let temp_dir = pair.temp_dir();
    let directory = pair.directory();

    if temp_dir.is_dir() {
        for source in promotable_files(&temp_dir)? {
            let Some(name) = source.file_name() else {
                continue;
            };
            let destination = directory.join(name);
            match move_file(&source, &destination) {
                Ok(()) => {
                    debug!("Moved {} -> {}", source.display(), destination.display());
                    report.moved.push(destination);
                }
                Err(e) => {
                    warn!("Could not move {}: {}", source.display(), e);
                    report.failed_moves.push((source, e.to_string()));
                }
            }
        }

        if !report.failed_moves.is_empty() {
            let names: Vec<String> = report
                .failed_moves
                .iter()
                .map(|(p, e)| format!("{} ({})", p.display(), e))
                .collect();
            return Err(NasError::Cleanup {
                dir: directory.to_path_buf(),
                message: format!(
                    "{} file(s) could not be moved, originals kept: {}",
                    names.len(),
                    names.join(", ")
                ),
            });
        }

        let remaining = promotable_files(&temp_dir)?;
        if !remaining.is_empty() {
            return Err(NasError::Cleanup {
                dir: directory.to_path_buf(),
                message: format!(
                    "{} file(s) appeared in {} during cleanup, originals kept",
                    remaining.len(),
                    temp_dir.display()
                ),
            });
        }
    } else if pair.cue_path().exists() || pair.audio_path().exists() {
        // The temp dir is removed last, so its absence with originals still
        // present means there was never any split output
        return Err(NasError::Cleanup {
            dir: directory.to_path_buf(),
            message: format!("no {} found, originals kept", temp_dir.display()),
        });
    } else {
        debug!("No temp dir in {}, nothing to move", directory.display());
    }

    for original in [pair.cue_path(), pair.audio_path()] {
        if remove_if_present(&original)? {
            report.deleted.push(original);
        } else {
            info!("{} was already removed", original.display());
            report.already_missing.push(original);
        }
    }

    match fs::remove_dir_all(&temp_dir) {
        Ok(()) => report.temp_dir_removed = true,
        Err(e) if e.kind() == ErrorKind::NotFound => report.temp_dir_removed = true,
        Err(e) => {
            return Err(NasError::Cleanup {
                dir: directory.to_path_buf(),
                message: format!("could not remove {}: {}", temp_dir.display(), e),
            })
        }
    }

    info!(
        "Promoted {} file(s) into {}, removed {} original(s)",
        report.moved.len(),
        directory.display(),
        report.deleted.len()
    );
    Ok(report)
}
