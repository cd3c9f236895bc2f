use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use walkdir::WalkDir;

use crate::models::{is_cue_file, AudioFormat, CueAudioPair, ScriptOptions, TEMP_SPLIT_DIR};

/// Finds directories holding an unsplit cue sheet + audio image
pub struct PairScanner {
    ignore_failed: bool,
}

impl PairScanner {
    pub fn new(options: &ScriptOptions) -> Self {
        Self {
            ignore_failed: options.ignore_failed,
        }
    }

    /// Recursively collect every pair under `root`, ordered by directory then cue name.
    ///
    /// An unreadable root is logged once and yields no pairs. Subdirectories
    /// that cannot be read are skipped.
    pub fn scan(&self, root: &Path) -> Vec<CueAudioPair> {
        if let Err(e) = fs::read_dir(root) {
            error!("Cannot read directory {}: {}", root.display(), e);
            return Vec::new();
        }

        let mut pairs = Vec::new();
        let mut walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = walker.next() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_dir() {
                continue;
            }
            // Split output is never a source
            if entry.depth() > 0 && entry.file_name() == OsStr::new(TEMP_SPLIT_DIR) {
                walker.skip_current_dir();
                continue;
            }

            let names = match list_entry_names(entry.path()) {
                Ok(names) => names,
                Err(e) => {
                    debug!("Skipping unreadable directory {}: {}", entry.path().display(), e);
                    continue;
                }
            };

            // Only this directory's own pairs are skipped; subdirectories are still scanned
            if self.ignore_failed && names.iter().any(|n| n == TEMP_SPLIT_DIR) {
                info!(
                    "Skipping {} (contains {} from an earlier split)",
                    entry.path().display(),
                    TEMP_SPLIT_DIR
                );
                continue;
            }

            pairs.extend(pairs_in_directory(entry.path(), &names));
        }

        pairs.sort_by(|a, b| {
            a.directory()
                .cmp(b.directory())
                .then_with(|| a.cue_file().cmp(b.cue_file()))
        });
        info!("Found {} cue/audio pair(s) under {}", pairs.len(), root.display());
        pairs
    }
}

/// Names of the direct children of `dir`; non-UTF-8 names are skipped
fn list_entry_names(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// Pair cue sheets with audio images among the entries of one directory.
///
/// FLAC wins over WAV when both share the cue's basename. A directory that
/// also holds audio files no cue sheet claims (tracks from a previous split)
/// is treated as already split and yields nothing.
pub fn pairs_in_directory(dir: &Path, names: &[String]) -> Vec<CueAudioPair> {
    // Hidden entries (AppleDouble `._x.flac`, NAS metadata) are never audio or cue sheets
    let file_names: Vec<&String> = names
        .iter()
        .filter(|n| !n.starts_with('.') && dir.join(n).is_file())
        .collect();

    let cue_files: Vec<&String> = file_names
        .iter()
        .copied()
        .filter(|n| is_cue_file(Path::new(n)))
        .collect();
    if cue_files.is_empty() {
        return Vec::new();
    }

    let mut audio_files: Vec<(AudioFormat, &String)> = file_names
        .iter()
        .filter_map(|n| AudioFormat::from_path(Path::new(n)).map(|f| (f, *n)))
        .collect();
    audio_files.sort();

    let cue_stems: HashSet<&OsStr> = cue_files
        .iter()
        .filter_map(|n| Path::new(n.as_str()).file_stem())
        .collect();
    let unclaimed = audio_files
        .iter()
        .filter(|(_, n)| {
            Path::new(n.as_str())
                .file_stem()
                .map(|stem| !cue_stems.contains(stem))
                .unwrap_or(true)
        })
        .count();
    // Tracks next to a leftover temp dir mean a cleanup stopped halfway
    let interrupted = unclaimed > 0 && dir.join(TEMP_SPLIT_DIR).is_dir();
    if interrupted {
        info!(
            "{} holds {} promoted track(s) and a {} folder, offering to finish its cleanup",
            dir.display(),
            unclaimed,
            TEMP_SPLIT_DIR
        );
    } else if unclaimed > 0 {
        debug!(
            "Skipping {}: {} audio file(s) without a cue sheet, looks already split",
            dir.display(),
            unclaimed
        );
        return Vec::new();
    }

    let mut pairs = Vec::new();
    for cue in cue_files {
        let matched = audio_files
            .iter()
            .find_map(|(_, audio)| CueAudioPair::new(dir.to_path_buf(), cue, audio));

        let Some(pair) = matched else {
            debug!("No audio file matches {}", dir.join(cue).display());
            continue;
        };

        // Files may disappear between listing and now
        if !(pair.cue_path().is_file() && pair.audio_path().is_file()) {
            debug!("Pair vanished before it could be accepted: {}", pair);
            continue;
        }

        if interrupted {
            pairs.push(pair.with_interrupted_cleanup());
        } else {
            pairs.push(pair);
        }
    }
    pairs
}

/// Every file currently inside a pair's directory, for display before confirming
pub fn directory_listing(dir: &Path) -> Vec<PathBuf> {
    list_entry_names(dir)
        .map(|names| names.into_iter().map(PathBuf::from).collect())
        .unwrap_or_default()
}
