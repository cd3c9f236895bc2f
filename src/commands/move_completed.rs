use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::core::{
    backup_album, load_config, move_dir, plan_album_move, ArtistResolver, PromptSource, Prompter,
    TerminalPrompter,
};
use crate::error::NasError;
use crate::models::MoveSummary;

/// Command-line flags for move-completed
#[derive(Debug, Clone, Default)]
pub struct MoveOptions {
    pub source_dir: Option<PathBuf>,
    pub target_dir: Option<PathBuf>,
    pub backup_dir: Option<PathBuf>,
    /// Print the plan without touching anything
    pub dry_run: bool,
    /// Confirm each move and ask for artists that cannot be inferred
    pub interactive: bool,
}

/// Album folders directly under `source`, hidden entries excluded, sorted by name
pub fn album_folders(source: &Path) -> Result<Vec<PathBuf>, NasError> {
    let mut folders = Vec::new();
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        folders.push(entry.path());
    }
    folders.sort();
    Ok(folders)
}

/// Move finished album folders into the artist-bucketed library
pub fn move_completed(
    working_dir: &Path,
    config_path: Option<&Path>,
    options: MoveOptions,
) -> Result<MoveSummary, NasError> {
    let config = load_config(config_path, working_dir)?.with_library_overrides(
        options.source_dir.clone(),
        options.target_dir.clone(),
        options.backup_dir.clone(),
    );

    let source = config.library.source_dir.ok_or_else(|| {
        NasError::InvalidInput(
            "no source directory: pass --source-dir or set [library] source_dir".to_string(),
        )
    })?;
    let target = config.library.target_dir.ok_or_else(|| {
        NasError::InvalidInput(
            "no target directory: pass --target-dir or set [library] target_dir".to_string(),
        )
    })?;

    let mut prompter = TerminalPrompter::new();
    let summary = organize_albums(
        &working_dir.join(source),
        &working_dir.join(target),
        config.library.backup_dir.map(|b| working_dir.join(b)).as_deref(),
        &options,
        &mut prompter,
    )?;

    println!("\n=== Move Summary ===");
    println!("{}", summary);
    Ok(summary)
}

/// Plan and carry out the moves for every album folder in `source`.
///
/// Stops at the first failed move; the albums after it count as skipped.
pub fn organize_albums<P: Prompter>(
    source: &Path,
    target: &Path,
    backup: Option<&Path>,
    options: &MoveOptions,
    prompter: &mut P,
) -> Result<MoveSummary, NasError> {
    if !source.is_dir() {
        return Err(NasError::DirectoryNotFound(source.to_path_buf()));
    }

    let albums: Vec<PathBuf> = album_folders(source)?
        .into_iter()
        .filter(|album| album.as_path() != target)
        .collect();
    let mut summary = MoveSummary::default();

    if albums.is_empty() {
        println!("No album folders found in {}", source.display());
        return Ok(summary);
    }

    let ask_for_artist = options.interactive && !options.dry_run;
    let date = chrono::Local::now().format("%Y-%m-%d").to_string();
    let total = albums.len();

    for (idx, album) in albums.into_iter().enumerate() {
        let resolved = if ask_for_artist {
            ArtistResolver::standard()
                .with(PromptSource::new(&mut *prompter))
                .resolve(&album)?
        } else {
            ArtistResolver::standard().resolve(&album)?
        };

        let Some(artist) = resolved else {
            warn!("Could not determine the artist of {}, skipping", album.display());
            summary.skipped += 1;
            continue;
        };

        let plan = plan_album_move(&album, artist, target);
        if options.dry_run {
            println!("{}", plan);
            summary.planned += 1;
            continue;
        }

        if options.interactive && !prompter.confirm(&format!("Move {}?", plan), true)? {
            info!("Skipped {}", album.display());
            summary.skipped += 1;
            continue;
        }

        if let Some(backup_root) = backup {
            match backup_album(&album, backup_root, &date) {
                Ok(copy) => info!("Backed up to {}", copy.display()),
                Err(e) => {
                    warn!("Backup of {} failed: {}", album.display(), e);
                    summary.backup_warnings += 1;
                }
            }
        }

        match move_dir(&plan.source, &plan.destination) {
            Ok(()) => {
                println!("Moved: {}", plan);
                summary.moved += 1;
            }
            Err(e) => {
                let err = NasError::Move {
                    album: plan.source.clone(),
                    message: e.to_string(),
                };
                error!("{}", err);
                summary.failed += 1;

                let remaining = total - (idx + 1);
                if remaining > 0 {
                    println!("\nStopping after failure, {} album(s) not attempted", remaining);
                }
                summary.skipped += remaining;
                break;
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AssumeYes;
    use tempfile::TempDir;

    fn album(root: &Path, name: &str) -> PathBuf {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("01. Intro.flac"), b"audio").unwrap();
        dir
    }

    #[test]
    fn test_album_folders_skips_hidden_and_files() {
        let temp_dir = TempDir::new().unwrap();
        album(temp_dir.path(), "B - Second");
        album(temp_dir.path(), "A - First");
        fs::create_dir(temp_dir.path().join(".incomplete")).unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "").unwrap();

        let folders = album_folders(temp_dir.path()).unwrap();
        assert_eq!(
            folders,
            vec![
                temp_dir.path().join("A - First"),
                temp_dir.path().join("B - Second")
            ]
        );
    }

    #[test]
    fn test_organize_moves_into_bucket() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("done");
        let target = temp_dir.path().join("music");
        album(&source, "Metallica - 1986 - Master of Puppets");

        let summary = organize_albums(
            &source,
            &target,
            None,
            &MoveOptions::default(),
            &mut AssumeYes,
        )
        .unwrap();

        assert_eq!(summary.moved, 1);
        assert!(target
            .join("J-M")
            .join("Metallica")
            .join("Metallica - 1986 - Master of Puppets")
            .join("01. Intro.flac")
            .is_file());
        assert!(!source.join("Metallica - 1986 - Master of Puppets").exists());
    }

    #[test]
    fn test_organize_skips_unknown_artist() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("done");
        album(&source, "Untitled");

        let summary = organize_albums(
            &source,
            &temp_dir.path().join("music"),
            None,
            &MoveOptions::default(),
            &mut AssumeYes,
        )
        .unwrap();

        assert_eq!(summary.skipped, 1);
        assert!(source.join("Untitled").is_dir());
    }

    #[test]
    fn test_organize_missing_source() {
        let temp_dir = TempDir::new().unwrap();
        let result = organize_albums(
            &temp_dir.path().join("nope"),
            temp_dir.path(),
            None,
            &MoveOptions::default(),
            &mut AssumeYes,
        );
        assert!(matches!(result, Err(NasError::DirectoryNotFound(_))));
    }

    #[test]
    fn test_move_completed_requires_target() {
        let temp_dir = TempDir::new().unwrap();
        let options = MoveOptions {
            source_dir: Some(temp_dir.path().to_path_buf()),
            ..Default::default()
        };
        let result = move_completed(temp_dir.path(), None, options);
        assert!(matches!(result, Err(NasError::InvalidInput(_))));
    }
}
