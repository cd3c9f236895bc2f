use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::models::{AlbumMove, ResolvedArtist, BUCKETS, OTHER_BUCKET};

/// Fold common accented Latin capitals to their ASCII base letter
fn ascii_fold(c: char) -> char {
    match c {
        'À'..='Å' => 'A',
        'Ç' => 'C',
        'È'..='Ë' => 'E',
        'Ì'..='Ï' => 'I',
        'Ñ' => 'N',
        'Ò'..='Ö' | 'Ø' => 'O',
        'Ù'..='Ü' => 'U',
        'Ý' | 'Ÿ' => 'Y',
        'Š' => 'S',
        'Ž' => 'Z',
        other => other,
    }
}

/// Alphabetical bucket for an artist, keyed on its first alphanumeric character
pub fn bucket_for(artist: &str) -> &'static str {
    let Some(first) = artist.chars().find(|c| c.is_alphanumeric()) else {
        return OTHER_BUCKET;
    };
    let letter = first.to_uppercase().next().map(ascii_fold).unwrap_or(first);

    BUCKETS
        .iter()
        .find(|(_, start, end)| (*start..=*end).contains(&letter))
        .map(|(name, _, _)| *name)
        .unwrap_or(OTHER_BUCKET)
}

/// Make a name safe to use as a single path component
pub fn sanitize_component(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    cleaned.trim().trim_end_matches('.').trim().to_string()
}

/// `path` if free, otherwise the first free `"<name> (n)"` sibling
pub fn unique_destination(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let parent = path.parent().unwrap_or_else(|| Path::new(""));

    let mut n = 1;
    loop {
        let candidate = parent.join(format!("{} ({})", name, n));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

/// Work out where an album folder goes: `<target>/<bucket>/<artist>/<album>`
pub fn plan_album_move(source: &Path, artist: ResolvedArtist, target_root: &Path) -> AlbumMove {
    let bucket = bucket_for(&artist.name);
    let album_name = source
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let destination = unique_destination(
        &target_root
            .join(bucket)
            .join(sanitize_component(&artist.name))
            .join(album_name),
    );

    AlbumMove {
        source: source.to_path_buf(),
        artist,
        bucket,
        destination,
    }
}

/// Recursively copy a directory tree
pub fn copy_dir_recursive(source: &Path, destination: &Path) -> std::io::Result<()> {
    for entry in WalkDir::new(source) {
        let entry = entry.map_err(std::io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Move a directory, falling back to copy + remove across filesystems
pub fn move_dir(source: &Path, destination: &Path) -> std::io::Result<()> {
    if destination.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("{} already exists", destination.display()),
        ));
    }
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }

    if let Err(e) = fs::rename(source, destination) {
        debug!("rename failed ({}), copying {} instead", e, source.display());
        copy_then_remove_dir(source, destination)?;
    }
    Ok(())
}

/// Copy fallback for `move_dir`. A failed copy removes what it wrote and
/// leaves the source alone.
fn copy_then_remove_dir(source: &Path, destination: &Path) -> std::io::Result<()> {
    if let Err(e) = copy_dir_recursive(source, destination) {
        if let Err(cleanup) = fs::remove_dir_all(destination) {
            debug!("could not remove partial copy {}: {}", destination.display(), cleanup);
        }
        return Err(e);
    }
    fs::remove_dir_all(source)
}

/// Copy an album into `<backup_root>/<date>/<album>` and return where it went
pub fn backup_album(source: &Path, backup_root: &Path, date: &str) -> std::io::Result<PathBuf> {
    let album_name = source.file_name().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{} has no folder name", source.display()),
        )
    })?;
    let destination = unique_destination(&backup_root.join(date).join(album_name));
    copy_dir_recursive(source, &destination)?;
    Ok(destination)
}
