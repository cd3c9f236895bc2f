//! Artist name inference for album folders.
//!
//! An ordered chain of strategies, each of which may or may not come up
//! with a name; the first one that does wins.

use lofty::file::TaggedFileExt;
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;
use walkdir::WalkDir;

use crate::core::cue::read_cue_sheet;
use crate::core::prompt::Prompter;
use crate::error::NasError;
use crate::models::{is_cue_file, ArtistStrategy, ResolvedArtist};

/// Extensions read by the audio tag strategy
const TAGGED_AUDIO_EXTENSIONS: &[&str] = &["flac", "mp3", "m4a", "ogg", "wav", "ape", "wv"];

/// One way of guessing the artist of an album folder
pub trait ArtistSource {
    fn strategy(&self) -> ArtistStrategy;

    fn resolve(&mut self, album_dir: &Path) -> Result<Option<String>, NasError>;
}

fn folder_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            // Artist - 1999 - Album
            r"^(?P<artist>.+?)\s+-\s+(?:19|20)\d{2}\s+-\s+.+$",
            // [1999] Artist - Album, (1999) Artist - Album
            r"^[\[(](?:19|20)\d{2}[\])]\s*(?P<artist>.+?)\s+-\s+.+$",
            // Artist - Album (1999), Artist - Album [1999]
            r"^(?P<artist>.+?)\s+-\s+.+?\s*[\[(](?:19|20)\d{2}[\])]$",
            // Artist - Album
            r"^(?P<artist>.+?)\s+-\s+.+$",
            // Artist_-_Album
            r"^(?P<artist>.+?)_-_.+$",
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    })
}

/// Match the folder name against common release naming patterns
pub fn artist_from_folder_name(name: &str) -> Option<String> {
    let name = name.trim();
    folder_patterns().iter().find_map(|re| {
        let artist = re.captures(name)?.name("artist")?.as_str();
        let artist = artist.replace('_', " ");
        let artist = artist.trim();
        if artist.is_empty() || artist.chars().all(|c| c.is_ascii_digit()) {
            None
        } else {
            Some(artist.to_string())
        }
    })
}

/// Matches `Artist - Album` style folder names
pub struct FolderNameSource;

impl ArtistSource for FolderNameSource {
    fn strategy(&self) -> ArtistStrategy {
        ArtistStrategy::FolderName
    }

    fn resolve(&mut self, album_dir: &Path) -> Result<Option<String>, NasError> {
        Ok(album_dir
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(artist_from_folder_name))
    }
}

/// First file under `album_dir` (sorted walk order) accepted by `keep`
fn first_file(album_dir: &Path, keep: impl Fn(&Path) -> bool) -> Option<PathBuf> {
    WalkDir::new(album_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .find(|p| keep(p.as_path()))
}

/// Reads album artist / artist tags from the first audio file
pub struct AudioTagSource;

impl AudioTagSource {
    fn read_artist(path: &Path) -> Option<String> {
        let tagged_file = match Probe::open(path).and_then(|p| p.read()) {
            Ok(f) => f,
            Err(e) => {
                debug!("Could not read tags from {}: {}", path.display(), e);
                return None;
            }
        };
        let tag = tagged_file
            .primary_tag()
            .or_else(|| tagged_file.first_tag())?;

        tag.get_string(&ItemKey::AlbumArtist)
            .map(|s| s.to_string())
            .or_else(|| tag.artist().map(|s| s.to_string()))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

impl ArtistSource for AudioTagSource {
    fn strategy(&self) -> ArtistStrategy {
        ArtistStrategy::AudioTags
    }

    fn resolve(&mut self, album_dir: &Path) -> Result<Option<String>, NasError> {
        let audio = first_file(album_dir, |p| {
            p.extension()
                .and_then(|e| e.to_str())
                .map(|e| TAGGED_AUDIO_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
                .unwrap_or(false)
        });
        Ok(audio.and_then(|p| Self::read_artist(&p)))
    }
}

/// Uses the disc-level PERFORMER of the first cue sheet
pub struct CuePerformerSource;

impl ArtistSource for CuePerformerSource {
    fn strategy(&self) -> ArtistStrategy {
        ArtistStrategy::CuePerformer
    }

    fn resolve(&mut self, album_dir: &Path) -> Result<Option<String>, NasError> {
        let Some(cue) = first_file(album_dir, is_cue_file) else {
            return Ok(None);
        };
        Ok(read_cue_sheet(&cue)
            .ok()
            .and_then(|sheet| sheet.performer)
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty()))
    }
}

/// Asks the operator
pub struct PromptSource<'a, P: Prompter> {
    prompter: &'a mut P,
}

impl<'a, P: Prompter> PromptSource<'a, P> {
    pub fn new(prompter: &'a mut P) -> Self {
        Self { prompter }
    }
}

impl<P: Prompter> ArtistSource for PromptSource<'_, P> {
    fn strategy(&self) -> ArtistStrategy {
        ArtistStrategy::Prompt
    }

    fn resolve(&mut self, album_dir: &Path) -> Result<Option<String>, NasError> {
        let name = album_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.prompter
            .input(&format!("Artist for '{}' (empty to skip)", name))
    }
}

/// Ordered list of artist sources
pub struct ArtistResolver<'a> {
    sources: Vec<Box<dyn ArtistSource + 'a>>,
}

impl<'a> ArtistResolver<'a> {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// The non-interactive chain: folder name, audio tags, cue performer
    pub fn standard() -> Self {
        Self::new()
            .with(FolderNameSource)
            .with(AudioTagSource)
            .with(CuePerformerSource)
    }

    pub fn with(mut self, source: impl ArtistSource + 'a) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Try each source in order, stopping at the first name found
    pub fn resolve(&mut self, album_dir: &Path) -> Result<Option<ResolvedArtist>, NasError> {
        for source in &mut self.sources {
            if let Some(name) = source.resolve(album_dir)? {
                debug!(
                    "Artist for {} from {}: {}",
                    album_dir.display(),
                    source.strategy(),
                    name
                );
                return Ok(Some(ResolvedArtist {
                    name,
                    strategy: source.strategy(),
                }));
            }
        }
        Ok(None)
    }
}

impl Default for ArtistResolver<'_> {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_folder_name_patterns() {
        let cases = [
            ("Pink Floyd - 1973 - The Dark Side of the Moon", Some("Pink Floyd")),
            ("[1997] Radiohead - OK Computer", Some("Radiohead")),
            ("(1969) The Beatles - Abbey Road", Some("The Beatles")),
            ("Miles Davis - Kind of Blue (1959)", Some("Miles Davis")),
            ("Portishead - Dummy [1994]", Some("Portishead")),
            ("Massive Attack - Mezzanine", Some("Massive Attack")),
            ("Daft_Punk_-_Discovery", Some("Daft Punk")),
            ("  Björk - Homogenic  ", Some("Björk")),
            ("Dummy", None),
            ("1994 - Dummy", None),
        ];
        for (folder, expected) in cases {
            assert_eq!(
                artist_from_folder_name(folder).as_deref(),
                expected,
                "folder: {}",
                folder
            );
        }
    }

    #[test]
    fn test_cue_performer_source() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("disc.cue"),
            "PERFORMER \"Boards of Canada\"\nTRACK 01 AUDIO\n",
        )
        .unwrap();

        let found = CuePerformerSource.resolve(dir.path()).unwrap();
        assert_eq!(found.as_deref(), Some("Boards of Canada"));
    }

    #[test]
    fn test_audio_tag_source_ignores_unreadable_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("01.flac"), b"not really flac").unwrap();

        assert_eq!(AudioTagSource.resolve(dir.path()).unwrap(), None);
    }

    #[test]
    fn test_resolver_stops_at_first_success() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("Air - Moon Safari");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("a.cue"), "PERFORMER \"Someone Else\"\n").unwrap();

        let resolved = ArtistResolver::standard().resolve(&dir).unwrap().unwrap();
        assert_eq!(resolved.name, "Air");
        assert_eq!(resolved.strategy, ArtistStrategy::FolderName);
    }

    #[test]
    fn test_resolver_falls_through_to_cue() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("Moon Safari");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("a.cue"), "PERFORMER \"Air\"\n").unwrap();

        let resolved = ArtistResolver::standard().resolve(&dir).unwrap().unwrap();
        assert_eq!(resolved.name, "Air");
        assert_eq!(resolved.strategy, ArtistStrategy::CuePerformer);
    }

    #[test]
    fn test_resolver_nothing_found() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("Untitled");
        fs::create_dir(&dir).unwrap();

        assert_eq!(ArtistResolver::standard().resolve(&dir).unwrap(), None);
    }
}
