use std::fmt;
use std::path::PathBuf;

/// Which inference strategy produced an artist name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtistStrategy {
    FolderName,
    AudioTags,
    CuePerformer,
    Prompt,
}

impl fmt::Display for ArtistStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtistStrategy::FolderName => "folder name",
            ArtistStrategy::AudioTags => "audio tags",
            ArtistStrategy::CuePerformer => "cue performer",
            ArtistStrategy::Prompt => "prompt",
        };
        f.write_str(name)
    }
}

/// An artist name together with the strategy that found it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtist {
    pub name: String,
    pub strategy: ArtistStrategy,
}

/// Alphabetical library buckets, in order
pub const BUCKETS: &[(&str, char, char)] = &[
    ("A-D", 'A', 'D'),
    ("E-F", 'E', 'F'),
    ("G-I", 'G', 'I'),
    ("J-M", 'J', 'M'),
    ("N-Q", 'N', 'Q'),
    ("R-T", 'R', 'T'),
    ("U-Z", 'U', 'Z'),
];

/// Bucket for artists that do not start with a Latin letter
pub const OTHER_BUCKET: &str = "#";

/// One planned relocation of an album folder into the library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumMove {
    pub source: PathBuf,
    pub artist: ResolvedArtist,
    pub bucket: &'static str,
    pub destination: PathBuf,
}

impl fmt::Display for AlbumMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} [{}]",
            self.source.display(),
            self.destination.display(),
            self.artist.strategy
        )
    }
}

/// Counts reported by move-completed
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MoveSummary {
    /// Albums listed by a dry run
    pub planned: usize,
    pub moved: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Backups that could not be written (moves still went ahead)
    pub backup_warnings: usize,
}

impl MoveSummary {
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

impl fmt::Display for MoveSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.planned > 0 {
            writeln!(f, "Planned:  {}", self.planned)?;
        }
        writeln!(f, "Moved:    {}", self.moved)?;
        writeln!(f, "Skipped:  {}", self.skipped)?;
        write!(f, "Failed:   {}", self.failed)?;
        if self.backup_warnings > 0 {
            write!(f, "\nBackup warnings: {}", self.backup_warnings)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_album_move_display() {
        let plan = AlbumMove {
            source: PathBuf::from("/dl/Air - Moon Safari"),
            artist: ResolvedArtist {
                name: "Air".to_string(),
                strategy: ArtistStrategy::FolderName,
            },
            bucket: "A-D",
            destination: PathBuf::from("/music/A-D/Air/Air - Moon Safari"),
        };
        assert_eq!(
            plan.to_string(),
            "/dl/Air - Moon Safari -> /music/A-D/Air/Air - Moon Safari [folder name]"
        );
    }

    #[test]
    fn test_move_summary_display() {
        let summary = MoveSummary {
            moved: 2,
            skipped: 1,
            ..Default::default()
        };
        assert_eq!(summary.to_string(), "Moved:    2\nSkipped:  1\nFailed:   0");
        assert!(!summary.has_failures());
    }
}
