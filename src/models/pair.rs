use std::fmt;
use std::path::{Path, PathBuf};

/// Name of the per-directory folder the split tool writes into.
/// Its presence marks a split that was started but never promoted.
pub const TEMP_SPLIT_DIR: &str = "__temp_split";

/// Audio formats that can be split from a cue sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AudioFormat {
    Flac,
    Wav,
}

impl AudioFormat {
    /// All supported formats, in pairing precedence order
    pub fn all() -> &'static [AudioFormat] {
        &[AudioFormat::Flac, AudioFormat::Wav]
    }

    /// File extension (lowercase, without dot)
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Flac => "flac",
            AudioFormat::Wav => "wav",
        }
    }

    /// Detect the format from a file name, case-insensitively
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        Self::all().iter().copied().find(|f| f.extension() == ext)
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioFormat::Flac => write!(f, "FLAC"),
            AudioFormat::Wav => write!(f, "WAV"),
        }
    }
}

/// Whether a file name carries a `.cue` extension (any case)
pub fn is_cue_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("cue"))
        .unwrap_or(false)
}

/// One candidate split job: a cue sheet and the audio image it describes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CueAudioPair {
    directory: PathBuf,
    cue_file: String,
    audio_file: String,
    format: AudioFormat,
    /// Split output was already partly promoted by an earlier run
    interrupted: bool,
}

impl CueAudioPair {
    /// Build a pair, returning None when the two names break the pairing rules
    /// (different basenames or unsupported extensions).
    pub fn new(directory: impl Into<PathBuf>, cue_file: &str, audio_file: &str) -> Option<Self> {
        let cue_path = Path::new(cue_file);
        let audio_path = Path::new(audio_file);
        if !is_cue_file(cue_path) {
            return None;
        }
        let format = AudioFormat::from_path(audio_path)?;
        if cue_path.file_stem()? != audio_path.file_stem()? {
            return None;
        }
        Some(Self {
            directory: directory.into(),
            cue_file: cue_file.to_string(),
            audio_file: audio_file.to_string(),
            format,
            interrupted: false,
        })
    }

    /// Mark the pair as an interrupted cleanup: its tracks only need promoting
    pub fn with_interrupted_cleanup(mut self) -> Self {
        self.interrupted = true;
        self
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn cue_file(&self) -> &str {
        &self.cue_file
    }

    pub fn audio_file(&self) -> &str {
        &self.audio_file
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    pub fn cue_path(&self) -> PathBuf {
        self.directory.join(&self.cue_file)
    }

    pub fn audio_path(&self) -> PathBuf {
        self.directory.join(&self.audio_file)
    }

    /// Folder the split tool writes tracks into
    pub fn temp_dir(&self) -> PathBuf {
        self.directory.join(TEMP_SPLIT_DIR)
    }
}

impl fmt::Display for CueAudioPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} + {})",
            self.directory.display(),
            self.cue_file,
            self.audio_file
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_requires_matching_basename() {
        assert!(CueAudioPair::new("/music/a", "album.cue", "album.flac").is_some());
        assert!(CueAudioPair::new("/music/a", "album.cue", "other.flac").is_none());
    }

    #[test]
    fn test_pair_extensions_case_insensitive() {
        let pair = CueAudioPair::new("/music/a", "Album.CUE", "Album.WAV").unwrap();
        assert_eq!(pair.format(), AudioFormat::Wav);
        assert!(CueAudioPair::new("/music/a", "album.cue", "album.mp3").is_none());
        assert!(CueAudioPair::new("/music/a", "album.txt", "album.flac").is_none());
    }

    #[test]
    fn test_pair_paths() {
        let pair = CueAudioPair::new("/music/a", "x.cue", "x.flac").unwrap();
        assert_eq!(pair.cue_path(), PathBuf::from("/music/a/x.cue"));
        assert_eq!(pair.audio_path(), PathBuf::from("/music/a/x.flac"));
        assert_eq!(pair.temp_dir(), PathBuf::from("/music/a/__temp_split"));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(AudioFormat::from_path(Path::new("a.FlAc")), Some(AudioFormat::Flac));
        assert_eq!(AudioFormat::from_path(Path::new("a.ape")), None);
        assert_eq!(AudioFormat::from_path(Path::new("flac")), None);
    }
}
