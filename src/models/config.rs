use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the config file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "nastools.toml";

/// Configuration loaded from nastools.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub split: SplitConfig,
    #[serde(default)]
    pub library: LibraryConfig,
    #[serde(default)]
    pub download: DownloadConfig,
}

/// External tools used by the cue splitting pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Emits split offsets for a cue sheet
    #[serde(default = "default_breakpoints_tool")]
    pub breakpoints_tool: String,
    /// Splits an audio file at offsets read from stdin
    #[serde(default = "default_split_tool")]
    pub split_tool: String,
    /// Copies cue sheet metadata into split tracks (optional)
    #[serde(default = "default_tag_tool")]
    pub tag_tool: String,
    /// Encoder required for FLAC input/output
    #[serde(default = "default_encoder_tool")]
    pub encoder_tool: String,
    /// UTF-8 locale forced on every tool invocation
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Output naming template passed to the split tool
    #[serde(default = "default_track_name_format")]
    pub track_name_format: String,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            breakpoints_tool: default_breakpoints_tool(),
            split_tool: default_split_tool(),
            tag_tool: default_tag_tool(),
            encoder_tool: default_encoder_tool(),
            locale: default_locale(),
            track_name_format: default_track_name_format(),
        }
    }
}

fn default_breakpoints_tool() -> String {
    "cuebreakpoints".to_string()
}

fn default_split_tool() -> String {
    "shnsplit".to_string()
}

fn default_tag_tool() -> String {
    "cuetag".to_string()
}

fn default_encoder_tool() -> String {
    "flac".to_string()
}

fn default_locale() -> String {
    "C.UTF-8".to_string()
}

fn default_track_name_format() -> String {
    "%n. %t".to_string()
}

/// Directories used by move-completed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Folder holding finished downloads
    #[serde(default)]
    pub source_dir: Option<PathBuf>,
    /// Root of the artist-organized library
    #[serde(default)]
    pub target_dir: Option<PathBuf>,
    /// Where album copies are kept before moving
    #[serde(default)]
    pub backup_dir: Option<PathBuf>,
}

/// Download command defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Retries after the first attempt
    #[serde(default = "default_retries")]
    pub retries: u32,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Backoff step; attempt N waits (N - 1) * backoff_ms
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            retries: default_retries(),
            timeout_seconds: default_timeout(),
            backoff_ms: default_backoff_ms(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_retries() -> u32 {
    3
}

fn default_timeout() -> u64 {
    30
}

fn default_backoff_ms() -> u64 {
    500
}

fn default_user_agent() -> String {
    format!("nastools/{}", env!("CARGO_PKG_VERSION"))
}

impl Config {
    /// Load config from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e))?;
        toml::from_str(&contents).map_err(|e| ConfigError::ParseError(path.to_path_buf(), e))
    }

    /// Try to load config from nastools.toml in the given directory
    pub fn load_from_dir(dir: &Path) -> Result<Self, ConfigError> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Merge move-completed CLI overrides into the config
    pub fn with_library_overrides(
        mut self,
        source_dir: Option<PathBuf>,
        target_dir: Option<PathBuf>,
        backup_dir: Option<PathBuf>,
    ) -> Self {
        if let Some(s) = source_dir {
            self.library.source_dir = Some(s);
        }
        if let Some(t) = target_dir {
            self.library.target_dir = Some(t);
        }
        if let Some(b) = backup_dir {
            self.library.backup_dir = Some(b);
        }
        self
    }

    /// Merge download CLI overrides into the config
    pub fn with_download_overrides(
        mut self,
        retries: Option<u32>,
        timeout: Option<u64>,
        user_agent: Option<String>,
    ) -> Self {
        if let Some(r) = retries {
            self.download.retries = r;
        }
        if let Some(t) = timeout {
            self.download.timeout_seconds = t;
        }
        if let Some(ua) = user_agent {
            self.download.user_agent = ua;
        }
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(PathBuf, std::io::Error),
    #[error("Failed to parse config file {0}: {1}")]
    ParseError(PathBuf, toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.split.breakpoints_tool, "cuebreakpoints");
        assert_eq!(config.split.split_tool, "shnsplit");
        assert_eq!(config.split.tag_tool, "cuetag");
        assert_eq!(config.split.locale, "C.UTF-8");
        assert_eq!(config.split.track_name_format, "%n. %t");
        assert_eq!(config.download.retries, 3);
        assert_eq!(config.download.timeout_seconds, 30);
        assert_eq!(config.download.backoff_ms, 500);
        assert!(config.download.user_agent.starts_with("nastools/"));
        assert!(config.library.source_dir.is_none());
    }

    #[test]
    fn test_config_with_overrides() {
        let config = Config::default()
            .with_library_overrides(Some(PathBuf::from("/dl")), None, Some(PathBuf::from("/bak")))
            .with_download_overrides(Some(1), Some(5), Some("curl/8".to_string()));
        assert_eq!(config.library.source_dir, Some(PathBuf::from("/dl")));
        assert!(config.library.target_dir.is_none());
        assert_eq!(config.library.backup_dir, Some(PathBuf::from("/bak")));
        assert_eq!(config.download.retries, 1);
        assert_eq!(config.download.timeout_seconds, 5);
        assert_eq!(config.download.user_agent, "curl/8");
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
[split]
split_tool = "/opt/shntool/bin/shnsplit"
locale = "en_US.UTF-8"

[library]
source_dir = "/volume1/downloads/complete"
target_dir = "/volume1/music"

[download]
retries = 5
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.split.split_tool, "/opt/shntool/bin/shnsplit");
        assert_eq!(config.split.locale, "en_US.UTF-8");
        assert_eq!(config.split.breakpoints_tool, "cuebreakpoints"); // default
        assert_eq!(
            config.library.target_dir,
            Some(PathBuf::from("/volume1/music"))
        );
        assert!(config.library.backup_dir.is_none());
        assert_eq!(config.download.retries, 5);
        assert_eq!(config.download.backoff_ms, 500); // default
    }
}
