use std::path::PathBuf;
use thiserror::Error;

use crate::models::ConfigError;

/// Main error type for nastools
#[derive(Error, Debug)]
pub enum NasError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Required tool(s) not found in PATH: {}\n{hint}", tools.join(", "))]
    MissingTools { tools: Vec<String>, hint: String },

    #[error("Split failed for {file}: {message}")]
    Split { file: PathBuf, message: String },

    #[error("Cleanup failed in {dir}: {message}")]
    Cleanup { dir: PathBuf, message: String },

    #[error("Failed to move {album}: {message}")]
    Move { album: PathBuf, message: String },

    #[error("Download error: {0}")]
    Download(#[from] DownloadError),

    #[error("Failed to get user input: {0}")]
    Prompt(String),
}

/// Errors related to HTTP downloads
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    #[error("HTTP error: {status} - {message}")]
    HttpError { status: u16, message: String },

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Giving up after {attempts} attempt(s): {last_error}")]
    RetriesExhausted {
        attempts: u32,
        last_error: Box<DownloadError>,
    },
}

impl From<reqwest::Error> for DownloadError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DownloadError::Timeout(0)
        } else if err.is_connect() {
            DownloadError::ConnectionFailed(err.to_string())
        } else if let Some(status) = err.status() {
            DownloadError::HttpError {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            DownloadError::RequestFailed(err.to_string())
        }
    }
}

impl From<dialoguer::Error> for NasError {
    fn from(err: dialoguer::Error) -> Self {
        NasError::Prompt(err.to_string())
    }
}

impl NasError {
    /// Dependency error for tools missing from PATH, with an install hint
    pub fn missing_tools(tools: Vec<String>) -> Self {
        let mut packages: Vec<&str> = tools
            .iter()
            .map(|t| match t.rsplit('/').next().unwrap_or(t) {
                "cuebreakpoints" | "cuetag" => "cuetools",
                "shnsplit" => "shntool",
                "flac" => "flac",
                other => other,
            })
            .collect();
        packages.sort_unstable();
        packages.dedup();
        let hint = format!(
            "Install them first (e.g. `apt install {}`) and re-run.",
            packages.join(" ")
        );

        NasError::MissingTools { tools, hint }
    }
}

pub type Result<T> = std::result::Result<T, NasError>;
