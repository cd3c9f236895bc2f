use std::path::{Path, PathBuf};

use crate::core::fetch::destination_dir;
use crate::core::{load_config, DownloadRequest, DownloadedFile, Downloader};
use crate::error::NasError;

/// Command-line flags for download
#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    pub url: String,
    /// Destination directory (defaults to the working directory)
    pub dest: Option<PathBuf>,
    pub referer: Option<String>,
    pub cookie: Option<String>,
    /// User-Agent override
    pub user_agent: Option<String>,
    /// Retries override
    pub retries: Option<u32>,
    /// Timeout override in seconds
    pub timeout: Option<u64>,
}

/// Fetch a single URL into the destination directory
pub async fn download_url(
    working_dir: &Path,
    config_path: Option<&Path>,
    options: DownloadOptions,
) -> Result<DownloadedFile, NasError> {
    let config = load_config(config_path, working_dir)?.with_download_overrides(
        options.retries,
        options.timeout,
        options.user_agent,
    );

    let downloader = Downloader::new(config.download)?;
    let request = DownloadRequest {
        url: options.url,
        dest_dir: destination_dir(options.dest.as_deref(), working_dir),
        referer: options.referer,
        cookie: options.cookie,
    };

    let file = downloader.download(&request).await?;
    println!("Saved {} ({} bytes)", file.path.display(), file.bytes);
    Ok(file)
}
