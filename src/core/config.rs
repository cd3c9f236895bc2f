use std::path::Path;
use tracing::debug;

use crate::error::NasError;
use crate::models::Config;

/// Load configuration from an explicit file, or from nastools.toml in `working_dir`
pub fn load_config(config_path: Option<&Path>, working_dir: &Path) -> Result<Config, NasError> {
    let config = match config_path {
        Some(path) => Config::load_from_file(path)?,
        None => Config::load_from_dir(working_dir)?,
    };

    debug!(
        "Configuration loaded: split_tool={}, locale={}, retries={}, timeout={}s",
        config.split.split_tool,
        config.split.locale,
        config.download.retries,
        config.download.timeout_seconds
    );

    Ok(config)
}
