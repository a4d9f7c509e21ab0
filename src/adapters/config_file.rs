//! Filesystem access for `vmlaunch.toml`.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::domain::config::{CONFIG_TEMPLATE, parse_config_content};
use crate::domain::{AppConfig, AppError};

/// Load and validate the configuration at `path`.
pub fn load_config(path: &Path) -> Result<AppConfig, AppError> {
    if !path.is_file() {
        return Err(AppError::ConfigMissing);
    }
    debug!(path = %path.display(), "loading configuration");
    let content = fs::read_to_string(path)?;
    parse_config_content(&content)
}

/// Write the starter configuration, refusing to clobber an existing file unless `force`.
pub fn write_template(path: &Path, force: bool) -> Result<(), AppError> {
    if path.exists() && !force {
        return Err(AppError::ConfigExists(path.display().to_string()));
    }
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, CONFIG_TEMPLATE)?;
    Ok(())
}
