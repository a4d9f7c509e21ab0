//! Pure parse/validate for tool configuration (`vmlaunch.toml`).

use crate::domain::{AppConfig, AppError};

/// Parse and validate configuration from TOML content.
pub fn parse_config_content(content: &str) -> Result<AppConfig, AppError> {
    let config: AppConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}
