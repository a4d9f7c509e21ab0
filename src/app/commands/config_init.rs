use std::path::Path;

use tracing::info;

use crate::adapters::config_file::write_template;
use crate::domain::AppError;

/// Write the starter configuration to `path`.
pub fn execute(path: &Path, force: bool) -> Result<(), AppError> {
    write_template(path, force)?;
    info!(path = %path.display(), "wrote configuration template");
    Ok(())
}
