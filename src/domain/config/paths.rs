use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "vmlaunch.toml";

/// Environment variable naming an alternative configuration file.
pub const CONFIG_ENV: &str = "VMLAUNCH_CONFIG";

/// `<root>/vmlaunch.toml`
pub fn config(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Pick the configuration file: explicit path, then `$VMLAUNCH_CONFIG`, then `<cwd>/vmlaunch.toml`.
pub fn resolve(explicit: Option<&Path>, env_value: Option<OsString>, cwd: &Path) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    match env_value {
        Some(value) if !value.is_empty() => PathBuf::from(value),
        _ => config(cwd),
    }
}
