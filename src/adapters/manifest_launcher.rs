//! Launcher handoff that records the committed configuration as a JSON manifest.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::domain::{AppError, InstanceConfiguration};
use crate::ports::Launcher;

/// JSON document handed to whatever spawns the emulator.
#[derive(Debug, Serialize)]
pub struct LaunchManifest {
    pub created_at: DateTime<Utc>,
    pub configuration: InstanceConfiguration,
    /// `-machine`, `-cpu`, `-smp`, `-m` and `-device` fragments.
    pub arguments: Vec<String>,
}

impl LaunchManifest {
    pub fn new(configuration: InstanceConfiguration, host_cores: u16) -> Self {
        let arguments = configuration.argument_fragments(host_cores);
        Self { created_at: Utc::now(), configuration, arguments }
    }
}

/// Writes the manifest to a file, or to stdout when no path is set.
#[derive(Debug, Clone)]
pub struct ManifestLauncher {
    output: Option<PathBuf>,
    host_cores: u16,
}

impl ManifestLauncher {
    pub fn new(output: Option<PathBuf>) -> Self {
        Self { output, host_cores: host_cores() }
    }

    pub fn with_host_cores(mut self, host_cores: u16) -> Self {
        self.host_cores = host_cores;
        self
    }
}

fn host_cores() -> u16 {
    std::thread::available_parallelism()
        .map(|count| u16::try_from(count.get()).unwrap_or(u16::MAX))
        .unwrap_or(1)
}

impl Launcher for ManifestLauncher {
    fn launch(&self, config: InstanceConfiguration) -> Result<(), AppError> {
        let name = config.name().to_string();
        let manifest = LaunchManifest::new(config, self.host_cores);
        let json = serde_json::to_string_pretty(&manifest)?;

        match &self.output {
            Some(path) => {
                fs::write(path, format!("{}\n", json))?;
                info!(instance = %name, path = %path.display(), "wrote launch manifest");
            }
            None => {
                let mut stdout = io::stdout().lock();
                writeln!(stdout, "{}", json)?;
            }
        }
        Ok(())
    }
}
