//! Tool configuration domain models.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{AppError, CandidateKind, MemoryMib, ParameterParser};

/// Configuration loaded from `vmlaunch.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub emulator: EmulatorConfig,
    /// Output format of machine introspection.
    pub machine: ParserProfile,
    /// Output format of device introspection.
    pub device: ParserProfile,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        self.emulator.validate()?;
        self.defaults.validate()?;
        ParameterParser::new(&self.machine).map_err(|e| scoped("machine", e))?;
        ParameterParser::new(&self.device).map_err(|e| scoped("device", e))?;
        Ok(())
    }

    /// Parser profile for a probeable candidate kind.
    pub fn profile(&self, kind: CandidateKind) -> Option<&ParserProfile> {
        match kind {
            CandidateKind::Machine => Some(&self.machine),
            CandidateKind::Device => Some(&self.device),
            CandidateKind::Cpu => None,
        }
    }
}

/// External emulator binary used for introspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmulatorConfig {
    /// Path or name of the emulator binary.
    pub binary: String,
    /// Upper bound on a single probe in seconds.
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
}

impl EmulatorConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.binary.trim().is_empty() {
            return Err(AppError::config_error("[emulator] binary must not be empty"));
        }
        if self.probe_timeout_secs == 0 {
            return Err(AppError::config_error(
                "[emulator] probe_timeout_secs must be greater than 0",
            ));
        }
        Ok(())
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

fn scoped(section: &str, err: AppError) -> AppError {
    match err {
        AppError::InvalidConfig(message) => {
            AppError::InvalidConfig(format!("[{}] {}", section, message))
        }
        other => other,
    }
}

fn default_probe_timeout_secs() -> u64 {
    10
}

/// How to query and parse one candidate kind's parameter listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParserProfile {
    /// Flag placed before `<token>,?` (e.g. `-device`).
    pub query_flag: String,
    /// Regex for lines that announce the candidate instead of describing a parameter.
    #[serde(default)]
    pub header_pattern: Option<String>,
    /// Separator between the candidate token and the parameter name.
    #[serde(default = "default_prefix_separator")]
    pub prefix_separator: String,
    /// Delimiter between the type and the notes.
    pub info_delimiter: String,
    /// Characters trimmed from both ends of the type.
    #[serde(default)]
    pub type_strip: String,
    /// Characters trimmed from both ends of the notes.
    #[serde(default)]
    pub notes_strip: String,
}

fn default_prefix_separator() -> String {
    ".".to_string()
}

/// Starting values for a new assembly session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultsConfig {
    #[serde(default = "default_memory_mib")]
    pub memory_mib: u64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self { memory_mib: default_memory_mib() }
    }
}

impl DefaultsConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if !self.memory_mib.is_power_of_two() {
            return Err(AppError::config_error(format!(
                "[defaults] memory_mib {} must be a power of two",
                self.memory_mib
            )));
        }
        Ok(())
    }

    pub fn memory(&self) -> MemoryMib {
        MemoryMib::new(self.memory_mib)
    }
}

fn default_memory_mib() -> u64 {
    256
}
