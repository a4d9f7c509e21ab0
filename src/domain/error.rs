use std::fmt;
use std::io;

use thiserror::Error;

use crate::domain::AssemblyStep;

/// Library-wide error type for vmlaunch operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Configuration file is missing from every searched location.
    #[error("No vmlaunch.toml found. Run 'vmlaunch config init' or pass --config.")]
    ConfigMissing,

    /// Configuration file exists and would be overwritten.
    #[error("{0} already exists (use --force to overwrite)")]
    ConfigExists(String),

    /// Configuration content is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Candidate token is not part of the catalog.
    #[error("Unknown {kind} '{token}'")]
    UnknownCandidate { kind: String, token: String },

    /// Embedded catalog asset could not be loaded.
    #[error("Invalid catalog asset '{asset}': {reason}")]
    InvalidCatalog { asset: String, reason: String },

    /// An operation was requested before its assembly step was reached.
    #[error("'{operation}' is not available until the {required} step (current step: {current})")]
    StepNotReached { operation: &'static str, required: AssemblyStep, current: AssemblyStep },

    /// The assembly flow is already at its last step.
    #[error("Assembly is already at the {0} step")]
    NoNextStep(AssemblyStep),

    /// The session already produced its configuration.
    #[error("Configuration was already committed; start a new session")]
    AlreadyCommitted,

    /// A step needs a selection that has not been made.
    #[error("No {0} selected")]
    MissingSelection(&'static str),

    /// Candidate kind has no introspection command.
    #[error("{0} candidates cannot be probed for parameters")]
    NotProbeable(crate::domain::CandidateKind),

    /// CPU selection is disabled while a machine supplies its own CPU.
    #[error("CPU selection is disabled while machine '{0}' is selected")]
    CpuSelectionDisabled(String),

    /// SMP entry is not a core count in range.
    #[error("Invalid SMP core count '{0}': expected an integer between 1 and 256")]
    InvalidSmp(String),

    /// Memory adjustment would leave the power-of-two domain.
    #[error("{0}")]
    Memory(#[from] MemoryAdjustError),

    /// Device index out of range.
    #[error(transparent)]
    Index(#[from] IndexError),

    /// Introspection probe failed.
    #[error(transparent)]
    Probe(#[from] ProbeError),

    /// Configuration failed validation at commit time.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Value does not fit the parameter's reported type.
    #[error("Setting '{name}' of type {kind} cannot take the value '{value}'")]
    SettingTypeMismatch { name: String, kind: String, value: String },

    /// Session plan is inconsistent.
    #[error("Invalid session plan: {0}")]
    InvalidPlan(String),

    /// Interactive prompt failed.
    #[error("Prompt failed: {0}")]
    Prompt(String),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    YamlParseError(#[from] serde_yaml::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    pub fn config_error<S: Into<String>>(message: S) -> Self {
        AppError::InvalidConfig(message.into())
    }

    /// Provide an `io::ErrorKind`-like view for callers mapping errors to exit behaviour.
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            AppError::Io(err) => err.kind(),
            AppError::ConfigMissing | AppError::UnknownCandidate { .. } => io::ErrorKind::NotFound,
            AppError::ConfigExists(_) => io::ErrorKind::AlreadyExists,
            AppError::Probe(ProbeError::TimedOut { .. }) => io::ErrorKind::TimedOut,
            AppError::Probe(ProbeError::Cancelled { .. }) => io::ErrorKind::Interrupted,
            AppError::Probe(_) | AppError::Prompt(_) => io::ErrorKind::Other,
            AppError::InvalidConfig(_)
            | AppError::InvalidCatalog { .. }
            | AppError::StepNotReached { .. }
            | AppError::NoNextStep(_)
            | AppError::AlreadyCommitted
            | AppError::MissingSelection(_)
            | AppError::NotProbeable(_)
            | AppError::CpuSelectionDisabled(_)
            | AppError::InvalidSmp(_)
            | AppError::Memory(_)
            | AppError::Index(_)
            | AppError::Validation(_)
            | AppError::InvalidPlan(_)
            | AppError::SettingTypeMismatch { .. }
            | AppError::TomlParseError(_)
            | AppError::YamlParseError(_)
            | AppError::Json(_) => io::ErrorKind::InvalidInput,
        }
    }
}

/// Failure of an external introspection run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("Failed to start '{binary}' for '{token}': {details}")]
    Spawn { binary: String, token: String, details: String },

    #[error("Probe of '{token}' exited with {}: {stderr}", exit_label(.status))]
    Exit { token: String, status: Option<i32>, stderr: String },

    #[error("Probe of '{token}' timed out after {secs}s")]
    TimedOut { token: String, secs: u64 },

    #[error("Probe of '{token}' was cancelled")]
    Cancelled { token: String },

    #[error("Probe of '{token}' produced unusable output: {reason}")]
    InvalidOutput { token: String, reason: String },
}

impl ProbeError {
    pub fn token(&self) -> &str {
        match self {
            ProbeError::Spawn { token, .. }
            | ProbeError::Exit { token, .. }
            | ProbeError::TimedOut { token, .. }
            | ProbeError::Cancelled { token }
            | ProbeError::InvalidOutput { token, .. } => token,
        }
    }

    /// Exit status of the introspection process, when it ran to completion.
    pub fn status(&self) -> Option<i32> {
        match self {
            ProbeError::Exit { status, .. } => *status,
            _ => None,
        }
    }
}

fn exit_label(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}

/// Device removal or edit referenced a missing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Device index {index} is out of range ({len} device(s) configured)")]
pub struct IndexError {
    pub index: usize,
    pub len: usize,
}

/// Rejected memory adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MemoryAdjustError {
    #[error("Cannot decrease memory below {0} MiB")]
    BelowMinimum(u64),
    #[error("Cannot increase memory beyond {0} MiB")]
    AboveMaximum(u64),
    #[error("Memory value {0} MiB cannot be halved to a whole number")]
    NotHalvable(u64),
}

/// One unmet invariant of an instance configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    MissingField(&'static str),
    InvalidAddress { field: &'static str, value: String },
    MemoryNotPowerOfTwo(u64),
    SmpUnset,
    CpuWithMachine { machine: String, cpu: String },
}

impl Violation {
    /// Assembly step whose inputs own this violation.
    pub fn step(&self) -> AssemblyStep {
        match self {
            Violation::MissingField(field) | Violation::InvalidAddress { field, .. } => {
                AssemblyStep::owning_field(field)
            }
            Violation::MemoryNotPowerOfTwo(_)
            | Violation::SmpUnset
            | Violation::CpuWithMachine { .. } => AssemblyStep::MachineAndCpu,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingField(field) => write!(f, "{} must not be empty", field),
            Violation::InvalidAddress { field, value } => {
                write!(f, "{} '{}' is not a valid IPv4 address", field, value)
            }
            Violation::MemoryNotPowerOfTwo(value) => {
                write!(f, "memory {} MiB is not a positive power of two", value)
            }
            Violation::SmpUnset => write!(f, "smp must be a core count or 'all'"),
            Violation::CpuWithMachine { machine, cpu } => {
                write!(
                    f,
                    "cpu '{}' conflicts with machine '{}' which supplies its own CPU",
                    cpu, machine
                )
            }
        }
    }
}

/// Every invariant that blocked a commit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Configuration has {} problem(s):", self.violations.len())?;
        for violation in &self.violations {
            write!(f, "\n  • {}", violation)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_lists_every_violation() {
        let err = ValidationError {
            violations: vec![Violation::MissingField("image"), Violation::MemoryNotPowerOfTwo(300)],
        };
        let message = err.to_string();

        assert!(message.contains("2 problem(s)"));
        assert!(message.contains("image must not be empty"));
        assert!(message.contains("memory 300 MiB"));
    }

    #[test]
    fn probe_exit_reports_status_and_token() {
        let err = ProbeError::Exit {
            token: "virtio-net-device".to_string(),
            status: Some(1),
            stderr: "unknown device".to_string(),
        };

        assert_eq!(err.token(), "virtio-net-device");
        assert_eq!(err.status(), Some(1));
        assert!(err.to_string().contains("status 1"));
    }

    #[test]
    fn kind_maps_probe_timeout() {
        let err = AppError::from(ProbeError::TimedOut { token: "virt".into(), secs: 3 });
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    }

    #[test]
    fn violation_maps_to_owning_step() {
        assert_eq!(Violation::MissingField("kernel").step(), AssemblyStep::KernelAndApplication);
        assert_eq!(Violation::MissingField("image").step(), AssemblyStep::ImageSelection);
        assert_eq!(
            Violation::InvalidAddress { field: "gateway", value: "x".into() }.step(),
            AssemblyStep::NetworkSelection
        );
        assert_eq!(Violation::SmpUnset.step(), AssemblyStep::MachineAndCpu);
    }
}
