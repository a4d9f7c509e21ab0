use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of selectable candidate exposed by the emulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateKind {
    Machine,
    Cpu,
    Device,
}

impl CandidateKind {
    pub const ALL: [CandidateKind; 3] =
        [CandidateKind::Machine, CandidateKind::Cpu, CandidateKind::Device];

    pub fn as_str(self) -> &'static str {
        match self {
            CandidateKind::Machine => "machine",
            CandidateKind::Cpu => "cpu",
            CandidateKind::Device => "device",
        }
    }

    /// Parse singular or plural spellings (`machine`, `machines`, ...).
    pub fn from_name(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "machine" | "machines" => Some(CandidateKind::Machine),
            "cpu" | "cpus" => Some(CandidateKind::Cpu),
            "device" | "devices" => Some(CandidateKind::Device),
            _ => None,
        }
    }

    /// Whether the emulator can be asked for this kind's configurable parameters.
    pub fn is_probeable(self) -> bool {
        !matches!(self, CandidateKind::Cpu)
    }
}

impl fmt::Display for CandidateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A selectable machine, CPU or device option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Candidate {
    /// Token passed on the emulator command line.
    pub argument: String,
    pub description: String,
    #[serde(default)]
    pub tooltip: String,
}

impl Candidate {
    pub fn new(argument: &str, description: &str, tooltip: &str) -> Self {
        Self {
            argument: argument.to_string(),
            description: description.to_string(),
            tooltip: tooltip.to_string(),
        }
    }

    /// Tooltip text, falling back to the description.
    pub fn tooltip_text(&self) -> &str {
        if self.tooltip.is_empty() { &self.description } else { &self.tooltip }
    }

    /// The empty "use default" entry.
    pub fn is_default(&self) -> bool {
        self.argument.is_empty()
    }
}

/// Devices grouped under a display category (network, storage, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceCategory {
    pub name: String,
    pub devices: Vec<Candidate>,
}
