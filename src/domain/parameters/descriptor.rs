use std::fmt;

use serde::Serialize;

/// Type string the emulator reports for on/off parameters.
pub const BOOL_TYPE: &str = "bool";

/// One configurable parameter discovered for a candidate.
///
/// Ordering compares `name` first, so sorting a probe's descriptors yields display order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ParameterDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub notes: String,
}

impl ParameterDescriptor {
    pub fn new(name: &str, kind: &str, notes: &str) -> Self {
        Self { name: name.to_string(), kind: kind.to_string(), notes: notes.to_string() }
    }

    pub fn is_bool(&self) -> bool {
        self.kind == BOOL_TYPE
    }
}

/// A malformed line skipped while parsing probe output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseWarning {
    /// 1-based line number within the probe output.
    pub line_number: usize,
    pub line: String,
    pub reason: &'static str,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} ('{}')", self.line_number, self.reason, self.line)
    }
}

/// Parsed result of a single probe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    pub token: String,
    pub descriptors: Vec<ParameterDescriptor>,
    pub warnings: Vec<ParseWarning>,
}

impl ProbeReport {
    /// Report for a probe that produced nothing usable.
    pub fn empty(token: &str) -> Self {
        Self { token: token.to_string(), ..Self::default() }
    }

    pub fn find(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.descriptors.iter().find(|descriptor| descriptor.name == name)
    }
}
