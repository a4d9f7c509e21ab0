use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::domain::ProbeError;

/// One introspection request: `<binary> <flag> <token>,?`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeQuery {
    pub flag: String,
    pub token: String,
}

impl ProbeQuery {
    pub fn new(flag: &str, token: &str) -> Self {
        Self { flag: flag.to_string(), token: token.to_string() }
    }

    /// Arguments passed to the emulator binary.
    pub fn args(&self) -> [String; 2] {
        [self.flag.clone(), format!("{},?", self.token)]
    }
}

/// Caller-triggered cancellation shared with a running probe.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Runs the emulator's parameter introspection for a candidate.
pub trait ParameterProbe {
    /// Return the raw listing, or a `ProbeError` on failure, timeout or cancellation.
    fn probe(&self, query: &ProbeQuery, cancel: &CancellationToken) -> Result<String, ProbeError>;
}

impl<T: ParameterProbe + ?Sized> ParameterProbe for &T {
    fn probe(&self, query: &ProbeQuery, cancel: &CancellationToken) -> Result<String, ProbeError> {
        (**self).probe(query, cancel)
    }
}
