use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::ProbeError;
use crate::ports::{CancellationToken, ParameterProbe, ProbeQuery};

/// Probe returning scripted listings. Unscripted tokens fail like an unknown device.
#[derive(Default)]
pub struct FakeProbe {
    outputs: HashMap<String, String>,
    queries: Mutex<Vec<ProbeQuery>>,
}

impl FakeProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, token: &str, output: &str) -> Self {
        self.outputs.insert(token.to_string(), output.to_string());
        self
    }

    pub fn queries(&self) -> Vec<ProbeQuery> {
        self.queries.lock().unwrap().clone()
    }
}

impl ParameterProbe for FakeProbe {
    fn probe(&self, query: &ProbeQuery, cancel: &CancellationToken) -> Result<String, ProbeError> {
        if cancel.is_cancelled() {
            return Err(ProbeError::Cancelled { token: query.token.clone() });
        }
        self.queries.lock().unwrap().push(query.clone());
        self.outputs.get(&query.token).cloned().ok_or_else(|| ProbeError::Exit {
            token: query.token.clone(),
            status: Some(1),
            stderr: format!("Device '{}' not found", query.token),
        })
    }
}
