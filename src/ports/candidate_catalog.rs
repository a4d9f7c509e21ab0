use crate::domain::{Candidate, CandidateKind, DeviceCategory};

/// Load-once lists of machines, CPUs and devices.
pub trait CandidateCatalog {
    /// Candidates of one kind in display order. Devices are flattened across categories.
    fn list(&self, kind: CandidateKind) -> Vec<&Candidate>;

    /// Devices grouped by category.
    fn device_categories(&self) -> &[DeviceCategory];

    /// Look up a candidate by its argument token.
    fn find(&self, kind: CandidateKind, token: &str) -> Option<&Candidate> {
        self.list(kind).into_iter().find(|candidate| candidate.argument == token)
    }
}
