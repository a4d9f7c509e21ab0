mod candidate_catalog;
mod launcher;
mod parameter_probe;

pub use candidate_catalog::CandidateCatalog;
pub use launcher::Launcher;
pub use parameter_probe::{CancellationToken, ParameterProbe, ProbeQuery};
