//! vmlaunch: discover emulator machine and device parameters and assemble launch configurations.

pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;

#[cfg(test)]
pub(crate) mod testing;

pub use app::api::{
    BuildOutcome, build_from_plan, config_path, init_config, list_candidates, load_configuration,
    probe_parameters,
};
pub use app::{AppContext, ConfigurationAssembler, ParameterDiscovery};
pub use domain::{
    AppError, AssemblyStep, Candidate, CandidateKind, InstanceConfiguration, ProbeReport,
};
