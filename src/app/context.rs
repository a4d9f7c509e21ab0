use crate::app::assembler::ConfigurationAssembler;
use crate::app::discovery::ParameterDiscovery;
use crate::domain::{AppConfig, AppError};
use crate::ports::{CandidateCatalog, ParameterProbe};

/// Application context holding dependencies for command execution.
pub struct AppContext<C: CandidateCatalog, P: ParameterProbe> {
    config: AppConfig,
    catalog: C,
    probe: P,
}

impl<C: CandidateCatalog, P: ParameterProbe> AppContext<C, P> {
    /// Create a new application context.
    pub fn new(config: AppConfig, catalog: C, probe: P) -> Self {
        Self { config, catalog, probe }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Discovery borrowing this context's probe, with parsers built from the configuration.
    pub fn discovery(&self) -> Result<ParameterDiscovery<&P>, AppError> {
        ParameterDiscovery::new(&self.probe, &self.config)
    }

    /// Fresh assembly session seeded with the configured default memory.
    pub fn assembler(&self) -> Result<ConfigurationAssembler<&P>, AppError> {
        Ok(ConfigurationAssembler::new(self.discovery()?, self.config.defaults.memory()))
    }
}
