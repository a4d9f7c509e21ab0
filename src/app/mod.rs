pub mod api;
pub mod assembler;
pub mod cli;
pub mod commands;
mod context;
pub mod discovery;

pub use assembler::ConfigurationAssembler;
pub use context::AppContext;
pub use discovery::ParameterDiscovery;
