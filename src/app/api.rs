//! API Facade for the application.
//!
//! This module exposes high-level functions that glue together context creation
//! and command execution.

use std::fs;
use std::path::{Path, PathBuf};

use crate::adapters::config_file::load_config;
use crate::adapters::{EmbeddedCandidateCatalog, EmulatorProbe, ManifestLauncher};
use crate::app::{
    AppContext,
    commands::{build, config_init, list, probe},
};
use crate::domain::config::paths;
use crate::domain::{AppConfig, Candidate, CandidateKind, ProbeReport, SessionPlan};
use crate::ports::CancellationToken;

pub use crate::app::commands::build::BuildOutcome;
pub use crate::domain::AppError;

/// Context wired to the embedded catalog and the configured emulator binary.
pub(crate) type EmulatorContext = AppContext<EmbeddedCandidateCatalog, EmulatorProbe>;

/// Configuration file that commands will read: `--config`, `$VMLAUNCH_CONFIG`, or `./vmlaunch.toml`.
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf, AppError> {
    let cwd = std::env::current_dir()?;
    Ok(paths::resolve(explicit, std::env::var_os(paths::CONFIG_ENV), &cwd))
}

/// Load and validate the configuration.
pub fn load_configuration(explicit: Option<&Path>) -> Result<AppConfig, AppError> {
    load_config(&config_path(explicit)?)
}

pub(crate) fn create_context(explicit: Option<&Path>) -> Result<EmulatorContext, AppError> {
    let config = load_configuration(explicit)?;
    let probe = EmulatorProbe::from_config(&config.emulator);
    Ok(AppContext::new(config, EmbeddedCandidateCatalog::new()?, probe))
}

// =============================================================================
// Catalog and Probe API
// =============================================================================

/// List catalog candidates of one kind, optionally a single device category.
pub fn list_candidates(
    kind: CandidateKind,
    category: Option<&str>,
) -> Result<Vec<Candidate>, AppError> {
    let catalog = EmbeddedCandidateCatalog::new()?;
    list::execute(&catalog, kind, category)
}

/// Run the emulator's introspection for `token` and parse the result.
pub fn probe_parameters(
    config: Option<&Path>,
    kind: CandidateKind,
    token: &str,
) -> Result<ProbeReport, AppError> {
    let ctx = create_context(config)?;
    probe::execute(&ctx, kind, token, &CancellationToken::new())
}

// =============================================================================
// Build API
// =============================================================================

/// Replay the plan at `plan_path` and hand the configuration to a manifest launcher.
///
/// The manifest is written to `output`, or to stdout when `output` is `None`.
pub fn build_from_plan(
    config: Option<&Path>,
    plan_path: &Path,
    output: Option<PathBuf>,
) -> Result<BuildOutcome, AppError> {
    let ctx = create_context(config)?;
    let plan = SessionPlan::parse(&fs::read_to_string(plan_path)?)?;
    build::execute(&ctx, &plan, &ManifestLauncher::new(output), &CancellationToken::new())
}

// =============================================================================
// Config API
// =============================================================================

/// Write the starter configuration and return where it went.
pub fn init_config(path: Option<&Path>, force: bool) -> Result<PathBuf, AppError> {
    let path = config_path(path)?;
    config_init::execute(&path, force)?;
    Ok(path)
}
