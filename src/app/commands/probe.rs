use tracing::debug;

use crate::app::AppContext;
use crate::domain::{AppError, CandidateKind, ProbeReport};
use crate::ports::{CancellationToken, CandidateCatalog, ParameterProbe};

/// Probe one machine or device and parse its parameters.
///
/// Tokens outside the catalog are still probed; the emulator may know more than we ship.
pub fn execute<C, P>(
    ctx: &AppContext<C, P>,
    kind: CandidateKind,
    token: &str,
    cancel: &CancellationToken,
) -> Result<ProbeReport, AppError>
where
    C: CandidateCatalog,
    P: ParameterProbe,
{
    if ctx.catalog().find(kind, token).is_none() {
        debug!(%kind, token, "probing token outside the catalog");
    }
    let report = ctx.discovery()?.discover(kind, token, cancel)?;
    for warning in &report.warnings {
        debug!(token, %warning, "skipped probe line");
    }
    Ok(report)
}
