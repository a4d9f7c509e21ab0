//! Replay a session plan through the assembler without prompting.

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::app::AppContext;
use crate::app::assembler::ConfigurationAssembler;
use crate::domain::{
    AppError, AssemblyStep, CandidateKind, InstanceConfiguration, PlanSmp, PlanValue,
    ProbeReport, SessionPlan, SettingChoice, planned_choices,
};
use crate::ports::{CancellationToken, CandidateCatalog, Launcher, ParameterProbe};

/// Result of a non-interactive build.
#[derive(Debug)]
pub struct BuildOutcome {
    pub configuration: InstanceConfiguration,
    /// Problems that did not block the commit, such as a failed probe or a skipped listing line.
    pub warnings: Vec<String>,
}

pub fn execute<C, P, L>(
    ctx: &AppContext<C, P>,
    plan: &SessionPlan,
    launcher: &L,
    cancel: &CancellationToken,
) -> Result<BuildOutcome, AppError>
where
    C: CandidateCatalog,
    P: ParameterProbe,
    L: Launcher,
{
    let mut assembler = ctx.assembler()?;
    let mut warnings = Vec::new();

    assembler.set_name_and_description(&plan.name, &plan.description)?;

    advance(&mut assembler, AssemblyStep::MachineAndCpu)?;
    if !plan.machine.is_empty() {
        ensure_known(ctx.catalog(), CandidateKind::Machine, &plan.machine)?;
        assembler.select_machine(&plan.machine)?;
        if !plan.machine_settings.is_empty() || !plan.machine_extra.is_empty() {
            let choices = if plan.machine_settings.is_empty() {
                Vec::new()
            } else {
                match assembler.probe_machine(cancel) {
                    Ok(report) => resolve_choices(&report, &plan.machine_settings, &mut warnings)?,
                    Err(AppError::Probe(e)) => {
                        skip_settings(&plan.machine, &e.to_string(), &mut warnings);
                        Vec::new()
                    }
                    Err(e) => return Err(e),
                }
            };
            assembler.apply_machine_settings(&choices, &plan.machine_extra.join("\n"))?;
        }
    }
    if !plan.cpu.is_empty() {
        ensure_known(ctx.catalog(), CandidateKind::Cpu, &plan.cpu)?;
        assembler.select_cpu(&plan.cpu)?;
    }
    match &plan.smp {
        Some(PlanSmp::Count(count)) => assembler.enter_smp(&count.to_string())?,
        Some(PlanSmp::Keyword(keyword)) if keyword.eq_ignore_ascii_case("all") => {
            assembler.select_all_cores(true)?
        }
        Some(PlanSmp::Keyword(keyword)) => assembler.enter_smp(keyword)?,
        None => {}
    }
    for _ in 0..plan.memory_steps.unsigned_abs() {
        if plan.memory_steps > 0 {
            assembler.increase_memory()?;
        } else {
            assembler.decrease_memory()?;
        }
    }

    advance(&mut assembler, AssemblyStep::ImageSelection)?;
    assembler.set_image(&plan.image)?;

    advance(&mut assembler, AssemblyStep::NetworkSelection)?;
    assembler.set_network(
        &plan.interface,
        &plan.ip_address,
        &plan.subnet_mask,
        plan.gateway.as_deref(),
    )?;

    advance(&mut assembler, AssemblyStep::KernelAndApplication)?;
    assembler.set_kernel_and_application(&plan.kernel, &plan.application)?;

    advance(&mut assembler, AssemblyStep::DeviceLoop)?;
    for device in &plan.devices {
        ensure_known(ctx.catalog(), CandidateKind::Device, &device.token)?;
        let choices = if device.settings.is_empty() {
            Vec::new()
        } else {
            match assembler.probe_device(&device.token, cancel) {
                Ok(report) => resolve_choices(&report, &device.settings, &mut warnings)?,
                Err(AppError::Probe(e)) => {
                    skip_settings(&device.token, &e.to_string(), &mut warnings);
                    Vec::new()
                }
                Err(e) => return Err(e),
            }
        };
        assembler.add_configured_device(&device.token, &choices, &device.extra.join("\n"))?;
    }

    advance(&mut assembler, AssemblyStep::Commit)?;
    let configuration = assembler.commit()?;
    launcher.launch(configuration.clone())?;
    info!(name = configuration.name(), warnings = warnings.len(), "plan built");

    Ok(BuildOutcome { configuration, warnings })
}

fn advance<P: ParameterProbe>(
    assembler: &mut ConfigurationAssembler<P>,
    step: AssemblyStep,
) -> Result<(), AppError> {
    while assembler.step() < step {
        assembler.advance()?;
    }
    Ok(())
}

fn ensure_known<C: CandidateCatalog>(
    catalog: &C,
    kind: CandidateKind,
    token: &str,
) -> Result<(), AppError> {
    match catalog.find(kind, token) {
        Some(_) => Ok(()),
        None => Err(AppError::UnknownCandidate { kind: kind.to_string(), token: token.to_string() }),
    }
}

fn resolve_choices(
    report: &ProbeReport,
    planned: &BTreeMap<String, PlanValue>,
    warnings: &mut Vec<String>,
) -> Result<Vec<SettingChoice>, AppError> {
    let token = report.token.as_str();
    for skipped in &report.warnings {
        warn!(token, line = skipped.line_number, reason = skipped.reason, "listing line skipped");
        warnings.push(format!(
            "'{}' line {} skipped: {} ('{}')",
            token, skipped.line_number, skipped.reason, skipped.line
        ));
    }

    let (choices, unknown) = planned_choices(&report.descriptors, planned)?;
    for name in unknown {
        warn!(token, setting = %name, "planned setting not reported by probe");
        warnings.push(format!("'{}' does not accept '{}'; setting ignored", token, name));
    }
    Ok(choices)
}

fn skip_settings(token: &str, reason: &str, warnings: &mut Vec<String>) {
    warn!(token, reason, "probe failed; planned settings skipped");
    warnings.push(format!("{}; planned settings for '{}' skipped", reason, token));
}
