//! Interactive assembly session (`vmlaunch new`).

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use dialoguer::{Confirm, Error as DialoguerError, Input, MultiSelect, Select};

use super::recent::{BrowseAction, RecentDirectories};
use crate::adapters::ManifestLauncher;
use crate::app::{AppContext, ConfigurationAssembler, api};
use crate::domain::{
    AppError, AssemblyStep, CandidateKind, InstanceConfiguration, ProbeReport, SettingChoice,
    SettingValue, Violation, choices_for, split_arguments,
};
use crate::ports::{CancellationToken, CandidateCatalog, Launcher, ParameterProbe};

const NO_MACHINE: &str = "[no machine, choose a CPU]";
const MACHINE_DEFAULT_CPU: &str = "(machine default)";
const SETTINGS_PROMPT: &str = "Settings (comma-separated, ',,' for a literal comma)";
const EXTRA_ARGUMENTS_PROMPT: &str =
    "Extra arguments (comma-separated, ',,' for a literal comma, optional)";

/// Why a wizard step stopped early.
enum Stop {
    Cancelled,
    Failed(AppError),
}

impl From<AppError> for Stop {
    fn from(err: AppError) -> Self {
        Stop::Failed(err)
    }
}

type Step<T> = Result<T, Stop>;

pub fn run_wizard(config: Option<&Path>, output: Option<PathBuf>) -> Result<(), AppError> {
    let ctx = api::create_context(config)?;
    let mut wizard = Wizard::new(&ctx)?;

    match wizard.run() {
        Ok(configuration) => {
            let name = configuration.name().to_string();
            ManifestLauncher::new(output.clone()).launch(configuration)?;
            if let Some(path) = output {
                println!("✅ Committed '{}' -> {}", name, path.display());
            }
            Ok(())
        }
        Err(Stop::Cancelled) => {
            println!("Cancelled; nothing was launched");
            Ok(())
        }
        Err(Stop::Failed(err)) => Err(err),
    }
}

struct Wizard<'a, C: CandidateCatalog, P: ParameterProbe> {
    catalog: &'a C,
    assembler: ConfigurationAssembler<&'a P>,
    recent: RecentDirectories,
}

impl<'a, C: CandidateCatalog, P: ParameterProbe> Wizard<'a, C, P> {
    fn new(ctx: &'a AppContext<C, P>) -> Result<Self, AppError> {
        Ok(Self { catalog: ctx.catalog(), assembler: ctx.assembler()?, recent: RecentDirectories::new() })
    }

    fn run(&mut self) -> Step<InstanceConfiguration> {
        loop {
            let step = self.assembler.step();
            if step == AssemblyStep::Commit {
                break;
            }
            self.run_step(step)?;
            self.assembler.advance()?;
        }

        loop {
            match self.assembler.commit() {
                Ok(configuration) => return Ok(configuration),
                Err(AppError::Validation(validation)) => {
                    eprintln!("⚠️  {}", validation);
                    // Revisit each offending step once, in flow order.
                    let steps: BTreeSet<AssemblyStep> =
                        validation.violations.iter().map(Violation::step).collect();
                    for step in steps {
                        self.run_step(step)?;
                    }
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn run_step(&mut self, step: AssemblyStep) -> Step<()> {
        match step {
            AssemblyStep::NameAndDescription => self.name_and_description(),
            AssemblyStep::MachineAndCpu => self.machine_and_cpu(),
            AssemblyStep::ImageSelection => self.image(),
            AssemblyStep::NetworkSelection => self.network(),
            AssemblyStep::KernelAndApplication => self.kernel_and_application(),
            AssemblyStep::DeviceLoop => self.device_loop(),
            AssemblyStep::Commit => Ok(()),
        }
    }

    fn name_and_description(&mut self) -> Step<()> {
        let draft = self.assembler.draft();
        let name = text("Instance name", &draft.name, false)?;
        let description = text("Description", &draft.description, true)?;
        self.assembler.set_name_and_description(&name, &description)?;
        Ok(())
    }

    fn machine_and_cpu(&mut self) -> Step<()> {
        let machines = self.catalog.list(CandidateKind::Machine);
        let mut items = vec![NO_MACHINE.to_string()];
        items.extend(machines.iter().map(|m| format!("{}: {}", m.argument, m.description)));
        let current = machines
            .iter()
            .position(|m| m.argument == self.assembler.draft().machine)
            .map_or(0, |index| index + 1);

        let selection = select("Machine", &items, current)?;
        if selection == 0 {
            self.assembler.select_machine("")?;
        } else {
            let token = machines[selection - 1].argument.clone();
            self.assembler.select_machine(&token)?;
            if confirm(&format!("Configure {} parameters?", token), false)? {
                let report = match self.assembler.probe_machine(&CancellationToken::new()) {
                    Ok(report) => report,
                    Err(AppError::Probe(err)) => {
                        eprintln!("⚠️  {}; machine parameters left empty", err);
                        ProbeReport::empty(&token)
                    }
                    Err(err) => return Err(err.into()),
                };
                let (choices, extra) = settings_form(&report)?;
                self.assembler.apply_machine_settings(&choices, &extra)?;
            }
        }

        if self.assembler.cpu_selectable() {
            let cpus = self.catalog.list(CandidateKind::Cpu);
            let items: Vec<String> = cpus
                .iter()
                .map(|cpu| {
                    if cpu.is_default() {
                        MACHINE_DEFAULT_CPU.to_string()
                    } else {
                        format!("{}: {}", cpu.argument, cpu.description)
                    }
                })
                .collect();
            let current =
                cpus.iter().position(|cpu| cpu.argument == self.assembler.draft().cpu).unwrap_or(0);
            let selection = select("CPU", &items, current)?;
            self.assembler.select_cpu(&cpus[selection].argument)?;
        }

        self.smp()?;
        self.memory()
    }

    fn smp(&mut self) -> Step<()> {
        let items = ["All host cores".to_string(), "Fixed core count".to_string()];
        let current = if self.assembler.draft().smp.all_checked() { 0 } else { 1 };
        if select("SMP", &items, current)? == 0 {
            self.assembler.select_all_cores(true)?;
            return Ok(());
        }
        loop {
            let entered = text("Core count (1-256)", &self.assembler.draft().smp.numeric_text(), false)?;
            match self.assembler.enter_smp(&entered) {
                Ok(()) => return Ok(()),
                Err(err) => eprintln!("⚠️  {}", err),
            }
        }
    }

    fn memory(&mut self) -> Step<()> {
        let items = ["Keep".to_string(), "Double".to_string(), "Halve".to_string()];
        loop {
            let prompt = format!("Memory: {}", self.assembler.draft().memory);
            let adjusted = match select(&prompt, &items, 0)? {
                1 => self.assembler.increase_memory(),
                2 => self.assembler.decrease_memory(),
                _ => return Ok(()),
            };
            if let Err(err) = adjusted {
                eprintln!("⚠️  {}", err);
            }
        }
    }

    fn image(&mut self) -> Step<()> {
        let current = self.assembler.draft().image.clone();
        let image = self.path("Image file", BrowseAction::Image, &current)?;
        self.assembler.set_image(&image)?;
        Ok(())
    }

    fn network(&mut self) -> Step<()> {
        let draft = self.assembler.draft().clone();
        let interface = text("Interface name", &draft.interface_name, false)?;
        let ip_address = text("IPv4 address", &draft.ip_address, false)?;
        let subnet_mask = text("Subnet mask", &draft.subnet_mask, false)?;
        let gateway = text("Gateway (optional)", &draft.gateway, true)?;
        self.assembler.set_network(&interface, &ip_address, &subnet_mask, Some(&gateway))?;
        Ok(())
    }

    fn kernel_and_application(&mut self) -> Step<()> {
        let draft = self.assembler.draft().clone();
        let kernel = self.path("Kernel", BrowseAction::Kernel, &draft.kernel)?;
        let application = self.path("Application", BrowseAction::Application, &draft.application)?;
        self.assembler.set_kernel_and_application(&kernel, &application)?;
        Ok(())
    }

    fn path(&mut self, prompt: &str, action: BrowseAction, current: &str) -> Step<String> {
        let initial =
            if current.is_empty() { self.recent.suggestion(action) } else { current.to_string() };
        let chosen = text(prompt, &initial, false)?;
        self.recent.remember(action, &chosen);
        Ok(chosen)
    }

    fn device_loop(&mut self) -> Step<()> {
        let items = [
            "Add device".to_string(),
            "Edit device settings".to_string(),
            "Remove device".to_string(),
            "Done".to_string(),
        ];
        loop {
            for (index, device) in self.assembler.devices().iter().enumerate() {
                println!("  [{}] -device {}", index, device.argument());
            }
            match select("Devices", &items, 0)? {
                0 => self.add_device()?,
                1 => self.edit_device()?,
                2 => self.remove_device()?,
                _ => return Ok(()),
            }
        }
    }

    fn add_device(&mut self) -> Step<()> {
        let categories = self.catalog.device_categories();
        let names: Vec<String> = categories.iter().map(|c| c.name.clone()).collect();
        let category = &categories[select("Category", &names, 0)?];
        let items: Vec<String> =
            category.devices.iter().map(|d| format!("{}: {}", d.argument, d.description)).collect();
        let device = &category.devices[select("Device", &items, 0)?];
        if !device.tooltip_text().is_empty() {
            println!("  ℹ️  {}", device.tooltip_text());
        }
        let token = device.argument.clone();

        if !confirm(&format!("Configure {} parameters?", token), false)? {
            self.assembler.add_device(&token, Vec::new())?;
            return Ok(());
        }
        let report = match self.assembler.probe_device(&token, &CancellationToken::new()) {
            Ok(report) => report,
            Err(AppError::Probe(err)) => {
                eprintln!("⚠️  {}; device parameters left empty", err);
                ProbeReport::empty(&token)
            }
            Err(err) => return Err(err.into()),
        };
        let (choices, extra) = settings_form(&report)?;
        self.assembler.add_configured_device(&token, &choices, &extra)?;
        Ok(())
    }

    fn edit_device(&mut self) -> Step<()> {
        let Some(index) = self.pick_device("Edit which device?")? else {
            return Ok(());
        };
        let current = self.assembler.devices()[index].settings.join(",");
        let entered = text(SETTINGS_PROMPT, &current, true)?;
        self.assembler.edit_device(index, split_arguments(&entered))?;
        Ok(())
    }

    fn remove_device(&mut self) -> Step<()> {
        if let Some(index) = self.pick_device("Remove which device?")? {
            let removed = self.assembler.remove_device(index)?;
            println!("  Removed {}", removed.device);
        }
        Ok(())
    }

    fn pick_device(&self, prompt: &str) -> Step<Option<usize>> {
        let devices = self.assembler.devices();
        if devices.is_empty() {
            println!("  No devices configured");
            return Ok(None);
        }
        let items: Vec<String> = devices.iter().map(|d| d.argument()).collect();
        Ok(Some(select(prompt, &items, 0)?))
    }
}

/// Ask which parameters to enable, their values, and any extra arguments.
fn settings_form(report: &ProbeReport) -> Step<(Vec<SettingChoice>, String)> {
    if !report.warnings.is_empty() {
        eprintln!("⚠️  Skipped {} unparseable line(s) for '{}':", report.warnings.len(), report.token);
        for warning in &report.warnings {
            eprintln!("  • {}", warning);
        }
    }
    let mut choices = choices_for(&report.descriptors);

    if !choices.is_empty() {
        let labels: Vec<String> = choices
            .iter()
            .map(|choice| {
                let descriptor = &choice.descriptor;
                if descriptor.notes.is_empty() {
                    format!("{} <{}>", descriptor.name, descriptor.kind)
                } else {
                    format!("{} <{}>: {}", descriptor.name, descriptor.kind, descriptor.notes)
                }
            })
            .collect();
        let enabled = MultiSelect::new()
            .with_prompt("Enable parameters (space toggles, enter confirms)")
            .items(&labels)
            .interact_opt()
            .map_err(|err| prompt_error("parameters", err))?
            .ok_or(Stop::Cancelled)?;

        for index in enabled {
            let choice = &mut choices[index];
            let value = if choice.descriptor.is_bool() {
                SettingValue::Flag(confirm(&choice.descriptor.name, true)?)
            } else {
                SettingValue::Text(text(&choice.descriptor.name, "", false)?)
            };
            choice.enable(value)?;
        }
    }

    let extra = text(EXTRA_ARGUMENTS_PROMPT, "", true)?;
    Ok((choices, split_arguments(&extra).join("\n")))
}

fn text(prompt: &str, initial: &str, allow_empty: bool) -> Step<String> {
    let mut input = Input::<String>::new().with_prompt(prompt).allow_empty(allow_empty);
    if !initial.is_empty() {
        input = input.with_initial_text(initial);
    }
    match input.interact_text() {
        Ok(value) => Ok(value),
        Err(DialoguerError::IO(err)) if err.kind() == ErrorKind::Interrupted => {
            Err(Stop::Cancelled)
        }
        Err(err) => Err(prompt_error(prompt, err)),
    }
}

fn select(prompt: &str, items: &[String], default: usize) -> Step<usize> {
    Select::new()
        .with_prompt(prompt)
        .items(items)
        .default(default)
        .interact_opt()
        .map_err(|err| prompt_error(prompt, err))?
        .ok_or(Stop::Cancelled)
}

fn confirm(prompt: &str, default: bool) -> Step<bool> {
    Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact_opt()
        .map_err(|err| prompt_error(prompt, err))?
        .ok_or(Stop::Cancelled)
}

fn prompt_error(prompt: &str, err: DialoguerError) -> Stop {
    Stop::Failed(AppError::Prompt(format!("{}: {}", prompt, err)))
}
