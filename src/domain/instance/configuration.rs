use std::fmt;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::{MemoryMib, SmpMode, SmpState};
use crate::domain::{ValidationError, Violation};

/// One configured device: its candidate token and serialized settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceSelection {
    pub device: String,
    pub settings: Vec<String>,
}

impl DeviceSelection {
    pub fn new(device: &str, settings: Vec<String>) -> Self {
        Self { device: device.to_string(), settings }
    }

    /// `<token>[,<setting>...]` as passed after `-device`.
    pub fn argument(&self) -> String {
        join_argument(&self.device, &self.settings)
    }
}

fn join_argument(token: &str, settings: &[String]) -> String {
    std::iter::once(token).chain(settings.iter().map(String::as_str)).collect::<Vec<_>>().join(",")
}

/// Fields of an instance while the assembly session is still editing them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceDraft {
    pub name: String,
    pub description: String,
    pub machine: String,
    pub machine_settings: Vec<String>,
    pub cpu: String,
    pub smp: SmpState,
    pub memory: MemoryMib,
    pub devices: Vec<DeviceSelection>,
    pub image: String,
    pub interface_name: String,
    pub ip_address: String,
    pub subnet_mask: String,
    pub gateway: String,
    pub kernel: String,
    pub application: String,
}

impl InstanceDraft {
    pub fn new(memory: MemoryMib) -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            machine: String::new(),
            machine_settings: Vec::new(),
            cpu: String::new(),
            smp: SmpState::Unset,
            memory,
            devices: Vec::new(),
            image: String::new(),
            interface_name: String::new(),
            ip_address: String::new(),
            subnet_mask: String::new(),
            gateway: String::new(),
            kernel: String::new(),
            application: String::new(),
        }
    }

    /// Check every invariant, collecting all violations before failing.
    pub fn validate(&self) -> Result<InstanceConfiguration, ValidationError> {
        let mut violations = Vec::new();

        require(&mut violations, "name", &self.name);
        if !self.memory.is_power_of_two() {
            violations.push(Violation::MemoryNotPowerOfTwo(self.memory.value()));
        }
        let smp = self.smp.mode();
        if smp.is_none() {
            violations.push(Violation::SmpUnset);
        }
        if !self.machine.trim().is_empty() && !self.cpu.trim().is_empty() {
            violations.push(Violation::CpuWithMachine {
                machine: self.machine.clone(),
                cpu: self.cpu.clone(),
            });
        }
        require(&mut violations, "image", &self.image);
        require(&mut violations, "interface_name", &self.interface_name);
        let ip_address = required_address(&mut violations, "ip_address", &self.ip_address);
        let subnet_mask = required_address(&mut violations, "subnet_mask", &self.subnet_mask);
        let gateway = optional_address(&mut violations, "gateway", &self.gateway);
        require(&mut violations, "kernel", &self.kernel);
        require(&mut violations, "application", &self.application);

        match (smp, ip_address, subnet_mask) {
            (Some(smp), Some(ip_address), Some(subnet_mask)) if violations.is_empty() => {
                Ok(InstanceConfiguration {
                    name: self.name.trim().to_string(),
                    description: self.description.clone(),
                    machine: self.machine.trim().to_string(),
                    machine_settings: self.machine_settings.clone(),
                    cpu: self.cpu.trim().to_string(),
                    smp,
                    memory: self.memory,
                    devices: self.devices.clone(),
                    image: PathBuf::from(self.image.trim()),
                    interface_name: self.interface_name.trim().to_string(),
                    ip_address,
                    subnet_mask,
                    gateway,
                    kernel: PathBuf::from(self.kernel.trim()),
                    application: PathBuf::from(self.application.trim()),
                })
            }
            _ => Err(ValidationError { violations }),
        }
    }
}

fn require(violations: &mut Vec<Violation>, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        violations.push(Violation::MissingField(field));
    }
}

fn required_address(
    violations: &mut Vec<Violation>,
    field: &'static str,
    value: &str,
) -> Option<Ipv4Addr> {
    if value.trim().is_empty() {
        violations.push(Violation::MissingField(field));
        return None;
    }
    optional_address(violations, field, value)
}

fn optional_address(
    violations: &mut Vec<Violation>,
    field: &'static str,
    value: &str,
) -> Option<Ipv4Addr> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match value.parse() {
        Ok(address) => Some(address),
        Err(_) => {
            violations.push(Violation::InvalidAddress { field, value: value.to_string() });
            None
        }
    }
}

/// A complete, validated launch request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceConfiguration {
    name: String,
    description: String,
    machine: String,
    machine_settings: Vec<String>,
    cpu: String,
    smp: SmpMode,
    memory: MemoryMib,
    devices: Vec<DeviceSelection>,
    image: PathBuf,
    interface_name: String,
    ip_address: Ipv4Addr,
    subnet_mask: Ipv4Addr,
    #[serde(skip_serializing_if = "Option::is_none")]
    gateway: Option<Ipv4Addr>,
    kernel: PathBuf,
    application: PathBuf,
}

impl InstanceConfiguration {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn machine(&self) -> &str {
        &self.machine
    }

    pub fn machine_settings(&self) -> &[String] {
        &self.machine_settings
    }

    pub fn cpu(&self) -> &str {
        &self.cpu
    }

    pub fn smp(&self) -> SmpMode {
        self.smp
    }

    pub fn memory(&self) -> MemoryMib {
        self.memory
    }

    pub fn devices(&self) -> &[DeviceSelection] {
        &self.devices
    }

    pub fn image(&self) -> &Path {
        &self.image
    }

    pub fn interface_name(&self) -> &str {
        &self.interface_name
    }

    pub fn ip_address(&self) -> Ipv4Addr {
        self.ip_address
    }

    pub fn subnet_mask(&self) -> Ipv4Addr {
        self.subnet_mask
    }

    pub fn gateway(&self) -> Option<Ipv4Addr> {
        self.gateway
    }

    pub fn kernel(&self) -> &Path {
        &self.kernel
    }

    pub fn application(&self) -> &Path {
        &self.application
    }

    /// Emulator arguments for machine, CPU, SMP, memory and devices.
    ///
    /// `host_cores` resolves [`SmpMode::All`] to a concrete count.
    pub fn argument_fragments(&self, host_cores: u16) -> Vec<String> {
        let mut args = Vec::new();
        if !self.machine.is_empty() {
            args.push("-machine".to_string());
            args.push(join_argument(&self.machine, &self.machine_settings));
        }
        if !self.cpu.is_empty() {
            args.push("-cpu".to_string());
            args.push(self.cpu.clone());
        }
        let cores = match self.smp {
            SmpMode::Cores(count) => count,
            SmpMode::All => host_cores.max(1),
        };
        args.push("-smp".to_string());
        args.push(cores.to_string());
        args.push("-m".to_string());
        args.push(format!("{}M", self.memory.value()));
        for device in &self.devices {
            args.push("-device".to_string());
            args.push(device.argument());
        }
        args
    }
}

impl fmt::Display for InstanceConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "Description: {}", self.description)?;
        writeln!(f, "Machine: {}", display_or_default(&self.machine))?;
        writeln!(f, "CPU: {}", display_or_default(&self.cpu))?;
        writeln!(f, "SMP: {}", self.smp)?;
        writeln!(f, "Memory: {}", self.memory)?;
        writeln!(f, "Devices: {}", self.devices.len())?;
        writeln!(f, "IP: {}/{}", self.ip_address, self.subnet_mask)?;
        writeln!(f, "Kernel: {}", self.kernel.display())?;
        write!(f, "Application: {}", self.application.display())
    }
}

fn display_or_default(value: &str) -> &str {
    if value.is_empty() { "(default)" } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_draft() -> InstanceDraft {
        let mut draft = InstanceDraft::new(MemoryMib::new(1024));
        draft.name = "sensor-node".to_string();
        draft.machine = "xlnx-zcu102".to_string();
        draft.machine_settings = vec!["secure=true".to_string()];
        draft.smp = SmpState::NumericEntered(4);
        draft.image = "/images/rootfs.qcow2".to_string();
        draft.interface_name = "tap0".to_string();
        draft.ip_address = "10.0.0.2".to_string();
        draft.subnet_mask = "255.255.255.0".to_string();
        draft.kernel = "/boot/Image".to_string();
        draft.application = "/opt/app.bin".to_string();
        draft
    }

    #[test]
    fn complete_draft_commits() {
        let config = complete_draft().validate().unwrap();

        assert_eq!(config.name(), "sensor-node");
        assert_eq!(config.gateway(), None);
        assert_eq!(config.ip_address(), Ipv4Addr::new(10, 0, 0, 2));
    }

    #[test]
    fn missing_image_and_bad_memory_are_both_reported() {
        let mut draft = complete_draft();
        draft.image.clear();
        draft.memory = MemoryMib::new(300);

        let err = draft.validate().unwrap_err();

        assert_eq!(
            err.violations,
            vec![Violation::MemoryNotPowerOfTwo(300), Violation::MissingField("image")]
        );
    }

    #[test]
    fn reports_every_missing_field() {
        let err = InstanceDraft::new(MemoryMib::new(256)).validate().unwrap_err();
        let missing: Vec<_> = err
            .violations
            .iter()
            .filter_map(|v| match v {
                Violation::MissingField(field) => Some(*field),
                _ => None,
            })
            .collect();

        assert_eq!(
            missing,
            vec![
                "name",
                "image",
                "interface_name",
                "ip_address",
                "subnet_mask",
                "kernel",
                "application"
            ]
        );
        assert!(err.violations.contains(&Violation::SmpUnset));
    }

    #[test]
    fn gateway_is_optional_but_must_parse() {
        let mut draft = complete_draft();
        draft.gateway = "10.0.0.1".to_string();
        assert_eq!(draft.validate().unwrap().gateway(), Some(Ipv4Addr::new(10, 0, 0, 1)));

        draft.gateway = "10.0.0".to_string();
        let err = draft.validate().unwrap_err();
        assert_eq!(
            err.violations,
            vec![Violation::InvalidAddress { field: "gateway", value: "10.0.0".to_string() }]
        );
    }

    #[test]
    fn machine_and_cpu_conflict() {
        let mut draft = complete_draft();
        draft.cpu = "cortex-a53".to_string();

        let err = draft.validate().unwrap_err();
        assert!(matches!(err.violations[0], Violation::CpuWithMachine { .. }));
    }

    #[test]
    fn fragments_follow_emulator_argument_format() {
        let mut draft = complete_draft();
        draft.smp = SmpState::AllSelected;
        draft.devices = vec![
            DeviceSelection::new("virtio-net-device", vec!["netdev=net0".to_string()]),
            DeviceSelection::new("virtio-rng-device", Vec::new()),
        ];
        let config = draft.validate().unwrap();

        assert_eq!(
            config.argument_fragments(8),
            vec![
                "-machine",
                "xlnx-zcu102,secure=true",
                "-smp",
                "8",
                "-m",
                "1024M",
                "-device",
                "virtio-net-device,netdev=net0",
                "-device",
                "virtio-rng-device",
            ]
        );
    }

    #[test]
    fn display_summarises_instance() {
        let summary = complete_draft().validate().unwrap().to_string();

        assert!(summary.contains("Name: sensor-node"));
        assert!(summary.contains("CPU: (default)"));
        assert!(summary.contains("IP: 10.0.0.2/255.255.255.0"));
    }
}
