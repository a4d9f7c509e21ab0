//! Step-by-step assembly of an instance configuration.
//!
//! The assembler owns the draft for the whole session. Each operation belongs to one
//! [`AssemblyStep`] and is accepted once the session has reached that step, so earlier
//! answers can still be revised while later steps are open. Steps only ever advance.

use tracing::{debug, info};

use crate::app::discovery::ParameterDiscovery;
use crate::domain::{
    AppError, AssemblyStep, CandidateKind, DeviceSelection, IndexError, InstanceConfiguration,
    InstanceDraft, MemoryMib, ProbeReport, SettingChoice, aggregate_settings,
};
use crate::ports::{CancellationToken, ParameterProbe};

pub struct ConfigurationAssembler<P: ParameterProbe> {
    discovery: ParameterDiscovery<P>,
    step: AssemblyStep,
    draft: InstanceDraft,
    committed: bool,
}

impl<P: ParameterProbe> ConfigurationAssembler<P> {
    /// Start a session with an empty draft and the given initial memory.
    pub fn new(discovery: ParameterDiscovery<P>, memory: MemoryMib) -> Self {
        Self {
            discovery,
            step: AssemblyStep::NameAndDescription,
            draft: InstanceDraft::new(memory),
            committed: false,
        }
    }

    pub fn step(&self) -> AssemblyStep {
        self.step
    }

    pub fn draft(&self) -> &InstanceDraft {
        &self.draft
    }

    pub fn discovery(&self) -> &ParameterDiscovery<P> {
        &self.discovery
    }

    /// Move to the next step.
    pub fn advance(&mut self) -> Result<AssemblyStep, AppError> {
        if self.committed {
            return Err(AppError::AlreadyCommitted);
        }
        let next = self.step.next().ok_or(AppError::NoNextStep(self.step))?;
        debug!(from = %self.step, to = %next, "advancing assembly step");
        self.step = next;
        Ok(next)
    }

    // Name and description

    pub fn set_name_and_description(&mut self, name: &str, description: &str) -> Result<(), AppError> {
        self.ensure_reached("set name", AssemblyStep::NameAndDescription)?;
        self.draft.name = name.trim().to_string();
        self.draft.description = description.to_string();
        Ok(())
    }

    // Machine and CPU

    /// Select the machine type. A non-empty machine supplies its own CPU, so any CPU
    /// selection is cleared. Choosing a different machine drops its serialized settings.
    pub fn select_machine(&mut self, token: &str) -> Result<(), AppError> {
        self.ensure_reached("select machine", AssemblyStep::MachineAndCpu)?;
        let token = token.trim();
        if token != self.draft.machine {
            self.draft.machine_settings.clear();
        }
        self.draft.machine = token.to_string();
        if !token.is_empty() && !self.draft.cpu.is_empty() {
            debug!(machine = token, cpu = %self.draft.cpu, "machine selected; clearing CPU");
            self.draft.cpu.clear();
        }
        Ok(())
    }

    /// CPU selection is only enabled while no machine is selected.
    pub fn cpu_selectable(&self) -> bool {
        self.draft.machine.is_empty()
    }

    pub fn select_cpu(&mut self, token: &str) -> Result<(), AppError> {
        self.ensure_reached("select CPU", AssemblyStep::MachineAndCpu)?;
        if !self.cpu_selectable() {
            return Err(AppError::CpuSelectionDisabled(self.draft.machine.clone()));
        }
        self.draft.cpu = token.trim().to_string();
        Ok(())
    }

    /// Probe the selected machine for its parameters.
    pub fn probe_machine(&self, cancel: &CancellationToken) -> Result<ProbeReport, AppError> {
        self.ensure_reached("probe machine", AssemblyStep::MachineAndCpu)?;
        if self.draft.machine.is_empty() {
            return Err(AppError::MissingSelection("machine"));
        }
        self.discovery.discover(CandidateKind::Machine, &self.draft.machine, cancel)
    }

    /// Replace the machine settings with the enabled choices and extra lines.
    pub fn apply_machine_settings(
        &mut self,
        choices: &[SettingChoice],
        extra_arguments: &str,
    ) -> Result<(), AppError> {
        self.ensure_reached("apply machine settings", AssemblyStep::MachineAndCpu)?;
        if self.draft.machine.is_empty() {
            return Err(AppError::MissingSelection("machine"));
        }
        self.draft.machine_settings = aggregate_settings(choices, extra_arguments);
        Ok(())
    }

    pub fn select_all_cores(&mut self, checked: bool) -> Result<(), AppError> {
        self.ensure_reached("select all cores", AssemblyStep::MachineAndCpu)?;
        self.draft.smp.select_all(checked);
        Ok(())
    }

    pub fn enter_smp(&mut self, text: &str) -> Result<(), AppError> {
        self.ensure_reached("enter SMP", AssemblyStep::MachineAndCpu)?;
        self.draft.smp.enter_text(text)
    }

    pub fn increase_memory(&mut self) -> Result<MemoryMib, AppError> {
        self.ensure_reached("increase memory", AssemblyStep::MachineAndCpu)?;
        self.draft.memory = self.draft.memory.increased()?;
        Ok(self.draft.memory)
    }

    pub fn decrease_memory(&mut self) -> Result<MemoryMib, AppError> {
        self.ensure_reached("decrease memory", AssemblyStep::MachineAndCpu)?;
        self.draft.memory = self.draft.memory.decreased()?;
        Ok(self.draft.memory)
    }

    // Image, network, kernel

    pub fn set_image(&mut self, path: &str) -> Result<(), AppError> {
        self.ensure_reached("set image", AssemblyStep::ImageSelection)?;
        self.draft.image = path.trim().to_string();
        Ok(())
    }

    /// Addresses are kept as typed and checked at commit.
    pub fn set_network(
        &mut self,
        interface_name: &str,
        ip_address: &str,
        subnet_mask: &str,
        gateway: Option<&str>,
    ) -> Result<(), AppError> {
        self.ensure_reached("set network", AssemblyStep::NetworkSelection)?;
        self.draft.interface_name = interface_name.trim().to_string();
        self.draft.ip_address = ip_address.trim().to_string();
        self.draft.subnet_mask = subnet_mask.trim().to_string();
        self.draft.gateway = gateway.map(str::trim).unwrap_or_default().to_string();
        Ok(())
    }

    pub fn set_kernel_and_application(
        &mut self,
        kernel: &str,
        application: &str,
    ) -> Result<(), AppError> {
        self.ensure_reached("set kernel", AssemblyStep::KernelAndApplication)?;
        self.draft.kernel = kernel.trim().to_string();
        self.draft.application = application.trim().to_string();
        Ok(())
    }

    // Device loop

    pub fn probe_device(&self, token: &str, cancel: &CancellationToken) -> Result<ProbeReport, AppError> {
        self.ensure_reached("probe device", AssemblyStep::DeviceLoop)?;
        self.discovery.discover(CandidateKind::Device, token, cancel)
    }

    /// Append a device. Duplicate tokens are allowed. Returns the new device's index.
    pub fn add_device(&mut self, token: &str, settings: Vec<String>) -> Result<usize, AppError> {
        self.ensure_reached("add device", AssemblyStep::DeviceLoop)?;
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::MissingSelection("device"));
        }
        self.draft.devices.push(DeviceSelection::new(token, settings));
        debug!(device = token, count = self.draft.devices.len(), "device added");
        Ok(self.draft.devices.len() - 1)
    }

    /// Append a device whose settings come from a settings form.
    pub fn add_configured_device(
        &mut self,
        token: &str,
        choices: &[SettingChoice],
        extra_arguments: &str,
    ) -> Result<usize, AppError> {
        self.add_device(token, aggregate_settings(choices, extra_arguments))
    }

    /// Replace the settings of the device at `index`.
    pub fn edit_device(&mut self, index: usize, settings: Vec<String>) -> Result<(), AppError> {
        self.ensure_reached("edit device", AssemblyStep::DeviceLoop)?;
        let len = self.draft.devices.len();
        let device = self.draft.devices.get_mut(index).ok_or(IndexError { index, len })?;
        device.settings = settings;
        Ok(())
    }

    pub fn remove_device(&mut self, index: usize) -> Result<DeviceSelection, AppError> {
        self.ensure_reached("remove device", AssemblyStep::DeviceLoop)?;
        let len = self.draft.devices.len();
        if index >= len {
            return Err(IndexError { index, len }.into());
        }
        let removed = self.draft.devices.remove(index);
        debug!(device = %removed.device, index, "device removed");
        Ok(removed)
    }

    pub fn devices(&self) -> &[DeviceSelection] {
        &self.draft.devices
    }

    // Commit

    /// Validate the whole draft. On failure nothing changes and the session stays open.
    pub fn commit(&mut self) -> Result<InstanceConfiguration, AppError> {
        self.ensure_reached("commit", AssemblyStep::Commit)?;
        let configuration = self.draft.validate()?;
        self.committed = true;
        info!(
            name = configuration.name(),
            devices = configuration.devices().len(),
            memory = %configuration.memory(),
            "configuration committed"
        );
        Ok(configuration)
    }

    fn ensure_reached(&self, operation: &'static str, required: AssemblyStep) -> Result<(), AppError> {
        if self.committed {
            return Err(AppError::AlreadyCommitted);
        }
        if self.step < required {
            return Err(AppError::StepNotReached { operation, required, current: self.step });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::domain::{SettingValue, SmpMode, SmpState, Violation, choices_for};
    use crate::testing::{FakeProbe, NET_DEVICE_LISTING, VIRT_MACHINE_LISTING, test_config};

    fn assembler() -> ConfigurationAssembler<FakeProbe> {
        let probe = FakeProbe::new()
            .with_output("virt", VIRT_MACHINE_LISTING)
            .with_output("virtio-net-device", NET_DEVICE_LISTING);
        let discovery = ParameterDiscovery::new(probe, &test_config()).unwrap();
        ConfigurationAssembler::new(discovery, MemoryMib::new(256))
    }

    fn advance_to(assembler: &mut ConfigurationAssembler<FakeProbe>, step: AssemblyStep) {
        while assembler.step() < step {
            assembler.advance().unwrap();
        }
    }

    fn fill_required(assembler: &mut ConfigurationAssembler<FakeProbe>) {
        assembler.set_name_and_description("sensor-node", "edge gateway").unwrap();
        advance_to(assembler, AssemblyStep::MachineAndCpu);
        assembler.select_machine("virt").unwrap();
        assembler.enter_smp("2").unwrap();
        advance_to(assembler, AssemblyStep::ImageSelection);
        assembler.set_image("/images/rootfs.ext4").unwrap();
        advance_to(assembler, AssemblyStep::NetworkSelection);
        assembler.set_network("tap0", "192.168.7.2", "255.255.255.0", None).unwrap();
        advance_to(assembler, AssemblyStep::KernelAndApplication);
        assembler.set_kernel_and_application("/boot/Image", "/opt/app/sensor").unwrap();
        advance_to(assembler, AssemblyStep::DeviceLoop);
    }

    #[test]
    fn operations_before_their_step_are_rejected() {
        let mut assembler = assembler();

        let err = assembler.set_image("/images/rootfs.ext4").unwrap_err();
        assert!(matches!(
            err,
            AppError::StepNotReached {
                required: AssemblyStep::ImageSelection,
                current: AssemblyStep::NameAndDescription,
                ..
            }
        ));
        assert!(matches!(assembler.add_device("pl011", vec![]), Err(AppError::StepNotReached { .. })));
        assert!(assembler.draft().image.is_empty());
    }

    #[test]
    fn earlier_steps_stay_editable() {
        let mut assembler = assembler();
        advance_to(&mut assembler, AssemblyStep::NetworkSelection);

        assembler.set_name_and_description("renamed", "").unwrap();

        assert_eq!(assembler.draft().name, "renamed");
        assert_eq!(assembler.step(), AssemblyStep::NetworkSelection);
    }

    #[test]
    fn advance_stops_at_commit() {
        let mut assembler = assembler();
        advance_to(&mut assembler, AssemblyStep::Commit);

        assert!(matches!(assembler.advance(), Err(AppError::NoNextStep(AssemblyStep::Commit))));
    }

    #[test]
    fn machine_selection_clears_and_disables_cpu() {
        let mut assembler = assembler();
        advance_to(&mut assembler, AssemblyStep::MachineAndCpu);

        assembler.select_cpu("cortex-a53").unwrap();
        assembler.select_machine("virt").unwrap();

        assert!(assembler.draft().cpu.is_empty());
        assert!(!assembler.cpu_selectable());
        assert!(matches!(assembler.select_cpu("cortex-a72"), Err(AppError::CpuSelectionDisabled(m)) if m == "virt"));

        assembler.select_machine("").unwrap();
        assembler.select_cpu("cortex-a72").unwrap();
        assert_eq!(assembler.draft().cpu, "cortex-a72");
    }

    #[test]
    fn machine_settings_follow_probe_and_reset_on_machine_change() {
        let mut assembler = assembler();
        advance_to(&mut assembler, AssemblyStep::MachineAndCpu);
        assembler.select_machine("virt").unwrap();

        let report = assembler.probe_machine(&CancellationToken::new()).unwrap();
        let mut choices = choices_for(&report.descriptors);
        choices[0].enable(SettingValue::Text("3".to_string())).unwrap();
        assembler.apply_machine_settings(&choices, "highmem=on").unwrap();

        assert_eq!(assembler.draft().machine_settings, vec!["gic-version=3", "highmem=on"]);

        assembler.select_machine("virt").unwrap();
        assert_eq!(assembler.draft().machine_settings.len(), 2);
        assembler.select_machine("sbsa-ref").unwrap();
        assert!(assembler.draft().machine_settings.is_empty());
    }

    #[test]
    fn probing_without_machine_is_a_missing_selection() {
        let mut assembler = assembler();
        advance_to(&mut assembler, AssemblyStep::MachineAndCpu);

        let err = assembler.probe_machine(&CancellationToken::new()).unwrap_err();
        assert!(matches!(err, AppError::MissingSelection("machine")));
    }

    #[test]
    fn smp_controls_are_exclusive() {
        let mut assembler = assembler();
        advance_to(&mut assembler, AssemblyStep::MachineAndCpu);

        assembler.enter_smp("4").unwrap();
        assembler.select_all_cores(true).unwrap();
        assert_eq!(assembler.draft().smp, SmpState::AllSelected);
        assert_eq!(assembler.draft().smp.numeric_text(), "");

        assembler.enter_smp("8").unwrap();
        assert_eq!(assembler.draft().smp, SmpState::NumericEntered(8));
        assert!(!assembler.draft().smp.all_checked());
    }

    #[test]
    fn memory_doubles_and_halves() {
        let mut assembler = assembler();
        advance_to(&mut assembler, AssemblyStep::MachineAndCpu);

        assert_eq!(assembler.increase_memory().unwrap().value(), 512);
        assert_eq!(assembler.increase_memory().unwrap().value(), 1024);
        assert_eq!(assembler.decrease_memory().unwrap().value(), 512);
    }

    #[test]
    fn device_probe_failure_leaves_session_usable() {
        let mut assembler = assembler();
        fill_required(&mut assembler);

        let err = assembler.probe_device("usb-kbd", &CancellationToken::new()).unwrap_err();
        assert!(matches!(err, AppError::Probe(_)));

        assembler.add_device("usb-kbd", vec![]).unwrap();
        assert_eq!(assembler.devices().len(), 1);
    }

    #[test]
    fn device_loop_adds_edits_and_removes() {
        let mut assembler = assembler();
        fill_required(&mut assembler);

        let report = assembler.probe_device("virtio-net-device", &CancellationToken::new()).unwrap();
        let mut choices = choices_for(&report.descriptors);
        for choice in choices.iter_mut().filter(|choice| choice.name() == "netdev") {
            choice.enable(SettingValue::Text("net0".to_string())).unwrap();
        }
        let first = assembler.add_configured_device("virtio-net-device", &choices, "").unwrap();
        let second = assembler.add_device("virtio-net-device", vec![]).unwrap();
        let third = assembler.add_device("pl011", vec!["chardev=serial0".to_string()]).unwrap();

        assert_eq!((first, second, third), (0, 1, 2));
        assert_eq!(assembler.devices()[0].argument(), "virtio-net-device,netdev=net0");

        assembler.edit_device(1, vec!["netdev=net1".to_string()]).unwrap();
        let removed = assembler.remove_device(0).unwrap();

        assert_eq!(removed.device, "virtio-net-device");
        assert_eq!(assembler.devices()[0].argument(), "virtio-net-device,netdev=net1");
        assert_eq!(assembler.devices()[1].argument(), "pl011,chardev=serial0");
    }

    #[test]
    fn out_of_range_device_index_leaves_state_unchanged() {
        let mut assembler = assembler();
        fill_required(&mut assembler);
        assembler.add_device("pl011", vec![]).unwrap();

        let err = assembler.remove_device(1).unwrap_err();
        assert!(matches!(err, AppError::Index(IndexError { index: 1, len: 1 })));
        assert!(matches!(assembler.edit_device(3, vec![]), Err(AppError::Index(_))));
        assert_eq!(assembler.devices(), &[DeviceSelection::new("pl011", vec![])]);
    }

    #[test]
    fn commit_returns_configuration_once() {
        let mut assembler = assembler();
        fill_required(&mut assembler);
        assembler.add_device("pl011", vec![]).unwrap();
        advance_to(&mut assembler, AssemblyStep::Commit);

        let config = assembler.commit().unwrap();

        assert_eq!(config.name(), "sensor-node");
        assert_eq!(config.smp(), SmpMode::Cores(2));
        assert_eq!(config.devices().len(), 1);
        assert!(matches!(assembler.commit(), Err(AppError::AlreadyCommitted)));
        assert!(matches!(assembler.set_image("/other"), Err(AppError::AlreadyCommitted)));
    }

    #[test]
    fn failed_commit_lists_every_violation_and_keeps_session_open() {
        let mut assembler = assembler();
        advance_to(&mut assembler, AssemblyStep::Commit);

        let err = assembler.commit().unwrap_err();
        let AppError::Validation(validation) = err else {
            panic!("expected validation error");
        };
        assert!(validation.violations.contains(&Violation::MissingField("name")));
        assert!(validation.violations.contains(&Violation::SmpUnset));
        assert!(validation.violations.contains(&Violation::MissingField("image")));

        fill_required(&mut assembler);
        assert!(assembler.commit().is_ok());
    }

    proptest! {
        #[test]
        fn device_list_tracks_adds_and_removes(ops in prop::collection::vec((any::<bool>(), 0usize..6), 0..40)) {
            let mut assembler = assembler();
            fill_required(&mut assembler);
            let mut expected: Vec<String> = Vec::new();

            for (n, (add, index)) in ops.into_iter().enumerate() {
                if add {
                    let token = format!("dev{}", n);
                    assembler.add_device(&token, vec![format!("id=d{}", n)]).unwrap();
                    expected.push(token);
                } else if index < expected.len() {
                    assembler.remove_device(index).unwrap();
                    expected.remove(index);
                } else {
                    prop_assert!(assembler.remove_device(index).is_err());
                }
            }

            let tokens: Vec<_> = assembler.devices().iter().map(|d| d.device.clone()).collect();
            prop_assert_eq!(tokens, expected);
            for device in assembler.devices() {
                prop_assert_eq!(device.settings.len(), 1);
            }
        }
    }
}
