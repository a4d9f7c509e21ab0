use std::fmt;

/// Steps of an assembly session, in the only order they may be visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AssemblyStep {
    NameAndDescription,
    MachineAndCpu,
    ImageSelection,
    NetworkSelection,
    KernelAndApplication,
    DeviceLoop,
    Commit,
}

impl AssemblyStep {
    pub const ALL: [AssemblyStep; 7] = [
        AssemblyStep::NameAndDescription,
        AssemblyStep::MachineAndCpu,
        AssemblyStep::ImageSelection,
        AssemblyStep::NetworkSelection,
        AssemblyStep::KernelAndApplication,
        AssemblyStep::DeviceLoop,
        AssemblyStep::Commit,
    ];

    pub fn next(self) -> Option<AssemblyStep> {
        let index = Self::ALL.iter().position(|step| *step == self)?;
        Self::ALL.get(index + 1).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            AssemblyStep::NameAndDescription => "name and description",
            AssemblyStep::MachineAndCpu => "machine and CPU",
            AssemblyStep::ImageSelection => "image",
            AssemblyStep::NetworkSelection => "network",
            AssemblyStep::KernelAndApplication => "kernel and application",
            AssemblyStep::DeviceLoop => "devices",
            AssemblyStep::Commit => "commit",
        }
    }

    /// Step that collects a configuration field.
    pub fn owning_field(field: &str) -> AssemblyStep {
        match field {
            "name" | "description" => AssemblyStep::NameAndDescription,
            "machine" | "machine_settings" | "cpu" | "smp" | "memory" => {
                AssemblyStep::MachineAndCpu
            }
            "image" => AssemblyStep::ImageSelection,
            "interface_name" | "ip_address" | "subnet_mask" | "gateway" => {
                AssemblyStep::NetworkSelection
            }
            "kernel" | "application" => AssemblyStep::KernelAndApplication,
            "devices" => AssemblyStep::DeviceLoop,
            _ => AssemblyStep::Commit,
        }
    }
}

impl fmt::Display for AssemblyStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
