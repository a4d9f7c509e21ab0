mod configuration;
mod memory;
mod smp;

pub use configuration::{DeviceSelection, InstanceConfiguration, InstanceDraft};
pub use memory::{MAX_MEMORY_MIB, MIN_MEMORY_MIB, MemoryMib};
pub use smp::{MAX_SMP_CORES, SmpMode, SmpState};
