pub mod assembly_step;
pub mod candidate;
pub mod config;
pub mod error;
pub mod instance;
pub mod parameters;
pub mod plan;

pub use assembly_step::AssemblyStep;
pub use candidate::{Candidate, CandidateKind, DeviceCategory};
pub use config::{AppConfig, DefaultsConfig, EmulatorConfig, ParserProfile};
pub use error::{AppError, IndexError, MemoryAdjustError, ProbeError, ValidationError, Violation};
pub use instance::{
    DeviceSelection, InstanceConfiguration, InstanceDraft, MemoryMib, SmpMode, SmpState,
};
pub use parameters::{
    BOOL_TYPE, ParameterDescriptor, ParameterParser, ParseWarning, ProbeReport, SettingChoice,
    SettingValue, aggregate_settings, choices_for, set_all_enabled, split_arguments,
};
pub use plan::{PlanDevice, PlanSmp, PlanValue, SessionPlan, planned_choices};
