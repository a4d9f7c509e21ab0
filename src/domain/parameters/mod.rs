mod descriptor;
mod parser;
mod settings;

pub use descriptor::{BOOL_TYPE, ParameterDescriptor, ParseWarning, ProbeReport};
pub use parser::ParameterParser;
pub use settings::{
    SettingChoice, SettingValue, aggregate_settings, choices_for, set_all_enabled, split_arguments,
};
