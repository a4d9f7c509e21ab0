//! Non-interactive session plans (`vmlaunch build --plan`).

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::domain::{AppError, ParameterDescriptor, SettingChoice, SettingValue, choices_for};

/// Answers for every assembly step, replayed in order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionPlan {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub machine: String,
    #[serde(default)]
    pub machine_settings: BTreeMap<String, PlanValue>,
    #[serde(default)]
    pub machine_extra: Vec<String>,
    #[serde(default)]
    pub cpu: String,
    #[serde(default)]
    pub smp: Option<PlanSmp>,
    /// Positive values double the default memory that many times, negative values halve it.
    #[serde(default)]
    pub memory_steps: i32,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub interface: String,
    #[serde(default)]
    pub ip_address: String,
    #[serde(default)]
    pub subnet_mask: String,
    #[serde(default)]
    pub gateway: Option<String>,
    #[serde(default)]
    pub kernel: String,
    #[serde(default)]
    pub application: String,
    #[serde(default)]
    pub devices: Vec<PlanDevice>,
}

impl SessionPlan {
    pub fn parse(content: &str) -> Result<Self, AppError> {
        Ok(toml::from_str(content)?)
    }
}

/// A device to add during the device loop.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanDevice {
    pub token: String,
    #[serde(default)]
    pub settings: BTreeMap<String, PlanValue>,
    #[serde(default)]
    pub extra: Vec<String>,
}

/// `smp = 4` or `smp = "all"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PlanSmp {
    Count(u16),
    Keyword(String),
}

/// Value written for a setting in a plan.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PlanValue {
    Flag(bool),
    Integer(i64),
    Text(String),
}

impl PlanValue {
    /// Convert to the form value matching the descriptor's type.
    pub fn to_setting(&self, descriptor: &ParameterDescriptor) -> Result<SettingValue, AppError> {
        if descriptor.is_bool() {
            return match self {
                PlanValue::Flag(value) => Ok(SettingValue::Flag(*value)),
                PlanValue::Text(text) => match text.to_ascii_lowercase().as_str() {
                    "true" | "on" => Ok(SettingValue::Flag(true)),
                    "false" | "off" => Ok(SettingValue::Flag(false)),
                    _ => Err(not_bool(descriptor)),
                },
                PlanValue::Integer(_) => Err(not_bool(descriptor)),
            };
        }

        Ok(SettingValue::Text(match self {
            PlanValue::Flag(value) => value.to_string(),
            PlanValue::Integer(value) => value.to_string(),
            PlanValue::Text(text) => text.clone(),
        }))
    }
}

fn not_bool(descriptor: &ParameterDescriptor) -> AppError {
    AppError::InvalidPlan(format!("setting '{}' expects true or false", descriptor.name))
}

/// Choices enabling exactly the planned settings, plus planned names the probe did not report.
pub fn planned_choices(
    descriptors: &[ParameterDescriptor],
    planned: &BTreeMap<String, PlanValue>,
) -> Result<(Vec<SettingChoice>, Vec<String>), AppError> {
    let mut choices = choices_for(descriptors);
    for choice in &mut choices {
        if let Some(value) = planned.get(choice.name()) {
            let setting = value.to_setting(&choice.descriptor)?;
            choice.enable(setting)?;
        }
    }

    let unknown = planned
        .keys()
        .filter(|name| !descriptors.iter().any(|descriptor| &descriptor.name == *name))
        .cloned()
        .collect();

    Ok((choices, unknown))
}
