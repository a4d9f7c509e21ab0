//! Serialization of enabled parameter choices into emulator arguments.

use crate::domain::{AppError, ParameterDescriptor};

/// Current value of a parameter in the settings form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    Flag(bool),
    Text(String),
}

impl SettingValue {
    fn fits(&self, descriptor: &ParameterDescriptor) -> bool {
        matches!(self, SettingValue::Flag(_)) == descriptor.is_bool()
    }

    fn render(&self) -> String {
        match self {
            SettingValue::Flag(value) => value.to_string(),
            SettingValue::Text(value) => value.clone(),
        }
    }
}

/// A descriptor paired with the caller's enable toggle and value.
///
/// The value always matches the descriptor: `bool` parameters hold a `Flag`, every other type holds `Text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingChoice {
    pub descriptor: ParameterDescriptor,
    pub enabled: bool,
    value: SettingValue,
}

impl SettingChoice {
    /// Disabled choice with the empty value matching the descriptor's type.
    pub fn new(descriptor: ParameterDescriptor) -> Self {
        let value = if descriptor.is_bool() {
            SettingValue::Flag(false)
        } else {
            SettingValue::Text(String::new())
        };
        Self { descriptor, enabled: false, value }
    }

    pub fn enabled_with(descriptor: ParameterDescriptor, value: SettingValue) -> Result<Self, AppError> {
        let mut choice = Self::new(descriptor);
        choice.enable(value)?;
        Ok(choice)
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn value(&self) -> &SettingValue {
        &self.value
    }

    /// Replace the value, rejecting a variant that does not match the descriptor's type.
    pub fn set_value(&mut self, value: SettingValue) -> Result<(), AppError> {
        if !value.fits(&self.descriptor) {
            return Err(AppError::SettingTypeMismatch {
                name: self.descriptor.name.clone(),
                kind: self.descriptor.kind.clone(),
                value: value.render(),
            });
        }
        self.value = value;
        Ok(())
    }

    /// Set the value and turn the choice on.
    pub fn enable(&mut self, value: SettingValue) -> Result<(), AppError> {
        self.set_value(value)?;
        self.enabled = true;
        Ok(())
    }

    fn serialize(&self) -> String {
        format!("{}={}", self.descriptor.name, self.value.render())
    }
}

/// Build the disabled choice list for a set of parsed descriptors.
pub fn choices_for(descriptors: &[ParameterDescriptor]) -> Vec<SettingChoice> {
    descriptors.iter().cloned().map(SettingChoice::new).collect()
}

/// Set every choice's enable toggle at once.
pub fn set_all_enabled(choices: &mut [SettingChoice], enabled: bool) {
    for choice in choices {
        choice.enabled = enabled;
    }
}

/// Serialize enabled choices (in the given order) followed by non-empty extra argument lines.
pub fn aggregate_settings(choices: &[SettingChoice], extra_arguments: &str) -> Vec<String> {
    choices
        .iter()
        .filter(|choice| choice.enabled)
        .map(SettingChoice::serialize)
        .chain(
            extra_arguments
                .lines()
                .map(|line| line.trim_end_matches('\r'))
                .filter(|line| !line.trim().is_empty())
                .map(str::to_string),
        )
        .collect()
}

/// Split a comma-separated argument list, keeping `,,` (the emulator's escaped comma) inside its argument.
pub fn split_arguments(text: &str) -> Vec<String> {
    let mut arguments = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != ',' {
            current.push(c);
        } else if chars.peek() == Some(&',') {
            chars.next();
            current.push_str(",,");
        } else {
            arguments.push(std::mem::take(&mut current));
        }
    }
    arguments.push(current);

    arguments
        .into_iter()
        .map(|argument| argument.trim().to_string())
        .filter(|argument| !argument.is_empty())
        .collect()
}
