use std::fmt;

use serde::{Serialize, Serializer};

use crate::domain::AppError;

pub const MAX_SMP_CORES: u16 = 256;

/// SMP setting of a committed configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmpMode {
    Cores(u16),
    All,
}

impl Serialize for SmpMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SmpMode::Cores(count) => serializer.serialize_u16(*count),
            SmpMode::All => serializer.serialize_str("all"),
        }
    }
}

impl fmt::Display for SmpMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SmpMode::Cores(count) => write!(f, "{}", count),
            SmpMode::All => f.write_str("all"),
        }
    }
}

/// The "all cores" checkbox and the core-count entry, exclusive by construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SmpState {
    #[default]
    Unset,
    NumericEntered(u16),
    AllSelected,
}

impl SmpState {
    /// Toggle "all cores". Checking it clears any numeric entry.
    pub fn select_all(&mut self, checked: bool) {
        if checked {
            *self = SmpState::AllSelected;
        } else if *self == SmpState::AllSelected {
            *self = SmpState::Unset;
        }
    }

    /// Apply text typed into the core-count entry. A valid count unchecks "all cores";
    /// clearing the text clears the count. Invalid text leaves the state unchanged.
    pub fn enter_text(&mut self, text: &str) -> Result<(), AppError> {
        let text = text.trim();
        if text.is_empty() {
            if matches!(self, SmpState::NumericEntered(_)) {
                *self = SmpState::Unset;
            }
            return Ok(());
        }

        let count = text
            .parse::<u16>()
            .ok()
            .filter(|count| (1..=MAX_SMP_CORES).contains(count))
            .ok_or_else(|| AppError::InvalidSmp(text.to_string()))?;
        *self = SmpState::NumericEntered(count);
        Ok(())
    }

    pub fn all_checked(&self) -> bool {
        *self == SmpState::AllSelected
    }

    /// Contents of the core-count entry.
    pub fn numeric_text(&self) -> String {
        match self {
            SmpState::NumericEntered(count) => count.to_string(),
            _ => String::new(),
        }
    }

    pub fn mode(&self) -> Option<SmpMode> {
        match self {
            SmpState::Unset => None,
            SmpState::NumericEntered(count) => Some(SmpMode::Cores(*count)),
            SmpState::AllSelected => Some(SmpMode::All),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_then_numeric_is_mutually_exclusive() {
        let mut smp = SmpState::default();
        smp.enter_text("4").unwrap();
        assert_eq!(smp, SmpState::NumericEntered(4));

        smp.select_all(true);
        assert_eq!(smp, SmpState::AllSelected);
        assert_eq!(smp.numeric_text(), "");

        smp.enter_text("8").unwrap();
        assert_eq!(smp, SmpState::NumericEntered(8));
        assert!(!smp.all_checked());
    }

    #[test]
    fn rejects_out_of_range_counts() {
        let mut smp = SmpState::NumericEntered(2);
        for text in ["0", "257", "four", "-1"] {
            assert!(matches!(smp.enter_text(text), Err(AppError::InvalidSmp(_))));
        }
        assert_eq!(smp, SmpState::NumericEntered(2));

        smp.enter_text("256").unwrap();
        assert_eq!(smp.mode(), Some(SmpMode::Cores(256)));
    }

    #[test]
    fn clearing_returns_to_unset() {
        let mut smp = SmpState::NumericEntered(2);
        smp.enter_text("").unwrap();
        assert_eq!(smp, SmpState::Unset);

        let mut all = SmpState::AllSelected;
        all.enter_text("  ").unwrap();
        assert_eq!(all, SmpState::AllSelected);
        all.select_all(false);
        assert_eq!(all.mode(), None);
    }

    #[test]
    fn unchecking_all_keeps_numeric_entry() {
        let mut smp = SmpState::NumericEntered(6);
        smp.select_all(false);
        assert_eq!(smp, SmpState::NumericEntered(6));
    }
}
