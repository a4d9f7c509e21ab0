use std::fmt;

use serde::Serialize;

use crate::domain::MemoryAdjustError;

pub const MIN_MEMORY_MIB: u64 = 1;
pub const MAX_MEMORY_MIB: u64 = 1 << 20;

/// Guest memory in MiB, adjusted only by doubling or halving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MemoryMib(u64);

impl MemoryMib {
    /// Initial control value. Not checked here; commit validates the power-of-two invariant.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    pub fn is_power_of_two(self) -> bool {
        self.0.is_power_of_two()
    }

    pub fn increased(self) -> Result<Self, MemoryAdjustError> {
        match self.0.checked_mul(2) {
            Some(next) if next <= MAX_MEMORY_MIB && next > 0 => Ok(Self(next)),
            _ => Err(MemoryAdjustError::AboveMaximum(MAX_MEMORY_MIB)),
        }
    }

    pub fn decreased(self) -> Result<Self, MemoryAdjustError> {
        if self.0 <= MIN_MEMORY_MIB {
            return Err(MemoryAdjustError::BelowMinimum(MIN_MEMORY_MIB));
        }
        if self.0 % 2 != 0 {
            return Err(MemoryAdjustError::NotHalvable(self.0));
        }
        Ok(Self(self.0 / 2))
    }
}

impl fmt::Display for MemoryMib {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} MiB", self.0)
    }
}
