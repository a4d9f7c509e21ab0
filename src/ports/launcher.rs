use crate::domain::{AppError, InstanceConfiguration};

/// Receives the committed configuration. Spawning the emulator is the implementor's concern.
pub trait Launcher {
    fn launch(&self, config: InstanceConfiguration) -> Result<(), AppError>;
}
