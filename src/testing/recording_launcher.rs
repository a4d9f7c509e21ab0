use std::sync::Mutex;

use crate::domain::{AppError, InstanceConfiguration};
use crate::ports::Launcher;

#[derive(Default)]
pub struct RecordingLauncher {
    pub launched: Mutex<Vec<InstanceConfiguration>>,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Launcher for RecordingLauncher {
    fn launch(&self, config: InstanceConfiguration) -> Result<(), AppError> {
        self.launched.lock().unwrap().push(config);
        Ok(())
    }
}
