pub mod catalogs;
pub mod config_file;
pub mod emulator_probe;
pub mod manifest_launcher;

pub use catalogs::EmbeddedCandidateCatalog;
pub use emulator_probe::EmulatorProbe;
pub use manifest_launcher::{LaunchManifest, ManifestLauncher};
