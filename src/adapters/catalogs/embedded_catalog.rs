//! Candidate catalog loaded from embedded YAML assets.

use include_dir::{Dir, include_dir};
use serde::de::DeserializeOwned;

use crate::domain::{AppError, Candidate, CandidateKind, DeviceCategory};
use crate::ports::CandidateCatalog;

/// Embedded catalog directory.
static CATALOG_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/src/assets/catalog");

/// Machines, CPUs and device categories shipped with the binary.
#[derive(Debug, Clone)]
pub struct EmbeddedCandidateCatalog {
    machines: Vec<Candidate>,
    cpus: Vec<Candidate>,
    categories: Vec<DeviceCategory>,
}

impl EmbeddedCandidateCatalog {
    /// Load all embedded lists.
    pub fn new() -> Result<Self, AppError> {
        Ok(Self {
            machines: load_asset("machines.yml")?,
            cpus: load_asset("cpus.yml")?,
            categories: load_asset("devices.yml")?,
        })
    }

    /// Device categories by name, in display order.
    pub fn category(&self, name: &str) -> Option<&DeviceCategory> {
        self.categories.iter().find(|category| category.name.eq_ignore_ascii_case(name))
    }
}

fn load_asset<T: DeserializeOwned>(name: &str) -> Result<T, AppError> {
    let file = CATALOG_DIR.get_file(name).ok_or_else(|| AppError::InvalidCatalog {
        asset: name.to_string(),
        reason: "missing from embedded catalog".to_string(),
    })?;
    let content = file.contents_utf8().ok_or_else(|| AppError::InvalidCatalog {
        asset: name.to_string(),
        reason: "not valid UTF-8".to_string(),
    })?;
    serde_yaml::from_str(content)
        .map_err(|e| AppError::InvalidCatalog { asset: name.to_string(), reason: e.to_string() })
}

impl CandidateCatalog for EmbeddedCandidateCatalog {
    fn list(&self, kind: CandidateKind) -> Vec<&Candidate> {
        match kind {
            CandidateKind::Machine => self.machines.iter().collect(),
            CandidateKind::Cpu => self.cpus.iter().collect(),
            CandidateKind::Device => {
                self.categories.iter().flat_map(|category| category.devices.iter()).collect()
            }
        }
    }

    fn device_categories(&self) -> &[DeviceCategory] {
        &self.categories
    }
}
