use crate::domain::{AppError, Candidate, CandidateKind};
use crate::ports::CandidateCatalog;

/// Candidates of `kind`, optionally narrowed to one device category.
pub fn execute<C: CandidateCatalog>(
    catalog: &C,
    kind: CandidateKind,
    category: Option<&str>,
) -> Result<Vec<Candidate>, AppError> {
    let Some(category) = category else {
        return Ok(catalog.list(kind).into_iter().cloned().collect());
    };

    if kind != CandidateKind::Device {
        return Err(AppError::UnknownCandidate {
            kind: "category".to_string(),
            token: format!("{} (categories apply to devices only)", category),
        });
    }
    catalog
        .device_categories()
        .iter()
        .find(|entry| entry.name.eq_ignore_ascii_case(category))
        .map(|entry| entry.devices.clone())
        .ok_or_else(|| AppError::UnknownCandidate {
            kind: "category".to_string(),
            token: category.to_string(),
        })
}
