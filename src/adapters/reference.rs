use crate::core::matcher::BannedSubstanceSet;
use crate::utils::error::{Result, ScanError};
use std::path::Path;

pub const DEFAULT_SUBSTANCE_COLUMN: &str = "substance_name";

/// Read the banned-substance table, failing on any I/O, CSV or schema problem.
pub fn try_load_banned_substances<P: AsRef<Path>>(
    path: P,
    column: &str,
) -> Result<BannedSubstanceSet> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)?;

    let column_index = reader
        .headers()?
        .iter()
        .position(|header| header == column)
        .ok_or_else(|| ScanError::ReferenceDataError {
            message: format!("column '{}' not found in {}", column, path.display()),
        })?;

    let mut names = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(name) = record.get(column_index) {
            names.push(name.to_string());
        }
    }

    Ok(BannedSubstanceSet::new(names))
}

/// Startup loader: any failure degrades to an empty set and is only logged.
pub fn load_banned_substances<P: AsRef<Path>>(path: P, column: &str) -> BannedSubstanceSet {
    let path = path.as_ref();
    match try_load_banned_substances(path, column) {
        Ok(set) => {
            tracing::info!(
                path = %path.display(),
                count = set.len(),
                "Loaded banned substances"
            );
            set
        }
        Err(e) => {
            tracing::error!(
                path = %path.display(),
                "Error loading banned substances: {} ({})",
                e,
                e.recovery_suggestion()
            );
            BannedSubstanceSet::default()
        }
    }
}
