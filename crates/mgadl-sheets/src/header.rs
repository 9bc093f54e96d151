//! Append-only header evolution.

use crate::backend::{Spreadsheet, TabRef};
use crate::error::SheetsError;

/// Compute the header row that should replace `current`, or `None` if
/// `current` already holds every expected column.
///
/// An empty header becomes `expected` verbatim. Otherwise missing columns are
/// appended after the existing ones in `expected` order; existing columns are
/// never moved or dropped.
pub fn reconcile(current: &[String], expected: &[String]) -> Option<Vec<String>> {
    if current.is_empty() {
        return Some(expected.to_vec());
    }

    let missing: Vec<&String> = expected.iter().filter(|h| !current.contains(*h)).collect();
    if missing.is_empty() {
        return None;
    }

    let mut header = current.to_vec();
    header.extend(missing.into_iter().cloned());
    Some(header)
}

/// Make sure row 1 of `tab` contains every expected column and return the
/// header rows should be aligned to.
pub fn ensure_header(
    backend: &dyn Spreadsheet,
    tab: &TabRef,
    expected: &[String],
) -> Result<Vec<String>, SheetsError> {
    let current = backend.read_header_row(tab)?;

    match reconcile(&current, expected) {
        None => Ok(current),
        Some(header) => {
            backend.write_header_row(tab, &header)?;
            if current.is_empty() {
                tracing::info!(tab = %tab.title, columns = header.len(), "header created");
            } else {
                tracing::info!(
                    tab = %tab.title,
                    added = header.len() - current.len(),
                    "header extended"
                );
            }
            Ok(header)
        }
    }
}
