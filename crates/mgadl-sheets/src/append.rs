use mgadl_core::columns;
use mgadl_core::models::record::Record;

use crate::backend::Spreadsheet;
use crate::error::SheetsError;
use crate::header;

pub const DEFAULT_WORKSHEET_NAME: &str = "responses";

/// Where records go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetTarget {
    pub spreadsheet_id: String,
    pub worksheet_name: String,
}

impl SheetTarget {
    pub fn new(spreadsheet_id: impl Into<String>, worksheet_name: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            worksheet_name: worksheet_name.into(),
        }
    }
}

/// Where a record was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendInfo {
    pub spreadsheet_title: String,
    pub worksheet_title: String,
    pub updated_range: Option<String>,
    pub header_len: usize,
}

/// Append `record` as one row, aligned to the tab's current header after
/// reconciling it with the expected columns.
///
/// An empty spreadsheet id fails with [`SheetsError::Config`] before the
/// backend is touched.
pub fn append_record(
    backend: &dyn Spreadsheet,
    target: &SheetTarget,
    record: &Record,
) -> Result<AppendInfo, SheetsError> {
    if target.spreadsheet_id.trim().is_empty() {
        return Err(SheetsError::Config("SHEET_ID is not configured".to_string()));
    }

    let spreadsheet = backend.open_by_id(&target.spreadsheet_id)?;
    let tab = backend.get_or_create_tab(&spreadsheet, &target.worksheet_name)?;
    let header = header::ensure_header(backend, &tab, &columns::expected_header())?;

    let row = record.row_for_header(&header);
    let response = backend.append_row(&tab, &row)?;

    tracing::info!(
        submission_id = %record.submission_id,
        patient_hash = %record.patient_hash,
        tab = %tab.title,
        range = response.updated_range.as_deref().unwrap_or("-"),
        "record appended"
    );

    Ok(AppendInfo {
        spreadsheet_title: tab.spreadsheet_title,
        worksheet_title: tab.title,
        updated_range: response.updated_range,
        header_len: header.len(),
    })
}
