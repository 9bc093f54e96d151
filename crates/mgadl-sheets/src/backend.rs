use mgadl_core::models::cell::CellValue;

use crate::error::SheetsError;

/// Row capacity of a newly created tab.
pub const NEW_TAB_ROWS: u32 = 2000;
/// Column capacity of a newly created tab.
pub const NEW_TAB_COLS: u32 = 80;

/// An opened spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadsheetMeta {
    pub spreadsheet_id: String,
    pub title: String,
    pub tab_titles: Vec<String>,
}

/// A tab inside an opened spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabRef {
    pub spreadsheet_id: String,
    pub spreadsheet_title: String,
    pub title: String,
}

/// What the backend reports after appending a row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppendResponse {
    /// A1 range the row landed in, when the backend reports one.
    pub updated_range: Option<String>,
}

/// The operations this application needs from a hosted spreadsheet.
///
/// Row 1 of a tab is the header; every later row is data aligned to it.
pub trait Spreadsheet: Send + Sync {
    /// Fails with [`SheetsError::NotFound`] if the id is invalid or not shared.
    fn open_by_id(&self, spreadsheet_id: &str) -> Result<SpreadsheetMeta, SheetsError>;

    /// Return the named tab, creating it with
    /// [`NEW_TAB_ROWS`] x [`NEW_TAB_COLS`] capacity if absent.
    fn get_or_create_tab(
        &self,
        spreadsheet: &SpreadsheetMeta,
        name: &str,
    ) -> Result<TabRef, SheetsError>;

    /// Row 1 as column names; empty if the tab has no rows.
    fn read_header_row(&self, tab: &TabRef) -> Result<Vec<String>, SheetsError>;

    /// Overwrite row 1.
    fn write_header_row(&self, tab: &TabRef, columns: &[String]) -> Result<(), SheetsError>;

    /// Append one row after the last data row.
    fn append_row(
        &self,
        tab: &TabRef,
        values: &[CellValue],
    ) -> Result<AppendResponse, SheetsError>;
}
