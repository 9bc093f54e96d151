use mgadl_core::models::record::Record;
use mgadl_export::csv;
use mgadl_export::render::{self, WrittenTo};
use mgadl_export::summary::ResultSummary;
use mgadl_sheets::append::AppendInfo;

use crate::error::WizardError;

/// What the result step shows.
#[derive(Debug, Clone)]
pub struct ResultView {
    pub summary: ResultSummary,
    pub record: Record,
    pub written: AppendInfo,
}

impl ResultView {
    pub fn written_to(&self) -> WrittenTo {
        WrittenTo {
            spreadsheet_title: self.written.spreadsheet_title.clone(),
            worksheet_title: self.written.worksheet_title.clone(),
            updated_range: self.written.updated_range.clone(),
        }
    }

    /// Plain-text summary of the result.
    pub fn render(&self) -> Result<String, WizardError> {
        Ok(render::render_summary(&self.summary, Some(&self.written_to()))?)
    }

    /// `(file name, contents)` of the CSV download.
    pub fn csv_download(&self, now: jiff::civil::DateTime) -> (String, String) {
        (
            csv::file_name(&self.record, now),
            csv::record_csv(&self.record),
        )
    }
}
