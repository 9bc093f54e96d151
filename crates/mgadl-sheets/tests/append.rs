use std::sync::Mutex;

use jiff::civil::date;

use mgadl_core::columns::{self, field, item};
use mgadl_core::models::cell::CellValue;
use mgadl_core::models::patient::PatientIdentity;
use mgadl_core::models::record::Record;
use mgadl_core::models::responses::ResponseSet;
use mgadl_sheets::append::{SheetTarget, append_record};
use mgadl_sheets::backend::{
    AppendResponse, NEW_TAB_COLS, NEW_TAB_ROWS, Spreadsheet, SpreadsheetMeta, TabRef,
};
use mgadl_sheets::error::SheetsError;
use mgadl_sheets::google::GoogleSheets;
use mgadl_sheets::memory::MemorySheets;

fn record() -> Record {
    let patient = PatientIdentity {
        name: "김민수".to_string(),
        dob: date(1988, 12, 1),
    };
    let responses: ResponseSet = item::ALL.iter().map(|id| (*id, 2u8)).collect();
    Record::build(&patient, &responses, "2026-10-16T09:30:00", "salt").unwrap()
}

/// Counts calls and refuses all of them.
#[derive(Default)]
struct RecordingBackend {
    calls: Mutex<Vec<&'static str>>,
}

impl RecordingBackend {
    fn note(&self, call: &'static str) -> SheetsError {
        self.calls.lock().unwrap().push(call);
        SheetsError::Transport("offline".to_string())
    }
}

impl Spreadsheet for RecordingBackend {
    fn open_by_id(&self, _: &str) -> Result<SpreadsheetMeta, SheetsError> {
        Err(self.note("open_by_id"))
    }
    fn get_or_create_tab(&self, _: &SpreadsheetMeta, _: &str) -> Result<TabRef, SheetsError> {
        Err(self.note("get_or_create_tab"))
    }
    fn read_header_row(&self, _: &TabRef) -> Result<Vec<String>, SheetsError> {
        Err(self.note("read_header_row"))
    }
    fn write_header_row(&self, _: &TabRef, _: &[String]) -> Result<(), SheetsError> {
        Err(self.note("write_header_row"))
    }
    fn append_row(&self, _: &TabRef, _: &[CellValue]) -> Result<AppendResponse, SheetsError> {
        Err(self.note("append_row"))
    }
}

#[test]
fn empty_sheet_id_fails_before_backend_is_called() {
    let backend = RecordingBackend::default();
    let err = append_record(&backend, &SheetTarget::new("", "responses"), &record()).unwrap_err();

    assert!(err.is_config());
    assert!(backend.calls.lock().unwrap().is_empty());
}

#[test]
fn blank_sheet_id_counts_as_missing() {
    let backend = RecordingBackend::default();
    let target = SheetTarget::new("   ", "responses");
    let err = append_record(&backend, &target, &record()).unwrap_err();
    assert!(matches!(err, SheetsError::Config(_)));
}

#[test]
fn unknown_spreadsheet_is_not_found() {
    let backend = MemorySheets::new();
    let err = append_record(&backend, &SheetTarget::new("nope", "responses"), &record())
        .unwrap_err();
    assert!(matches!(err, SheetsError::NotFound { spreadsheet_id } if spreadsheet_id == "nope"));
}

#[test]
fn first_append_creates_tab_and_header() {
    let backend = MemorySheets::new().with_spreadsheet("sheet-1", "MG-ADL 누적");
    let info = append_record(&backend, &SheetTarget::new("sheet-1", "responses"), &record())
        .unwrap();

    assert_eq!(info.spreadsheet_title, "MG-ADL 누적");
    assert_eq!(info.worksheet_title, "responses");
    assert_eq!(info.header_len, columns::expected_header().len());
    assert_eq!(info.updated_range.as_deref(), Some("'responses'!A2:N2"));
    assert_eq!(
        backend.capacity("sheet-1", "responses"),
        Some((NEW_TAB_ROWS, NEW_TAB_COLS))
    );

    let rows = backend.rows("sheet-1", "responses").unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1], record().row_for_header(&columns::expected_header()));
}

#[test]
fn legacy_header_is_extended_and_row_aligned_to_it() {
    let legacy: Vec<CellValue> = [
        field::CREATED_AT,
        field::NAME,
        field::DOB,
        field::PATIENT_HASH,
        field::TOTAL_SCORE,
        "memo",
    ]
    .into_iter()
    .chain(item::ALL)
    .map(CellValue::from)
    .collect();

    let backend = MemorySheets::new()
        .with_spreadsheet("sheet-1", "MG-ADL")
        .with_rows("sheet-1", "responses", vec![legacy]);

    let rec = record();
    let info = append_record(&backend, &SheetTarget::new("sheet-1", "responses"), &rec).unwrap();
    assert_eq!(info.header_len, 15);

    let rows = backend.rows("sheet-1", "responses").unwrap();
    let header: Vec<String> = rows[0].iter().map(|c| c.to_string()).collect();
    assert_eq!(header[5], "memo");
    assert_eq!(header[14], field::SUBMISSION_ID);

    let row = &rows[1];
    assert_eq!(row[1], CellValue::from("김민수"));
    assert_eq!(row[4], CellValue::Number(16));
    assert_eq!(row[5], CellValue::empty());
    assert_eq!(row[14], CellValue::from(rec.submission_id.as_str()));
}

#[test]
fn each_append_adds_a_new_row() {
    let backend = MemorySheets::new().with_spreadsheet("sheet-1", "MG-ADL");
    let target = SheetTarget::new("sheet-1", "responses");

    append_record(&backend, &target, &record()).unwrap();
    let second = append_record(&backend, &target, &record()).unwrap();

    assert_eq!(backend.append_count(), 2);
    assert_eq!(second.updated_range.as_deref(), Some("'responses'!A3:N3"));
}

#[test]
fn google_client_without_credentials_is_a_config_error() {
    let client = GoogleSheets::new(None);
    let err = client.open_by_id("anything").unwrap_err();
    assert!(err.is_config());
}
