use std::sync::Mutex;

use jiff::civil::{DateTime, date};

use mgadl_core::columns::item;
use mgadl_core::hashing;
use mgadl_core::models::cell::CellValue;
use mgadl_core::models::responses::ResponseSet;
use mgadl_sheets::append::SheetTarget;
use mgadl_sheets::backend::{AppendResponse, Spreadsheet, SpreadsheetMeta, TabRef};
use mgadl_sheets::error::SheetsError;
use mgadl_sheets::memory::MemorySheets;
use mgadl_wizard::clock::Clock;
use mgadl_wizard::controller::{IdentityForm, Wizard, WizardSettings, guard};
use mgadl_wizard::error::WizardError;
use mgadl_wizard::session::{Session, Step};

const SHEET: &str = "sheet-1";
const TAB: &str = "responses";

struct FixedClock(DateTime);

impl Clock for FixedClock {
    fn now(&self) -> DateTime {
        self.0
    }
}

/// Memory backend whose first `failures` appends fail with a quota error.
struct FlakySheets {
    inner: MemorySheets,
    failures: Mutex<usize>,
}

impl FlakySheets {
    fn new(failures: usize) -> Self {
        Self {
            inner: MemorySheets::new().with_spreadsheet(SHEET, "MG-ADL"),
            failures: Mutex::new(failures),
        }
    }
}

impl Spreadsheet for FlakySheets {
    fn open_by_id(&self, id: &str) -> Result<SpreadsheetMeta, SheetsError> {
        self.inner.open_by_id(id)
    }
    fn get_or_create_tab(&self, s: &SpreadsheetMeta, name: &str) -> Result<TabRef, SheetsError> {
        self.inner.get_or_create_tab(s, name)
    }
    fn read_header_row(&self, tab: &TabRef) -> Result<Vec<String>, SheetsError> {
        self.inner.read_header_row(tab)
    }
    fn write_header_row(&self, tab: &TabRef, columns: &[String]) -> Result<(), SheetsError> {
        self.inner.write_header_row(tab, columns)
    }
    fn append_row(
        &self,
        tab: &TabRef,
        values: &[CellValue],
    ) -> Result<AppendResponse, SheetsError> {
        let mut left = self.failures.lock().unwrap();
        if *left > 0 {
            *left -= 1;
            return Err(SheetsError::Remote {
                status: 429,
                message: "Quota exceeded".to_string(),
            });
        }
        self.inner.append_row(tab, values)
    }
}

fn settings(sheet_id: &str) -> WizardSettings {
    WizardSettings {
        app_password: "0712".to_string(),
        salt: "pepper".to_string(),
        target: SheetTarget::new(sheet_id, TAB),
    }
}

fn wizard<B: Spreadsheet>(backend: B) -> Wizard<B> {
    Wizard::new(settings(SHEET), backend).with_clock(FixedClock(date(2026, 10, 16).at(9, 30, 0, 0)))
}

fn memory_wizard() -> Wizard<MemorySheets> {
    wizard(MemorySheets::new().with_spreadsheet(SHEET, "MG-ADL"))
}

fn good_form() -> IdentityForm {
    IdentityForm {
        password: "0712".to_string(),
        name: "  홍길동 ".to_string(),
        dob: Some(date(1975, 3, 9)),
    }
}

fn scenario_responses() -> ResponseSet {
    [
        (item::TALKING, 1u8),
        (item::CHEWING, 0),
        (item::SWALLOWING, 2),
        (item::BREATHING, 0),
        (item::BRUSH_TEETH_HAIR, 1),
        (item::ARISE_FROM_CHAIR, 0),
        (item::DIPLOPIA, 0),
        (item::PTOSIS, 1),
    ]
    .into_iter()
    .collect()
}

fn data_rows(backend: &MemorySheets) -> usize {
    backend.rows(SHEET, TAB).map(|r| r.len() - 1).unwrap_or(0)
}

#[test]
fn wrong_password_stays_on_step_one() {
    let w = memory_wizard();
    let mut s = Session::new();

    let err = w
        .complete_identity(
            &mut s,
            IdentityForm {
                password: "1234".to_string(),
                ..good_form()
            },
        )
        .unwrap_err();

    assert!(matches!(err, WizardError::Authentication(_)));
    assert_eq!(s.step, Step::AuthInfo);
    assert!(!s.authenticated);
    assert!(s.patient.is_none());
    assert!(s.last_error.is_some());
}

#[test]
fn blank_name_or_missing_dob_is_rejected() {
    let w = memory_wizard();
    let mut s = Session::new();

    let blank = IdentityForm {
        name: "   ".to_string(),
        ..good_form()
    };
    assert!(matches!(
        w.complete_identity(&mut s, blank),
        Err(WizardError::Authentication(_))
    ));

    let no_dob = IdentityForm {
        dob: None,
        ..good_form()
    };
    assert!(matches!(
        w.complete_identity(&mut s, no_dob),
        Err(WizardError::Authentication(_))
    ));
    assert!(!s.authenticated);
}

#[test]
fn gate_trims_name_and_moves_to_survey() {
    let w = memory_wizard();
    let mut s = Session::new();

    assert_eq!(w.complete_identity(&mut s, good_form()).unwrap(), Step::Survey);
    assert!(s.authenticated);
    assert_eq!(s.patient.as_ref().unwrap().name, "홍길동");
    assert!(s.last_error.is_none());
}

#[test]
fn unauthenticated_navigation_is_forced_to_step_one() {
    let w = memory_wizard();
    let mut s = Session::new();

    assert_eq!(w.navigate(&mut s, Step::Survey), Step::AuthInfo);
    assert_eq!(w.navigate(&mut s, Step::Result), Step::AuthInfo);
    assert!(matches!(
        guard(&s, Step::Survey),
        Err(WizardError::StepBlocked { shown: Step::AuthInfo, .. })
    ));
}

#[test]
fn result_step_requires_a_sent_submission() {
    let w = memory_wizard();
    let mut s = Session::new();
    w.complete_identity(&mut s, good_form()).unwrap();

    assert_eq!(w.navigate(&mut s, Step::Result), Step::Survey);
    assert!(w.result_view(&s).is_err());
}

#[test]
fn survey_completion_before_gate_is_blocked() {
    let w = memory_wizard();
    let mut s = Session::new();

    let err = w.complete_survey(&mut s, scenario_responses()).unwrap_err();
    assert!(matches!(err, WizardError::StepBlocked { .. }));
    assert_eq!(s.step, Step::AuthInfo);
    assert_eq!(w.backend().append_count(), 0);
}

#[test]
fn completing_the_survey_appends_once_and_shows_result() {
    let w = memory_wizard();
    let mut s = Session::new();
    w.complete_identity(&mut s, good_form()).unwrap();

    assert_eq!(w.complete_survey(&mut s, scenario_responses()).unwrap(), Step::Result);
    assert!(s.sent);
    assert_eq!(s.created_at.as_deref(), Some("2026-10-16T09:30:00"));

    let patient_hash = hashing::patient_hash("홍길동", "1975-03-09", "pepper");
    let expected_id =
        hashing::submission_id(&patient_hash, "2026-10-16T09:30:00", &scenario_responses())
            .unwrap();
    assert_eq!(s.submission_id.as_deref(), Some(expected_id.as_str()));
    assert_eq!(data_rows(w.backend()), 1);

    let view = w.result_view(&s).unwrap();
    assert_eq!(view.summary.total_display(), "5 / 24");
    assert_eq!(view.summary.breakdown.len(), 8);
    assert_eq!(view.written.worksheet_title, TAB);
    assert_eq!(view.written.updated_range.as_deref(), Some("'responses'!A2:N2"));
}

#[test]
fn incomplete_answers_do_not_send() {
    let w = memory_wizard();
    let mut s = Session::new();
    w.complete_identity(&mut s, good_form()).unwrap();

    let mut partial = ResponseSet::new();
    partial.set(item::TALKING, 1);

    let err = w.complete_survey(&mut s, partial).unwrap_err();
    assert!(matches!(err, WizardError::Validation(_)));
    assert_eq!(s.step, Step::Survey);
    assert!(!s.sent);
    assert!(s.record.is_none());
    assert_eq!(w.backend().append_count(), 0);
}

#[test]
fn retry_after_success_is_a_no_op() {
    let w = memory_wizard();
    let mut s = Session::new();
    w.complete_identity(&mut s, good_form()).unwrap();
    w.complete_survey(&mut s, scenario_responses()).unwrap();

    assert_eq!(w.retry_send(&mut s).unwrap(), Step::Result);
    assert_eq!(w.retry_send(&mut s).unwrap(), Step::Result);
    assert_eq!(w.backend().append_count(), 1);
    assert_eq!(data_rows(w.backend()), 1);
}

#[test]
fn failed_send_stays_on_survey_and_retry_reuses_submission() {
    let w = wizard(FlakySheets::new(2));
    let mut s = Session::new();
    w.complete_identity(&mut s, good_form()).unwrap();

    let err = w.complete_survey(&mut s, scenario_responses()).unwrap_err();
    assert!(matches!(err, WizardError::RemoteWrite(_)));
    assert_eq!(s.step, Step::Survey);
    assert!(!s.sent);
    assert!(!s.blocked);
    assert!(s.last_error.as_deref().unwrap().contains("Quota exceeded"));
    let minted = s.submission_id.clone().unwrap();

    assert!(w.retry_send(&mut s).is_err());
    assert_eq!(s.submission_id.as_deref(), Some(minted.as_str()));

    assert_eq!(w.retry_send(&mut s).unwrap(), Step::Result);
    assert!(s.sent);
    assert!(s.last_error.is_none());
    assert_eq!(s.submission_id.as_deref(), Some(minted.as_str()));

    w.retry_send(&mut s).unwrap();
    let rows = w.backend().inner.rows(SHEET, TAB).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][1], CellValue::from(minted.as_str()));
}

#[test]
fn missing_sheet_id_is_a_configuration_error() {
    let backend = MemorySheets::new().with_spreadsheet(SHEET, "MG-ADL");
    let w = Wizard::new(settings(""), backend);
    let mut s = Session::new();
    w.complete_identity(&mut s, good_form()).unwrap();

    let err = w.complete_survey(&mut s, scenario_responses()).unwrap_err();
    assert!(matches!(err, WizardError::Configuration(_)));
    assert!(err.is_configuration());
    assert_eq!(s.step, Step::Survey);
    assert!(!s.sent);
    assert!(s.blocked);
    assert!(s.record.is_some());
    assert_eq!(w.backend().append_count(), 0);
}

#[test]
fn configuration_error_refuses_retry_without_calling_backend() {
    let w = Wizard::new(settings(""), FlakySheets::new(0));
    let mut s = Session::new();
    w.complete_identity(&mut s, good_form()).unwrap();
    w.complete_survey(&mut s, scenario_responses()).unwrap_err();

    let err = w.retry_send(&mut s).unwrap_err();
    assert!(matches!(err, WizardError::Configuration(ref m) if m.contains("SHEET_ID")));
    assert!(s.blocked);
    assert_eq!(s.step, Step::Survey);
    assert_eq!(w.backend().inner.append_count(), 0);
}

#[test]
fn new_completion_clears_blocked_flag() {
    let mut s = Session::new();
    let blocked = Wizard::new(settings(""), MemorySheets::new());
    blocked.complete_identity(&mut s, good_form()).unwrap();
    blocked.complete_survey(&mut s, scenario_responses()).unwrap_err();
    assert!(s.blocked);

    let fixed = memory_wizard();
    assert_eq!(fixed.complete_survey(&mut s, scenario_responses()).unwrap(), Step::Result);
    assert!(!s.blocked);
    assert!(s.sent);
}

#[test]
fn back_to_survey_keeps_sent_submission() {
    let w = memory_wizard();
    let mut s = Session::new();
    w.complete_identity(&mut s, good_form()).unwrap();
    w.complete_survey(&mut s, scenario_responses()).unwrap();
    let id = s.submission_id.clone();

    assert_eq!(w.back_to_survey(&mut s), Step::Survey);
    assert!(s.sent);
    assert_eq!(s.submission_id, id);
    assert_eq!(w.navigate(&mut s, Step::Result), Step::Result);
}

#[test]
fn new_completion_replaces_previous_submission() {
    let w = memory_wizard();
    let mut s = Session::new();
    w.complete_identity(&mut s, good_form()).unwrap();
    w.complete_survey(&mut s, scenario_responses()).unwrap();
    let first = s.submission_id.clone().unwrap();

    w.back_to_survey(&mut s);
    let mut edited = scenario_responses();
    edited.set(item::PTOSIS, 3);
    w.complete_survey(&mut s, edited).unwrap();

    assert_ne!(s.submission_id.as_deref(), Some(first.as_str()));
    assert_eq!(w.backend().append_count(), 2);
    assert_eq!(s.record.as_ref().unwrap().total_score, 7);
}

#[test]
fn changing_patient_discards_pending_submission() {
    let w = memory_wizard();
    let mut s = Session::new();
    w.complete_identity(&mut s, good_form()).unwrap();
    w.complete_survey(&mut s, scenario_responses()).unwrap();

    let other = IdentityForm {
        name: "이순신".to_string(),
        ..good_form()
    };
    w.complete_identity(&mut s, other).unwrap();

    assert!(!s.sent);
    assert!(s.record.is_none());
    assert!(s.submission_id.is_none());
    assert_eq!(w.navigate(&mut s, Step::Result), Step::Survey);
}

#[test]
fn full_reset_from_result_clears_everything() {
    let w = memory_wizard();
    let mut s = Session::new();
    w.complete_identity(&mut s, good_form()).unwrap();
    w.complete_survey(&mut s, scenario_responses()).unwrap();
    assert_eq!(s.step, Step::Result);

    assert_eq!(w.reset(&mut s), Step::AuthInfo);
    assert!(!s.authenticated);
    assert!(s.patient.is_none());
    assert_eq!(s.responses, ResponseSet::new());
    assert!(s.submission_id.is_none());
    assert!(s.record.is_none());
    assert!(!s.sent);
}

#[test]
fn logout_keeps_answers_but_locks_steps() {
    let w = memory_wizard();
    let mut s = Session::new();
    w.complete_identity(&mut s, good_form()).unwrap();
    w.complete_survey(&mut s, scenario_responses()).unwrap();

    assert_eq!(w.logout(&mut s), Step::AuthInfo);
    assert!(!s.authenticated);
    assert!(s.patient.is_some());
    assert_eq!(s.responses, scenario_responses());
    assert_eq!(w.navigate(&mut s, Step::Result), Step::AuthInfo);

    let err = w.retry_send(&mut s).unwrap_err();
    assert!(matches!(err, WizardError::StepBlocked { .. }));
    assert_eq!(w.backend().append_count(), 1);
}

#[test]
fn result_view_renders_summary_and_csv() {
    let w = memory_wizard();
    let mut s = Session::new();
    w.complete_identity(&mut s, good_form()).unwrap();
    w.complete_survey(&mut s, scenario_responses()).unwrap();

    let view = w.result_view(&s).unwrap();
    let text = view.render().unwrap();
    assert!(text.contains("MG-ADL 총점: 5 / 24"));
    assert!(text.contains("저장 위치: MG-ADL / responses"));

    let (name, csv) = view.csv_download(date(2026, 10, 16).at(9, 31, 0, 0));
    assert_eq!(name, format!("mgadl_{}_20261016_093100.csv", view.record.patient_hash));
    assert!(csv.contains("홍길동"));
}
