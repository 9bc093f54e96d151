use jiff::civil::date;

use mgadl_core::columns::{self, field, item};
use mgadl_core::error::CoreError;
use mgadl_core::hashing;
use mgadl_core::models::cell::CellValue;
use mgadl_core::models::patient::PatientIdentity;
use mgadl_core::models::record::Record;
use mgadl_core::models::responses::ResponseSet;

fn patient() -> PatientIdentity {
    PatientIdentity {
        name: "홍길동".to_string(),
        dob: date(1975, 3, 9),
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

#[test]
fn record_total_matches_item_sum() {
    let record = Record::build(&patient(), &scenario_responses(), "2026-10-16T09:30:00", "salt")
        .unwrap();
    assert_eq!(record.total_score, 5);
    assert_eq!(record.items.total(), 5);
    assert_eq!(scenario_responses().total(), 5);
}

#[test]
fn record_carries_deterministic_keys() {
    let responses = scenario_responses();
    let record = Record::build(&patient(), &responses, "2026-10-16T09:30:00", "salt").unwrap();

    let expected_hash = hashing::patient_hash("홍길동", "1975-03-09", "salt");
    assert_eq!(record.patient_hash, expected_hash);
    assert_eq!(
        record.submission_id,
        hashing::submission_id(&expected_hash, "2026-10-16T09:30:00", &responses).unwrap()
    );
    assert_eq!(record.dob, "1975-03-09");
}

#[test]
fn record_requires_every_item() {
    let partial: ResponseSet = scenario_responses()
        .iter()
        .filter(|(id, _)| *id != item::DIPLOPIA)
        .collect();

    let err = Record::build(&patient(), &partial, "2026-10-16T09:30:00", "salt").unwrap_err();
    assert!(matches!(err, CoreError::MissingField(ref f) if f == item::DIPLOPIA));
}

#[test]
fn row_follows_header_order_and_blanks_unknown_columns() {
    let record = Record::build(&patient(), &scenario_responses(), "2026-10-16T09:30:00", "salt")
        .unwrap();
    let header = vec![
        field::TOTAL_SCORE.to_string(),
        "clinician_note".to_string(),
        field::CREATED_AT.to_string(),
        item::SWALLOWING.to_string(),
    ];

    let row = record.row_for_header(&header);
    assert_eq!(
        row,
        vec![
            CellValue::Number(5),
            CellValue::empty(),
            CellValue::Text("2026-10-16T09:30:00".to_string()),
            CellValue::Number(2),
        ]
    );
}

#[test]
fn expected_header_covers_every_record_field() {
    let record = Record::build(&patient(), &scenario_responses(), "2026-10-16T09:30:00", "salt")
        .unwrap();
    let header = columns::expected_header();
    assert_eq!(header.len(), 14);
    assert!(record.row_for_header(&header).iter().all(|c| !c.is_empty()));
}

#[test]
fn timestamp_format_drops_subseconds() {
    let dt = date(2026, 10, 16).at(9, 30, 5, 123_000_000);
    assert_eq!(columns::format_timestamp(dt), "2026-10-16T09:30:05");
}
