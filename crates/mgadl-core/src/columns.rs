//! Spreadsheet column conventions.
//!
//! The header row is append-only across versions: columns are added at the
//! end and never renamed or reordered, so rows written under an older header
//! stay readable under a newer one.

/// Column names of the response sheet.
pub mod field {
    pub const CREATED_AT: &str = "created_at";
    pub const SUBMISSION_ID: &str = "submission_id";
    pub const NAME: &str = "name";
    pub const DOB: &str = "dob";
    pub const PATIENT_HASH: &str = "patient_hash";
    pub const TOTAL_SCORE: &str = "total_score";
}

/// Item-score column names, one per MG-ADL item, in questionnaire order.
pub mod item {
    pub const TALKING: &str = "mgadl_01_talking";
    pub const CHEWING: &str = "mgadl_02_chewing";
    pub const SWALLOWING: &str = "mgadl_03_swallowing";
    pub const BREATHING: &str = "mgadl_04_breathing";
    pub const BRUSH_TEETH_HAIR: &str = "mgadl_05_brush_teeth_hair";
    pub const ARISE_FROM_CHAIR: &str = "mgadl_06_arise_from_chair";
    pub const DIPLOPIA: &str = "mgadl_07_diplopia";
    pub const PTOSIS: &str = "mgadl_08_ptosis";

    pub const ALL: [&str; 8] = [
        TALKING,
        CHEWING,
        SWALLOWING,
        BREATHING,
        BRUSH_TEETH_HAIR,
        ARISE_FROM_CHAIR,
        DIPLOPIA,
        PTOSIS,
    ];
}

/// The header this build writes, in order.
///
/// `submission_id` sits after `created_at` for fresh sheets. Sheets created by
/// an earlier build get it appended at the end by header reconciliation.
pub fn expected_header() -> Vec<String> {
    [
        field::CREATED_AT,
        field::SUBMISSION_ID,
        field::NAME,
        field::DOB,
        field::PATIENT_HASH,
        field::TOTAL_SCORE,
    ]
    .into_iter()
    .chain(item::ALL)
    .map(str::to_string)
    .collect()
}

/// Format a wall-clock timestamp the way it is stored in `created_at`:
/// ISO-8601 to the second, no offset.
pub fn format_timestamp(dt: jiff::civil::DateTime) -> String {
    dt.strftime("%Y-%m-%dT%H:%M:%S").to_string()
}
