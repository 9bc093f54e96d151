use std::fmt;

use serde::{Deserialize, Serialize};

use mgadl_core::models::patient::PatientIdentity;
use mgadl_core::models::record::Record;
use mgadl_core::models::responses::ResponseSet;
use mgadl_sheets::append::AppendInfo;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    AuthInfo,
    Survey,
    Result,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Step::AuthInfo => "1) password and patient details",
            Step::Survey => "2) questionnaire",
            Step::Result => "3) result",
        })
    }
}

/// Everything one user's pass through the wizard accumulates.
///
/// `record` and `submission_id` survive a failed send so a retry writes the
/// same row; only a new survey completion replaces them.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub step: Step,
    pub authenticated: bool,
    pub patient: Option<PatientIdentity>,
    pub responses: ResponseSet,
    pub created_at: Option<String>,
    pub submission_id: Option<String>,
    pub record: Option<Record>,
    pub sent: bool,
    /// The last send failed on missing configuration. Retrying cannot help
    /// until the deployment is fixed.
    pub blocked: bool,
    pub last_error: Option<String>,
    pub last_append: Option<AppendInfo>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the completed submission, if any.
    pub(crate) fn clear_submission(&mut self) {
        self.created_at = None;
        self.submission_id = None;
        self.record = None;
        self.sent = false;
        self.blocked = false;
        self.last_append = None;
    }
}
