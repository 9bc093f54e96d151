use serde::{Deserialize, Serialize};

use crate::hashing;

/// Who the questionnaire is about. Entered once on the first step and not
/// edited while a submission is in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientIdentity {
    pub name: String,
    pub dob: jiff::civil::Date,
}

impl PatientIdentity {
    /// Date of birth as stored in the sheet (`YYYY-MM-DD`).
    pub fn dob_iso(&self) -> String {
        self.dob.to_string()
    }

    pub fn hash(&self, salt: &str) -> String {
        hashing::patient_hash(&self.name, &self.dob_iso(), salt)
    }
}
