use thiserror::Error;

use mgadl_sheets::error::SheetsError;

use crate::session::Step;

#[derive(Debug, Error)]
pub enum WizardError {
    /// Wrong password or missing patient details. The user can fix and resubmit.
    #[error("{0}")]
    Authentication(String),

    /// A secret needed for the remote write is missing. Nothing the user
    /// does in the session can fix it.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The spreadsheet write failed. The record is kept for retry.
    #[error("remote write failed: {0}")]
    RemoteWrite(String),

    #[error("invalid responses: {0}")]
    Validation(String),

    #[error("{requested} is not available yet")]
    StepBlocked { requested: Step, shown: Step },

    #[error("export failed: {0}")]
    Export(#[from] mgadl_export::error::ExportError),
}

impl WizardError {
    /// True when nothing short of new configuration can clear the error.
    pub fn is_configuration(&self) -> bool {
        matches!(self, WizardError::Configuration(_))
    }
}

impl From<SheetsError> for WizardError {
    fn from(e: SheetsError) -> Self {
        match e {
            SheetsError::Config(msg) => WizardError::Configuration(msg),
            other => WizardError::RemoteWrite(other.to_string()),
        }
    }
}
