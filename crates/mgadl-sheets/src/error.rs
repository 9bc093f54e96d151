use thiserror::Error;

#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("spreadsheet not found or not shared: {spreadsheet_id}")]
    NotFound { spreadsheet_id: String },

    #[error("Sheets API error ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("service account token error: {0}")]
    Token(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SheetsError {
    /// True when retrying without changing configuration cannot help.
    pub fn is_config(&self) -> bool {
        matches!(self, SheetsError::Config(_))
    }
}
