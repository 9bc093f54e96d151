use thiserror::Error;

use crate::scoring::ValidationError;

#[derive(Debug, Error)]
pub enum InstrumentError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("unknown item '{item_id}' for instrument '{instrument_id}'")]
    UnknownItem {
        instrument_id: String,
        item_id: String,
    },

    #[error("missing response for item '{0}'")]
    MissingItem(String),
}
