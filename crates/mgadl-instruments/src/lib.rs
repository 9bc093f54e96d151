//! mgadl-instruments
//!
//! Questionnaire definitions. Pure data, no network dependency.
//! Defines the items, their answer options, and the scoring rules.

pub mod error;
pub mod instruments;
pub mod scoring;

use mgadl_core::models::responses::ResponseSet;

use error::InstrumentError;
use scoring::{Item, ValidationError};

/// Trait implemented by each questionnaire.
pub trait Instrument: Send + Sync {
    /// Unique identifier (e.g., "mg_adl").
    fn id(&self) -> &str;

    /// Human-readable name (e.g., "MG-ADL").
    fn name(&self) -> &str;

    /// Items in the order they are asked.
    fn items(&self) -> &[Item];

    /// Highest total a fully answered questionnaire can reach.
    fn max_total(&self) -> u32 {
        self.items()
            .iter()
            .map(|item| u32::from(item.range().max))
            .sum()
    }

    fn item(&self, id: &str) -> Option<&Item> {
        self.items().iter().find(|item| item.id == id)
    }

    /// Check every recorded score against its item's range.
    fn validate_scores(&self, responses: &ResponseSet) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for (item_id, value) in responses.iter() {
            if let Some(item) = self.item(item_id)
                && !item.range().contains(value)
            {
                let range = item.range();
                errors.push(ValidationError {
                    item_id: item_id.to_string(),
                    value,
                    expected_range: range,
                    message: format!(
                        "{}: {} score {} is outside range [{}, {}]",
                        self.name(),
                        item.question,
                        value,
                        range.min,
                        range.max,
                    ),
                });
            }
        }
        errors
    }

    /// Require exactly one in-range answer for every item and nothing else.
    fn validate_complete(&self, responses: &ResponseSet) -> Result<(), InstrumentError> {
        for (item_id, _) in responses.iter() {
            if self.item(item_id).is_none() {
                return Err(InstrumentError::UnknownItem {
                    instrument_id: self.id().to_string(),
                    item_id: item_id.to_string(),
                });
            }
        }
        if let Some(missing) = self.items().iter().find(|i| responses.get(&i.id).is_none()) {
            return Err(InstrumentError::MissingItem(missing.id.clone()));
        }
        if let Some(first) = self.validate_scores(responses).into_iter().next() {
            return Err(first.into());
        }
        Ok(())
    }

    /// Sum of the recorded scores.
    fn total(&self, responses: &ResponseSet) -> u32 {
        responses.total()
    }
}
