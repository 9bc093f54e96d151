use serde::{Deserialize, Serialize};

use crate::columns::{field, item};
use crate::error::CoreError;
use crate::hashing;
use crate::models::cell::CellValue;
use crate::models::patient::PatientIdentity;
use crate::models::responses::ResponseSet;

/// The eight item scores of one completed questionnaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemScores {
    pub talking: u8,
    pub chewing: u8,
    pub swallowing: u8,
    pub breathing: u8,
    pub brush_teeth_hair: u8,
    pub arise_from_chair: u8,
    pub diplopia: u8,
    pub ptosis: u8,
}

impl ItemScores {
    /// Pull every item out of a response set. Fails on the first missing item.
    pub fn from_responses(responses: &ResponseSet) -> Result<Self, CoreError> {
        let pick = |id: &str| {
            responses
                .get(id)
                .ok_or_else(|| CoreError::MissingField(id.to_string()))
        };

        Ok(Self {
            talking: pick(item::TALKING)?,
            chewing: pick(item::CHEWING)?,
            swallowing: pick(item::SWALLOWING)?,
            breathing: pick(item::BREATHING)?,
            brush_teeth_hair: pick(item::BRUSH_TEETH_HAIR)?,
            arise_from_chair: pick(item::ARISE_FROM_CHAIR)?,
            diplopia: pick(item::DIPLOPIA)?,
            ptosis: pick(item::PTOSIS)?,
        })
    }

    /// Score for an item column, or `None` if the column is not an item.
    pub fn get(&self, column: &str) -> Option<u8> {
        match column {
            item::TALKING => Some(self.talking),
            item::CHEWING => Some(self.chewing),
            item::SWALLOWING => Some(self.swallowing),
            item::BREATHING => Some(self.breathing),
            item::BRUSH_TEETH_HAIR => Some(self.brush_teeth_hair),
            item::ARISE_FROM_CHAIR => Some(self.arise_from_chair),
            item::DIPLOPIA => Some(self.diplopia),
            item::PTOSIS => Some(self.ptosis),
            _ => None,
        }
    }

    pub fn total(&self) -> u32 {
        item::ALL
            .iter()
            .filter_map(|id| self.get(id))
            .map(u32::from)
            .sum()
    }
}

/// One sheet row. Built once per completed questionnaire and never mutated;
/// a retry resends the same value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub created_at: String,
    pub submission_id: String,
    pub name: String,
    pub dob: String,
    pub patient_hash: String,
    pub total_score: u32,
    pub items: ItemScores,
}

impl Record {
    /// Build the row for a completed questionnaire captured at `created_at`.
    pub fn build(
        patient: &PatientIdentity,
        responses: &ResponseSet,
        created_at: &str,
        salt: &str,
    ) -> Result<Self, CoreError> {
        let items = ItemScores::from_responses(responses)?;
        let patient_hash = patient.hash(salt);
        let submission_id = hashing::submission_id(&patient_hash, created_at, responses)?;

        Ok(Self {
            created_at: created_at.to_string(),
            submission_id,
            name: patient.name.clone(),
            dob: patient.dob_iso(),
            patient_hash,
            total_score: items.total(),
            items,
        })
    }

    /// The value this record holds for a header column, if any.
    pub fn value(&self, column: &str) -> Option<CellValue> {
        match column {
            field::CREATED_AT => Some(self.created_at.as_str().into()),
            field::SUBMISSION_ID => Some(self.submission_id.as_str().into()),
            field::NAME => Some(self.name.as_str().into()),
            field::DOB => Some(self.dob.as_str().into()),
            field::PATIENT_HASH => Some(self.patient_hash.as_str().into()),
            field::TOTAL_SCORE => Some(self.total_score.into()),
            other => self.items.get(other).map(CellValue::from),
        }
    }

    /// Lay the record out under `header`. Columns the record doesn't know
    /// are left empty.
    pub fn row_for_header(&self, header: &[String]) -> Vec<CellValue> {
        header
            .iter()
            .map(|column| self.value(column).unwrap_or_else(CellValue::empty))
            .collect()
    }
}
