use serde::Serialize;

use mgadl_core::models::record::Record;
use mgadl_instruments::Instrument;

/// One line of the result table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakdownRow {
    pub item_id: String,
    pub question: String,
    pub score: u8,
    pub label: String,
}

/// Everything the result step shows about a record.
#[derive(Debug, Clone, Serialize)]
pub struct ResultSummary {
    pub instrument: String,
    pub total: u32,
    pub max_total: u32,
    pub breakdown: Vec<BreakdownRow>,
}

impl ResultSummary {
    pub fn build(instrument: &dyn Instrument, record: &Record) -> Self {
        let breakdown = instrument
            .items()
            .iter()
            .filter_map(|item| {
                let score = record.items.get(&item.id)?;
                Some(BreakdownRow {
                    item_id: item.id.clone(),
                    question: item.question.clone(),
                    score,
                    label: item.label(score).unwrap_or_default().to_string(),
                })
            })
            .collect();

        Self {
            instrument: instrument.name().to_string(),
            total: record.total_score,
            max_total: instrument.max_total(),
            breakdown,
        }
    }

    /// `"5 / 24"`
    pub fn total_display(&self) -> String {
        format!("{} / {}", self.total, self.max_total)
    }
}
