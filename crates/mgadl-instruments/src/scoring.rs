use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Inclusive integer range of valid scores for an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub min: u8,
    pub max: u8,
}

impl ScoreRange {
    pub fn contains(&self, value: u8) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// One answer option: the score it is worth and what it says.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub score: u8,
    pub label: String,
}

impl Choice {
    /// Option text as shown on the form, e.g. `"1점 - 드물게 사래 들리는 경우가 있음"`.
    pub fn display(&self) -> String {
        format!("{}점 - {}", self.score, self.label)
    }
}

/// A questionnaire item with its choices ordered by ascending score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub question: String,
    pub choices: Vec<Choice>,
}

impl Item {
    pub fn range(&self) -> ScoreRange {
        let scores = self.choices.iter().map(|c| c.score);
        ScoreRange {
            min: scores.clone().min().unwrap_or(0),
            max: scores.max().unwrap_or(0),
        }
    }

    pub fn label(&self, score: u8) -> Option<&str> {
        self.choices
            .iter()
            .find(|c| c.score == score)
            .map(|c| c.label.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub item_id: String,
    pub value: u8,
    pub expected_range: ScoreRange,
    pub message: String,
}
