use std::fmt;

use serde::{Deserialize, Serialize};

/// A single spreadsheet cell as written by this application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(i64),
    Text(String),
}

impl CellValue {
    /// The value written under a header column the record has no field for.
    pub fn empty() -> Self {
        CellValue::Text(String::new())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.is_empty())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<u32> for CellValue {
    fn from(n: u32) -> Self {
        CellValue::Number(i64::from(n))
    }
}

impl From<u8> for CellValue {
    fn from(n: u8) -> Self {
        CellValue::Number(i64::from(n))
    }
}
