use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Chosen score per item id.
///
/// Backed by a sorted map so serialization is canonical: the same answers
/// always serialize to the same bytes regardless of entry order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseSet(BTreeMap<String, u8>);

impl ResponseSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, item_id: impl Into<String>, score: u8) {
        self.0.insert(item_id.into(), score);
    }

    pub fn get(&self, item_id: &str) -> Option<u8> {
        self.0.get(item_id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u8)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Sum of every recorded score. Partial sets are summed as they are.
    pub fn total(&self) -> u32 {
        self.0.values().map(|v| u32::from(*v)).sum()
    }

    /// Key-sorted compact JSON, the form hashed into submission ids.
    pub fn canonical_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string(&self.0)?)
    }
}

impl<K: Into<String>> FromIterator<(K, u8)> for ResponseSet {
    fn from_iter<T: IntoIterator<Item = (K, u8)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
