//! Lightweight presence check: records that the governance toolkit was invoked
//! against this dataset. Policy evaluation itself is configured elsewhere.

use serde::{Deserialize, Serialize};
use crate::dataset::TabularDataset;

pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceReport {
    pub tool_version: String,
    pub rows: usize,
    pub features: Vec<String>,
}

impl PresenceReport {
    pub fn build(dataset: &TabularDataset) -> Self {
        Self {
            tool_version: TOOL_VERSION.to_string(),
            rows: dataset.rows(),
            features: dataset.feature_names(),
        }
    }
}

pub fn is_available() -> bool {
    cfg!(feature = "presence")
}
