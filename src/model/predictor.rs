use std::fmt::Debug;
use crate::dataset::{FeatureMatrix, Label};
use crate::error::Result;

/// A trained classifier. Loaded once per run and shared read-only across audits.
pub trait Predictor: Debug + Send + Sync {
    /// One label per row, in row order.
    fn predict(&self, rows: &FeatureMatrix) -> Result<Vec<Label>>;
}
