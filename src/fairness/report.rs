use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use crate::dataset::TabularDataset;
use crate::error::Result;
use crate::model::Predictor;
use super::binarize::BinaryLabels;
use super::metrics::{FairnessMetricComputer, MetricMap};
use super::sensitive::SensitiveAttribute;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FairnessReport {
    pub sensitive_feature: String,
    pub overall: MetricMap,
    pub by_group: BTreeMap<String, MetricMap>,
    pub demographic_parity_difference: f64,
    pub equalized_odds_difference: f64,
}

impl FairnessReport {
    pub fn build(dataset: &TabularDataset, predictor: &dyn Predictor) -> Result<Self> {
        let y_true = dataset.labels()?;
        let features = dataset.feature_matrix()?;
        let y_pred = predictor.predict(&features)?;

        let labels = BinaryLabels::project(&y_true, &y_pred)?;
        debug!("Positive class for fairness audit: {}", labels.positive);

        let sensitive = SensitiveAttribute::derive(dataset)?;
        info!(
            "Sensitive attribute {} split at median {}",
            sensitive.column, sensitive.median
        );

        let metrics = FairnessMetricComputer::compute(&labels.y_true, &labels.y_pred, &sensitive.groups)?;

        Ok(Self {
            sensitive_feature: sensitive.name(),
            overall: metrics.frame.overall,
            by_group: metrics.frame.by_group,
            demographic_parity_difference: metrics.demographic_parity_difference,
            equalized_odds_difference: metrics.equalized_odds_difference,
        })
    }
}
