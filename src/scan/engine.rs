use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::dataset::{FeatureMatrix, Label, TabularDataset};
use crate::error::{AuditError, Result};
use crate::fairness::median;
use crate::model::Predictor;

/// An external quality/robustness scanner. Implementations may fail or panic
/// while scanning; callers go through [`super::ScanAdapter`] to contain that.
pub trait ScanEngine: Send + Sync {
    fn name(&self) -> &str;

    fn version(&self) -> &str;

    /// Whether the engine can run at all in this build.
    fn is_available(&self) -> bool;

    /// The engine's native report serialization.
    fn scan(&self, dataset: &TabularDataset, predictor: &dyn Predictor) -> Result<Value>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Major,
    Minor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanIssue {
    pub detector: String,
    pub severity: IssueSeverity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric: Option<f64>,
}

impl ScanIssue {
    fn new(detector: &str, severity: IssueSeverity, message: impl Into<String>) -> Self {
        Self {
            detector: detector.to_string(),
            severity,
            feature: None,
            message: message.into(),
            metric: None,
        }
    }

    fn on_feature(mut self, feature: &str) -> Self {
        self.feature = Some(feature.to_string());
        self
    }

    fn with_metric(mut self, metric: f64) -> Self {
        self.metric = Some(metric);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub issues: usize,
    pub major: usize,
    pub minor: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub engine: String,
    pub version: String,
    pub rows: usize,
    pub features: Vec<String>,
    pub issues: Vec<ScanIssue>,
    pub summary: ScanSummary,
}

const PERTURBATION_RATIO: f64 = 0.01;
const FLIP_RATE_MINOR: f64 = 0.05;
const FLIP_RATE_MAJOR: f64 = 0.20;
const MISSING_RATE_MAJOR: f64 = 0.10;
const SLICE_GAP_MINOR: f64 = 0.10;
const SLICE_GAP_MAJOR: f64 = 0.20;

/// Built-in deterministic scanner: performance against a majority baseline,
/// missing values, constant features, perturbation robustness, and
/// underperforming median slices.
#[derive(Debug, Clone, Default)]
pub struct QualityScanner;

impl QualityScanner {
    pub fn new() -> Self {
        Self
    }

    fn predict(&self, predictor: &dyn Predictor, features: &FeatureMatrix) -> Result<Vec<Label>> {
        let predictions = predictor.predict(features).map_err(|e| AuditError::ScanExecution(e.to_string()))?;
        if predictions.len() != features.len() {
            return Err(AuditError::ScanExecution(format!(
                "predictor returned {} labels for {} rows",
                predictions.len(),
                features.len()
            )));
        }
        Ok(predictions)
    }

    fn check_performance(&self, y_true: &[Label], y_pred: &[Label]) -> Option<ScanIssue> {
        let accuracy = accuracy(y_true, y_pred);

        let mut counts: HashMap<&Label, usize> = HashMap::new();
        for label in y_true {
            *counts.entry(label).or_default() += 1;
        }
        let majority = counts.values().copied().max().unwrap_or(0);
        let baseline = majority as f64 / y_true.len() as f64;

        if accuracy < baseline {
            Some(
                ScanIssue::new(
                    "performance",
                    IssueSeverity::Major,
                    format!("accuracy {:.4} is below the majority-class baseline {:.4}", accuracy, baseline),
                )
                .with_metric(accuracy),
            )
        } else {
            None
        }
    }

    fn check_column(&self, name: &str, values: &[f64]) -> Vec<ScanIssue> {
        let mut issues = Vec::new();

        let missing = values.iter().filter(|v| v.is_nan()).count();
        if missing > 0 {
            let rate = missing as f64 / values.len() as f64;
            let severity = if rate > MISSING_RATE_MAJOR { IssueSeverity::Major } else { IssueSeverity::Minor };
            issues.push(
                ScanIssue::new("missing_values", severity, format!("{} of {} values are missing", missing, values.len()))
                    .on_feature(name)
                    .with_metric(rate),
            );
        }

        let mut present = values.iter().filter(|v| !v.is_nan());
        if let Some(first) = present.next() {
            if present.all(|v| v == first) {
                issues.push(
                    ScanIssue::new("constant_feature", IssueSeverity::Minor, format!("every value equals {}", first))
                        .on_feature(name),
                );
            }
        }

        issues
    }

    fn check_robustness(
        &self,
        predictor: &dyn Predictor,
        features: &FeatureMatrix,
        baseline: &[Label],
    ) -> Result<Vec<ScanIssue>> {
        let mut issues = Vec::new();

        for (index, name) in features.names.iter().enumerate() {
            let sd = std_dev(&features.column(index));
            if !sd.is_finite() || sd == 0.0 {
                continue;
            }

            let perturbed = self.predict(predictor, &features.shifted(index, sd * PERTURBATION_RATIO))?;
            let flips = perturbed.iter().zip(baseline).filter(|(a, b)| a != b).count();
            let rate = flips as f64 / baseline.len() as f64;

            if rate > FLIP_RATE_MINOR {
                let severity = if rate > FLIP_RATE_MAJOR { IssueSeverity::Major } else { IssueSeverity::Minor };
                issues.push(
                    ScanIssue::new(
                        "robustness",
                        severity,
                        format!("{:.1}% of predictions change under a 1% std shift", rate * 100.0),
                    )
                    .on_feature(name)
                    .with_metric(rate),
                );
            }
        }

        Ok(issues)
    }

    fn check_slices(&self, features: &FeatureMatrix, y_true: &[Label], y_pred: &[Label]) -> Vec<ScanIssue> {
        let overall = accuracy(y_true, y_pred);
        let mut issues = Vec::new();

        for (index, name) in features.names.iter().enumerate() {
            let column = features.column(index);
            let Some(med) = median(&column) else { continue };

            for (slice, above) in [("<= median", false), ("> median", true)] {
                let rows: Vec<usize> = column
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| (**v > med) == above)
                    .map(|(i, _)| i)
                    .collect();
                if rows.is_empty() {
                    continue;
                }

                let correct = rows.iter().filter(|i| y_true[**i] == y_pred[**i]).count();
                let slice_accuracy = correct as f64 / rows.len() as f64;
                let gap = overall - slice_accuracy;

                if gap > SLICE_GAP_MINOR {
                    let severity = if gap > SLICE_GAP_MAJOR { IssueSeverity::Major } else { IssueSeverity::Minor };
                    issues.push(
                        ScanIssue::new(
                            "underperforming_slice",
                            severity,
                            format!(
                                "accuracy {:.4} on {} {} ({} rows) vs {:.4} overall",
                                slice_accuracy, name, slice, rows.len(), overall
                            ),
                        )
                        .on_feature(name)
                        .with_metric(slice_accuracy),
                    );
                }
            }
        }

        issues
    }

    pub fn run(&self, dataset: &TabularDataset, predictor: &dyn Predictor) -> Result<ScanResult> {
        if dataset.rows() == 0 {
            return Err(AuditError::ScanExecution("cannot scan an empty dataset".to_string()));
        }

        let features = dataset.feature_matrix().map_err(|e| AuditError::ScanExecution(e.to_string()))?;
        let y_true = dataset.labels().map_err(|e| AuditError::ScanExecution(e.to_string()))?;
        let y_pred = self.predict(predictor, &features)?;

        let mut issues = Vec::new();
        issues.extend(self.check_performance(&y_true, &y_pred));
        for (index, name) in features.names.iter().enumerate() {
            issues.extend(self.check_column(name, &features.column(index)));
        }
        issues.extend(self.check_robustness(predictor, &features, &y_pred)?);
        issues.extend(self.check_slices(&features, &y_true, &y_pred));

        let major = issues.iter().filter(|i| i.severity == IssueSeverity::Major).count();
        let summary = ScanSummary {
            issues: issues.len(),
            major,
            minor: issues.len() - major,
        };

        Ok(ScanResult {
            engine: self.name().to_string(),
            version: self.version().to_string(),
            rows: dataset.rows(),
            features: features.names.clone(),
            issues,
            summary,
        })
    }
}

impl ScanEngine for QualityScanner {
    fn name(&self) -> &str {
        "quality-scan"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn is_available(&self) -> bool {
        cfg!(feature = "scan")
    }

    fn scan(&self, dataset: &TabularDataset, predictor: &dyn Predictor) -> Result<Value> {
        Ok(serde_json::to_value(self.run(dataset, predictor)?)?)
    }
}

fn accuracy(y_true: &[Label], y_pred: &[Label]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    correct as f64 / y_true.len() as f64
}

fn std_dev(values: &[f64]) -> f64 {
    let present: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if present.is_empty() {
        return f64::NAN;
    }
    let mean = present.iter().sum::<f64>() / present.len() as f64;
    let var = present.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / present.len() as f64;
    var.sqrt()
}
