use std::fs;
use std::path::Path;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::dataset::{FeatureMatrix, Label};
use crate::error::{AuditError, Result};
use super::predictor::Predictor;

/// Serialized classifier, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    /// One score row per class; the highest `w·x + b` wins, first on ties.
    Linear {
        classes: Vec<Label>,
        coefficients: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
    },
    Threshold {
        feature_index: usize,
        threshold: f64,
        above: Label,
        below: Label,
    },
    Constant {
        label: Label,
    },
}

impl ModelArtifact {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AuditError::not_found("Model artifact", path));
        }

        let content = fs::read_to_string(path)?;
        let artifact: ModelArtifact = serde_json::from_str(&content)?;
        artifact.validate()?;
        debug!("Loaded {} model from {}", artifact.kind(), path.display());
        Ok(artifact)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ModelArtifact::Linear { .. } => "linear",
            ModelArtifact::Threshold { .. } => "threshold",
            ModelArtifact::Constant { .. } => "constant",
        }
    }

    fn validate(&self) -> Result<()> {
        if let ModelArtifact::Linear { classes, coefficients, intercepts } = self {
            if classes.is_empty() {
                return Err(AuditError::InvalidInput("Linear model has no classes".to_string()));
            }
            if coefficients.len() != classes.len() || intercepts.len() != classes.len() {
                return Err(AuditError::InvalidInput(format!(
                    "Linear model has {} classes but {} coefficient rows and {} intercepts",
                    classes.len(),
                    coefficients.len(),
                    intercepts.len()
                )));
            }
            if let Some(first) = coefficients.first() {
                if coefficients.iter().any(|row| row.len() != first.len()) {
                    return Err(AuditError::InvalidInput(
                        "Linear model coefficient rows differ in width".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

impl Predictor for ModelArtifact {
    fn predict(&self, rows: &FeatureMatrix) -> Result<Vec<Label>> {
        match self {
            ModelArtifact::Linear { classes, coefficients, intercepts } => {
                self.validate()?;
                let expected = coefficients.first().map(|w| w.len()).unwrap_or(0);
                if rows.width() != expected {
                    return Err(AuditError::InvalidInput(format!(
                        "Model expects {} features, got {}", expected, rows.width()
                    )));
                }
                let read: Vec<usize> = (0..rows.width()).collect();
                ensure_complete(rows, &read)?;

                Ok(rows
                    .rows
                    .iter()
                    .map(|x| {
                        let mut best = 0;
                        let mut best_score = f64::NEG_INFINITY;
                        for (class, (w, b)) in coefficients.iter().zip(intercepts).enumerate() {
                            let score: f64 = w.iter().zip(x).map(|(w, v)| w * v).sum::<f64>() + b;
                            if score > best_score {
                                best = class;
                                best_score = score;
                            }
                        }
                        classes[best].clone()
                    })
                    .collect())
            }
            ModelArtifact::Threshold { feature_index, threshold, above, below } => {
                if *feature_index >= rows.width() {
                    return Err(AuditError::InvalidInput(format!(
                        "Model reads feature {} but only {} features are present",
                        feature_index,
                        rows.width()
                    )));
                }
                ensure_complete(rows, &[*feature_index])?;

                Ok(rows
                    .rows
                    .iter()
                    .map(|x| if x[*feature_index] > *threshold { above.clone() } else { below.clone() })
                    .collect())
            }
            ModelArtifact::Constant { label } => Ok(vec![label.clone(); rows.len()]),
        }
    }
}

/// Fails on the first row with a missing cell in any of `columns`.
fn ensure_complete(rows: &FeatureMatrix, columns: &[usize]) -> Result<()> {
    for (i, row) in rows.rows.iter().enumerate() {
        if let Some(&j) = columns.iter().find(|&&j| row[j].is_nan()) {
            return Err(AuditError::InvalidInput(format!(
                "row {} has a missing value in feature '{}'",
                i, rows.names[j]
            )));
        }
    }
    Ok(())
}
