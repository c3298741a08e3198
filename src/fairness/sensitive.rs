use crate::dataset::TabularDataset;
use crate::error::{AuditError, Result};

/// Synthetic binary grouping derived from one numeric feature column.
///
/// The column is always the first feature in declared column order, so the
/// grouping depends on column order rather than on what the column means.
/// Callers that reorder columns upstream change the audited attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct SensitiveAttribute {
    pub column: String,
    pub median: f64,
    pub groups: Vec<String>,
}

impl SensitiveAttribute {
    pub fn derive(dataset: &TabularDataset) -> Result<Self> {
        let column = dataset
            .feature_columns()
            .next()
            .ok_or_else(|| AuditError::InvalidInput("Dataset is missing feature columns.".to_string()))?;

        let values = column.data.as_numeric().ok_or_else(|| {
            AuditError::InvalidInput(format!(
                "Sensitive feature '{}' must be numeric, found {}",
                column.name,
                column.data.kind()
            ))
        })?;

        Self::split_at_median(&column.name, values)
    }

    /// Rows strictly above the median are `high_<column>`; everything else,
    /// including rows equal to the median and missing cells, is `low_<column>`.
    pub fn split_at_median(column: &str, values: &[f64]) -> Result<Self> {
        let median = median(values).ok_or_else(|| {
            AuditError::InvalidInput(format!("Sensitive feature '{}' has no values", column))
        })?;

        let high = high_label(column);
        let low = low_label(column);
        let groups = values
            .iter()
            .map(|v| if *v > median { high.clone() } else { low.clone() })
            .collect();

        Ok(Self {
            column: column.to_string(),
            median,
            groups,
        })
    }

    pub fn name(&self) -> String {
        format!("{}_high_vs_low", self.column)
    }
}

pub fn high_label(column: &str) -> String {
    format!("high_{}", column)
}

pub fn low_label(column: &str) -> String {
    format!("low_{}", column)
}

/// Median over the non-missing values; even counts average the middle pair.
pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Column;

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), Some(2.5));
        assert_eq!(median(&[f64::NAN, 1.0, 5.0]), Some(3.0));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_ties_at_median_fall_low() {
        let attr = SensitiveAttribute::split_at_median("x", &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(attr.median, 2.0);
        assert_eq!(attr.groups, vec!["low_x", "low_x", "high_x"]);
    }

    #[test]
    fn test_every_row_gets_exactly_one_group() {
        let values: Vec<f64> = (0..37).map(|i| ((i * 7919) % 23) as f64).collect();
        let attr = SensitiveAttribute::split_at_median("v", &values).unwrap();
        assert_eq!(attr.groups.len(), values.len());
        for (value, group) in values.iter().zip(&attr.groups) {
            if *value > attr.median {
                assert_eq!(group, "high_v");
            } else {
                assert_eq!(group, "low_v");
            }
        }
    }

    #[test]
    fn test_missing_cells_fall_low() {
        let attr = SensitiveAttribute::split_at_median("x", &[f64::NAN, 1.0, 9.0]).unwrap();
        assert_eq!(attr.groups[0], "low_x");
    }

    #[test]
    fn test_derive_uses_first_feature_column() {
        let ds = TabularDataset::new(vec![
            Column::numeric("target", vec![0.0, 1.0]),
            Column::numeric("petal_width", vec![0.2, 1.8]),
            Column::numeric("sepal_length", vec![5.0, 4.0]),
        ])
        .unwrap();
        let attr = SensitiveAttribute::derive(&ds).unwrap();
        assert_eq!(attr.column, "petal_width");
        assert_eq!(attr.name(), "petal_width_high_vs_low");
        assert_eq!(attr.groups, vec!["low_petal_width", "high_petal_width"]);
    }

    #[test]
    fn test_text_column_rejected() {
        let ds = TabularDataset::new(vec![
            Column::text("species", vec!["setosa".into()]),
            Column::numeric("target", vec![0.0]),
        ])
        .unwrap();
        assert!(matches!(SensitiveAttribute::derive(&ds), Err(AuditError::InvalidInput(_))));
    }
}
