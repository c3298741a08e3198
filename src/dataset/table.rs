use std::fmt;
use serde::{Deserialize, Serialize};
use crate::error::{AuditError, Result};

pub const LABEL_COLUMN: &str = "target";

/// A class label as it appears in the dataset or a model artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Int(i64),
    Text(String),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Int(v) => write!(f, "{}", v),
            Label::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Label {
    fn from(v: i64) -> Self {
        Label::Int(v)
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Label::Text(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// Missing cells are NaN.
    Numeric(Vec<f64>),
    Text(Vec<String>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            ColumnData::Numeric(v) => Some(v),
            ColumnData::Text(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ColumnData::Numeric(_) => "numeric",
            ColumnData::Text(_) => "text",
        }
    }

    /// Numeric when every non-empty cell parses as a float.
    pub fn infer(cells: Vec<String>) -> Self {
        let parsed: Option<Vec<f64>> = cells
            .iter()
            .map(|c| {
                let c = c.trim();
                if c.is_empty() {
                    Some(f64::NAN)
                } else {
                    c.parse::<f64>().ok()
                }
            })
            .collect();

        match parsed {
            Some(values) if values.iter().any(|v| !v.is_nan()) => ColumnData::Numeric(values),
            _ => ColumnData::Text(cells),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self { name: name.into(), data: ColumnData::Numeric(values) }
    }

    pub fn text(name: impl Into<String>, values: Vec<String>) -> Self {
        Self { name: name.into(), data: ColumnData::Text(values) }
    }
}

/// Row-major numeric view of the feature columns, in declared column order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub names: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.names.len()
    }

    pub fn column(&self, index: usize) -> Vec<f64> {
        self.rows.iter().map(|r| r[index]).collect()
    }

    /// Copy with `delta` added to one column.
    pub fn shifted(&self, index: usize, delta: f64) -> Self {
        let mut shifted = self.clone();
        for row in &mut shifted.rows {
            row[index] += delta;
        }
        shifted
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TabularDataset {
    columns: Vec<Column>,
    label_column: String,
}

impl TabularDataset {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        Self::with_label(columns, LABEL_COLUMN)
    }

    pub fn with_label(columns: Vec<Column>, label_column: &str) -> Result<Self> {
        if !columns.iter().any(|c| c.name == label_column) {
            return Err(AuditError::InvalidInput(format!(
                "Dataset is missing the '{}' label column", label_column
            )));
        }
        if !columns.iter().any(|c| c.name != label_column) {
            return Err(AuditError::InvalidInput("Dataset is missing feature columns.".to_string()));
        }

        let rows = columns[0].data.len();
        if let Some(ragged) = columns.iter().find(|c| c.data.len() != rows) {
            return Err(AuditError::InvalidInput(format!(
                "Column '{}' has {} rows, expected {}", ragged.name, ragged.data.len(), rows
            )));
        }

        Ok(Self {
            columns,
            label_column: label_column.to_string(),
        })
    }

    pub fn rows(&self) -> usize {
        self.columns.first().map(|c| c.data.len()).unwrap_or(0)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn label_column(&self) -> &str {
        &self.label_column
    }

    pub fn feature_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(move |c| c.name != self.label_column)
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.feature_columns().map(|c| c.name.clone()).collect()
    }

    pub fn labels(&self) -> Result<Vec<Label>> {
        let column = self.column(&self.label_column).ok_or_else(|| {
            AuditError::InvalidInput(format!("Dataset is missing the '{}' label column", self.label_column))
        })?;

        match &column.data {
            ColumnData::Numeric(values) => values
                .iter()
                .enumerate()
                .map(|(row, v)| {
                    if v.is_nan() {
                        Err(AuditError::InvalidInput(format!("Missing label at row {}", row)))
                    } else if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
                        Ok(Label::Int(*v as i64))
                    } else {
                        Ok(Label::Text(v.to_string()))
                    }
                })
                .collect(),
            ColumnData::Text(values) => Ok(values.iter().map(|s| Label::Text(s.clone())).collect()),
        }
    }

    pub fn feature_matrix(&self) -> Result<FeatureMatrix> {
        let mut names = Vec::new();
        let mut columns = Vec::new();

        for column in self.feature_columns() {
            let values = column.data.as_numeric().ok_or_else(|| {
                AuditError::InvalidInput(format!(
                    "Feature column '{}' is {}, predictors need numeric features",
                    column.name,
                    column.data.kind()
                ))
            })?;
            names.push(column.name.clone());
            columns.push(values);
        }

        let rows = (0..self.rows())
            .map(|i| columns.iter().map(|c| c[i]).collect())
            .collect();

        Ok(FeatureMatrix { names, rows })
    }
}
