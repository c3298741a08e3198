use crate::dataset::Label;
use crate::error::{AuditError, Result};

/// True/predicted labels projected onto a single positive class.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryLabels {
    pub positive: Label,
    pub y_true: Vec<bool>,
    pub y_pred: Vec<bool>,
}

impl BinaryLabels {
    /// The positive class is the first true label in row order. Reordering
    /// rows upstream can change which class is audited.
    pub fn project(y_true: &[Label], y_pred: &[Label]) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(AuditError::InvalidInput(format!(
                "Got {} true labels but {} predictions", y_true.len(), y_pred.len()
            )));
        }

        let positive = y_true
            .first()
            .cloned()
            .ok_or_else(|| AuditError::InvalidInput("Cannot binarize an empty label sequence".to_string()))?;

        Ok(Self {
            y_true: y_true.iter().map(|l| *l == positive).collect(),
            y_pred: y_pred.iter().map(|l| *l == positive).collect(),
            positive,
        })
    }

    pub fn len(&self) -> usize {
        self.y_true.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y_true.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(values: &[i64]) -> Vec<Label> {
        values.iter().map(|v| Label::Int(*v)).collect()
    }

    #[test]
    fn test_first_observed_label_is_positive() {
        let bin = BinaryLabels::project(&labels(&[2, 0, 1, 2]), &labels(&[2, 2, 1, 0])).unwrap();
        assert_eq!(bin.positive, Label::Int(2));
        assert_eq!(bin.y_true, vec![true, false, false, true]);
        assert_eq!(bin.y_pred, vec![true, true, false, false]);
    }

    #[test]
    fn test_permutation_keeping_first_row() {
        let y_true = labels(&[1, 0, 2, 1, 0]);
        let y_pred = labels(&[1, 1, 2, 0, 0]);
        let base = BinaryLabels::project(&y_true, &y_pred).unwrap();

        let order = [0, 4, 2, 1, 3];
        let permuted_true: Vec<_> = order.iter().map(|i| y_true[*i].clone()).collect();
        let permuted_pred: Vec<_> = order.iter().map(|i| y_pred[*i].clone()).collect();
        let permuted = BinaryLabels::project(&permuted_true, &permuted_pred).unwrap();

        assert_eq!(permuted.positive, base.positive);
        for (j, i) in order.iter().enumerate() {
            assert_eq!(permuted.y_true[j], base.y_true[*i]);
            assert_eq!(permuted.y_pred[j], base.y_pred[*i]);
        }
    }

    #[test]
    fn test_text_labels() {
        let y_true = vec![Label::from("spam"), Label::from("ham")];
        let y_pred = vec![Label::from("ham"), Label::from("ham")];
        let bin = BinaryLabels::project(&y_true, &y_pred).unwrap();
        assert_eq!(bin.y_pred, vec![false, false]);
    }

    #[test]
    fn test_length_mismatch() {
        let err = BinaryLabels::project(&labels(&[1, 0]), &labels(&[1])).unwrap_err();
        assert!(matches!(err, AuditError::InvalidInput(_)));
    }

    #[test]
    fn test_empty_input() {
        assert!(BinaryLabels::project(&[], &[]).is_err());
    }
}
