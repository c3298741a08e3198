use std::collections::BTreeMap;
use serde::Serialize;
use crate::error::{AuditError, Result};

pub const ACCURACY: &str = "accuracy";
pub const SELECTION_RATE: &str = "selection_rate";

pub type MetricMap = BTreeMap<String, f64>;

/// Confusion counts over one slice of binarized rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub tp: usize,
    pub tn: usize,
    pub fp: usize,
    pub fn_: usize,
}

impl Tally {
    pub fn add(&mut self, truth: bool, pred: bool) {
        match (truth, pred) {
            (true, true) => self.tp += 1,
            (false, false) => self.tn += 1,
            (false, true) => self.fp += 1,
            (true, false) => self.fn_ += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.tp + self.tn + self.fp + self.fn_
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.tp + self.tn, self.total())
    }

    pub fn selection_rate(&self) -> f64 {
        ratio(self.tp + self.fp, self.total())
    }

    /// 0.0 when the slice has no positives.
    pub fn true_positive_rate(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    /// 0.0 when the slice has no negatives.
    pub fn false_positive_rate(&self) -> f64 {
        ratio(self.fp, self.fp + self.tn)
    }

    fn metrics(&self) -> MetricMap {
        let mut metrics = MetricMap::new();
        metrics.insert(ACCURACY.to_string(), self.accuracy());
        metrics.insert(SELECTION_RATE.to_string(), self.selection_rate());
        metrics
    }
}

fn ratio(num: usize, denom: usize) -> f64 {
    if denom == 0 {
        0.0
    } else {
        num as f64 / denom as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMetricFrame {
    pub overall: MetricMap,
    pub by_group: BTreeMap<String, MetricMap>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FairnessMetrics {
    pub frame: GroupMetricFrame,
    pub demographic_parity_difference: f64,
    pub equalized_odds_difference: f64,
}

pub struct FairnessMetricComputer;

impl FairnessMetricComputer {
    pub fn compute(y_true: &[bool], y_pred: &[bool], groups: &[String]) -> Result<FairnessMetrics> {
        if y_true.len() != y_pred.len() || y_true.len() != groups.len() {
            return Err(AuditError::InvalidInput(format!(
                "Misaligned inputs: {} true labels, {} predictions, {} group values",
                y_true.len(),
                y_pred.len(),
                groups.len()
            )));
        }

        let mut overall = Tally::default();
        let mut tallies: BTreeMap<&str, Tally> = BTreeMap::new();
        for ((truth, pred), group) in y_true.iter().zip(y_pred).zip(groups) {
            overall.add(*truth, *pred);
            tallies.entry(group.as_str()).or_default().add(*truth, *pred);
        }

        if tallies.len() < 2 {
            return Err(AuditError::InsufficientGroups(format!(
                "disparity needs at least two groups, found {}",
                match tallies.keys().next() {
                    Some(only) => format!("only '{}'", only),
                    None => "none".to_string(),
                }
            )));
        }

        let demographic_parity_difference = spread(tallies.values().map(Tally::selection_rate));
        let equalized_odds_difference = spread(tallies.values().map(Tally::true_positive_rate))
            .max(spread(tallies.values().map(Tally::false_positive_rate)));

        let by_group = tallies
            .iter()
            .map(|(group, tally)| (group.to_string(), tally.metrics()))
            .collect();

        Ok(FairnessMetrics {
            frame: GroupMetricFrame {
                overall: overall.metrics(),
                by_group,
            },
            demographic_parity_difference,
            equalized_odds_difference,
        })
    }
}

/// max − min; independent of iteration order.
fn spread(rates: impl Iterator<Item = f64>) -> f64 {
    let (min, max) = rates.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| (lo.min(r), hi.max(r)));
    if min.is_finite() && max.is_finite() {
        max - min
    } else {
        0.0
    }
}
