mod sensitive;
mod binarize;
mod metrics;
mod report;

pub use sensitive::{SensitiveAttribute, median, high_label, low_label};
pub use binarize::BinaryLabels;
pub use metrics::{
    FairnessMetricComputer, FairnessMetrics, GroupMetricFrame, MetricMap, Tally,
    ACCURACY, SELECTION_RATE,
};
pub use report::FairnessReport;
