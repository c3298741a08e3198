mod engine;
mod adapter;

pub use engine::{ScanEngine, QualityScanner, ScanResult, ScanIssue, ScanSummary, IssueSeverity};
pub use adapter::{ScanAdapter, ScanOutcome, DegradedScanReport, SCAN_FAILED_WARNING};
