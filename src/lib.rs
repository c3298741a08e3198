pub mod error;
pub mod config;
pub mod dataset;
pub mod model;
pub mod integrity;
pub mod fairness;
pub mod scan;
pub mod presence;
pub mod audit;

pub use error::{AuditError, Result};
pub use config::{AuditConfig, AuditSelection, ReportPaths, PathOverrides, EnvSnapshot, load_params, resolve};
pub use dataset::{Label, Column, ColumnData, FeatureMatrix, TabularDataset, DatasetLoader, DatasetFormat};
pub use model::{Predictor, ModelArtifact};
pub use integrity::{HashEngine, IntegrityManifest, ManifestBuilder, VerificationReport, ArtifactStatus};
pub use fairness::{
    SensitiveAttribute, BinaryLabels, FairnessMetricComputer, FairnessMetrics,
    GroupMetricFrame, FairnessReport,
};
pub use scan::{ScanEngine, QualityScanner, ScanAdapter, ScanOutcome, DegradedScanReport};
pub use presence::PresenceReport;
pub use audit::{AuditKind, Capabilities, AuditOrchestrator, AuditSummary, ReportRecord, ReportStatus, RunState};
