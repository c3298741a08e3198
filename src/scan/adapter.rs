use std::any::Any;
use std::path::Path;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use crate::audit::write_text;
use crate::dataset::TabularDataset;
use crate::error::{AuditError, Result};
use crate::model::Predictor;
use super::engine::ScanEngine;

pub const SCAN_FAILED_WARNING: &str = "quality scan failed";

/// Report payload written in place of the engine's output when the scan fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegradedScanReport {
    pub warning: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Completed,
    Degraded { error: String },
}

impl ScanOutcome {
    pub fn is_degraded(&self) -> bool {
        matches!(self, ScanOutcome::Degraded { .. })
    }
}

/// Runs a [`ScanEngine`] so that nothing it does while scanning can abort the
/// run: errors and panics both become a degraded report at the same path.
///
/// An engine that reports itself unavailable is still a hard
/// [`AuditError::MissingCapability`].
pub struct ScanAdapter {
    engine: Arc<dyn ScanEngine>,
}

impl ScanAdapter {
    pub fn new(engine: Arc<dyn ScanEngine>) -> Self {
        Self { engine }
    }

    pub async fn run(
        &self,
        dataset: Arc<TabularDataset>,
        predictor: Arc<dyn Predictor>,
        output: &Path,
    ) -> Result<ScanOutcome> {
        if !self.engine.is_available() {
            return Err(AuditError::MissingCapability(format!("scan engine '{}'", self.engine.name())));
        }

        info!("Running {} v{}", self.engine.name(), self.engine.version());
        let engine = Arc::clone(&self.engine);
        let handle = tokio::task::spawn_blocking(move || engine.scan(&dataset, predictor.as_ref()));

        let scanned = match handle.await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(e.to_string()),
            Err(join_err) if join_err.is_panic() => Err(panic_message(join_err.into_panic())),
            Err(join_err) => Err(join_err.to_string()),
        };

        let (body, outcome) = match scanned {
            Ok(value) => (serde_json::to_string_pretty(&value)?, ScanOutcome::Completed),
            Err(error) => {
                warn!("Scan failed, writing degraded report: {}", error);
                let degraded = DegradedScanReport {
                    warning: SCAN_FAILED_WARNING.to_string(),
                    error: error.clone(),
                };
                (serde_json::to_string_pretty(&degraded)?, ScanOutcome::Degraded { error })
            }
        };

        write_text(output, &body)?;
        Ok(outcome)
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("scan engine panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("scan engine panicked: {}", s)
    } else {
        "scan engine panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use crate::dataset::{Column, Label};
    use crate::model::ModelArtifact;

    struct FailingEngine;

    impl ScanEngine for FailingEngine {
        fn name(&self) -> &str { "failing" }
        fn version(&self) -> &str { "0.0.0" }
        fn is_available(&self) -> bool { true }
        fn scan(&self, _: &TabularDataset, _: &dyn Predictor) -> Result<Value> {
            Err(AuditError::ScanExecution("unsupported model type".to_string()))
        }
    }

    struct PanickingEngine;

    impl ScanEngine for PanickingEngine {
        fn name(&self) -> &str { "panicking" }
        fn version(&self) -> &str { "0.0.0" }
        fn is_available(&self) -> bool { true }
        fn scan(&self, _: &TabularDataset, _: &dyn Predictor) -> Result<Value> {
            panic!("detector blew up")
        }
    }

    struct FixedEngine;

    impl ScanEngine for FixedEngine {
        fn name(&self) -> &str { "fixed" }
        fn version(&self) -> &str { "1.0.0" }
        fn is_available(&self) -> bool { true }
        fn scan(&self, _: &TabularDataset, _: &dyn Predictor) -> Result<Value> {
            Ok(json!({"issues": []}))
        }
    }

    struct AbsentEngine;

    impl ScanEngine for AbsentEngine {
        fn name(&self) -> &str { "absent" }
        fn version(&self) -> &str { "0.0.0" }
        fn is_available(&self) -> bool { false }
        fn scan(&self, _: &TabularDataset, _: &dyn Predictor) -> Result<Value> {
            unreachable!()
        }
    }

    fn inputs() -> (Arc<TabularDataset>, Arc<dyn Predictor>) {
        let ds = TabularDataset::new(vec![
            Column::numeric("x", vec![1.0, 2.0]),
            Column::numeric("target", vec![0.0, 1.0]),
        ])
        .unwrap();
        (Arc::new(ds), Arc::new(ModelArtifact::Constant { label: Label::Int(0) }))
    }

    fn read(path: &Path) -> Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_engine_error_is_absorbed() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("nested/scan.json");
        let (ds, model) = inputs();

        let outcome = ScanAdapter::new(Arc::new(FailingEngine)).run(ds, model, &output).await.unwrap();
        assert!(outcome.is_degraded());

        let report = read(&output);
        assert_eq!(report["warning"], SCAN_FAILED_WARNING);
        assert!(report["error"].as_str().unwrap().contains("unsupported model type"));
    }

    #[tokio::test]
    async fn test_engine_panic_is_absorbed() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("scan.json");
        let (ds, model) = inputs();

        let outcome = ScanAdapter::new(Arc::new(PanickingEngine)).run(ds, model, &output).await.unwrap();
        match outcome {
            ScanOutcome::Degraded { error } => assert!(error.contains("detector blew up")),
            ScanOutcome::Completed => panic!("expected degraded outcome"),
        }
        assert!(read(&output).get("warning").is_some());
    }

    #[tokio::test]
    async fn test_native_report_written() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("scan.json");
        let (ds, model) = inputs();

        let outcome = ScanAdapter::new(Arc::new(FixedEngine)).run(ds, model, &output).await.unwrap();
        assert_eq!(outcome, ScanOutcome::Completed);
        assert_eq!(read(&output), json!({"issues": []}));
    }

    #[tokio::test]
    async fn test_unavailable_engine_is_fatal() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("scan.json");
        let (ds, model) = inputs();

        let err = ScanAdapter::new(Arc::new(AbsentEngine)).run(ds, model, &output).await.unwrap_err();
        assert!(matches!(err, AuditError::MissingCapability(_)));
        assert!(!output.exists());
    }
}
