use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use crate::config::AuditConfig;
use crate::dataset::{DatasetLoader, TabularDataset};
use crate::error::{AuditError, Result};
use crate::fairness::FairnessReport;
use crate::integrity::ManifestBuilder;
use crate::model::{ModelArtifact, Predictor};
use crate::presence::PresenceReport;
use crate::scan::{ScanAdapter, ScanOutcome};
use super::kind::{AuditKind, Capabilities};
use super::report::{write_json, AuditSummary, ReportRecord, RunState};

/// Runs the selected audits in fixed order against one dataset and one model.
///
/// Any error from the fairness or presence-check audits, or from loading
/// inputs, aborts the whole run. Scan execution failures are absorbed by the
/// [`ScanAdapter`] and show up as a degraded report instead.
pub struct AuditOrchestrator {
    config: AuditConfig,
    capabilities: Capabilities,
}

impl AuditOrchestrator {
    pub fn new(config: AuditConfig, capabilities: Capabilities) -> Self {
        Self { config, capabilities }
    }

    /// Loads the dataset and model from the configured paths, then runs.
    /// Nothing is read when no audit is selected.
    pub async fn run(&self) -> Result<AuditSummary> {
        if self.config.selection.is_empty() {
            info!("No audits selected; exiting cleanly.");
            return Ok(AuditSummary::noop());
        }
        self.ensure_capabilities()?;

        let dataset = Arc::new(DatasetLoader::load(&self.config.dataset_path)?);
        let model: Arc<dyn Predictor> = Arc::new(ModelArtifact::load(&self.config.model_path)?);

        let mut summary = self.run_with(dataset, model).await?;

        if let Some(manifest_path) = &self.config.manifest_path {
            let manifest = ManifestBuilder::build(&self.config.dataset_path, &self.config.model_path)?;
            manifest.write(manifest_path)?;
            info!("Integrity manifest written to {}", manifest_path.display());
            summary.manifest = Some(manifest_path.clone());
        }

        Ok(summary)
    }

    /// Runs against inputs the caller already loaded. Both are shared
    /// read-only by every selected audit.
    pub async fn run_with(
        &self,
        dataset: Arc<TabularDataset>,
        predictor: Arc<dyn Predictor>,
    ) -> Result<AuditSummary> {
        let kinds = self.config.selection.kinds();
        if kinds.is_empty() {
            info!("No audits selected; exiting cleanly.");
            return Ok(AuditSummary::noop());
        }
        self.ensure_capabilities()?;

        let mut state = RunState::Idle;
        transition(&mut state, RunState::Loaded);

        let mut reports = Vec::with_capacity(kinds.len());
        for kind in kinds {
            transition(&mut state, RunState::Running(kind));
            let output = self.config.reports.for_kind(kind);

            match self.run_kind(kind, &dataset, &predictor, output).await {
                Ok(record) => reports.push(record),
                Err(e) => {
                    debug!("{} audit failed: {}", kind, e);
                    transition(&mut state, RunState::Aborted);
                    return Err(e);
                }
            }
        }

        transition(&mut state, RunState::Completed);
        Ok(AuditSummary {
            state,
            reports,
            manifest: None,
        })
    }

    fn ensure_capabilities(&self) -> Result<()> {
        for kind in self.config.selection.kinds() {
            if !self.capabilities.is_available(kind) {
                return Err(AuditError::MissingCapability(self.capabilities.backend_name(kind)));
            }
        }
        Ok(())
    }

    async fn run_kind(
        &self,
        kind: AuditKind,
        dataset: &Arc<TabularDataset>,
        predictor: &Arc<dyn Predictor>,
        output: &Path,
    ) -> Result<ReportRecord> {
        match kind {
            AuditKind::Fairness => {
                let report = FairnessReport::build(dataset, predictor.as_ref())?;
                write_json(output, &report)?;
                info!("Fairness report written to {}", output.display());
                Ok(ReportRecord::written(kind, output))
            }
            AuditKind::Scan => {
                let adapter = ScanAdapter::new(Arc::clone(&self.capabilities.scan_engine));
                match adapter.run(Arc::clone(dataset), Arc::clone(predictor), output).await? {
                    ScanOutcome::Completed => {
                        info!("Scan report written to {}", output.display());
                        Ok(ReportRecord::written(kind, output))
                    }
                    ScanOutcome::Degraded { error } => {
                        info!("Degraded scan report written to {}", output.display());
                        Ok(ReportRecord::degraded(kind, output, error))
                    }
                }
            }
            AuditKind::PresenceCheck => {
                let report = PresenceReport::build(dataset);
                write_json(output, &report)?;
                info!("Presence-check report written to {}", output.display());
                Ok(ReportRecord::written(kind, output))
            }
        }
    }
}

fn transition(state: &mut RunState, next: RunState) {
    debug!("audit run: {} -> {}", state, next);
    *state = next;
}
