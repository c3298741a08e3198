//! Layered configuration: explicit argument > config file > environment >
//! built-in default. [`resolve`] is pure; callers gather each layer first.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use serde::Deserialize;
use tracing::{debug, warn};
use crate::audit::AuditKind;
use crate::error::Result;

pub const DEFAULT_PARAMS_FILE: &str = "params.yaml";
pub const DEFAULT_DATASET_PATH: &str = "data/iris.parquet";
pub const DEFAULT_MODEL_PATH: &str = "artifacts/model.json";
pub const DEFAULT_FAIRNESS_REPORT: &str = "artifacts/fairness_report.json";
pub const DEFAULT_SCAN_REPORT: &str = "artifacts/scan_report.json";
pub const DEFAULT_PRESENCE_REPORT: &str = "artifacts/presence_report.json";

pub const ENV_DATASET_PATH: &str = "MODELAUDIT_DATASET_PATH";
pub const ENV_MODEL_PATH: &str = "MODELAUDIT_MODEL_PATH";
pub const ENV_FAIRNESS_REPORT: &str = "MODELAUDIT_FAIRNESS_REPORT";
pub const ENV_SCAN_REPORT: &str = "MODELAUDIT_SCAN_REPORT";
pub const ENV_PRESENCE_REPORT: &str = "MODELAUDIT_PRESENCE_REPORT";
pub const ENV_MANIFEST_PATH: &str = "MODELAUDIT_MANIFEST_PATH";

const ENV_PREFIX: &str = "MODELAUDIT_";

/// Which audits run. Only explicit flags select audits; no other layer can.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuditSelection {
    pub fairness: bool,
    pub scan: bool,
    pub presence: bool,
}

impl AuditSelection {
    pub fn all() -> Self {
        Self { fairness: true, scan: true, presence: true }
    }

    pub fn is_empty(&self) -> bool {
        !(self.fairness || self.scan || self.presence)
    }

    /// Selected kinds in execution order.
    pub fn kinds(&self) -> Vec<AuditKind> {
        AuditKind::ALL
            .into_iter()
            .filter(|kind| match kind {
                AuditKind::Fairness => self.fairness,
                AuditKind::Scan => self.scan,
                AuditKind::PresenceCheck => self.presence,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub fairness: PathBuf,
    pub scan: PathBuf,
    pub presence: PathBuf,
}

impl ReportPaths {
    pub fn for_kind(&self, kind: AuditKind) -> &Path {
        match kind {
            AuditKind::Fairness => &self.fairness,
            AuditKind::Scan => &self.scan,
            AuditKind::PresenceCheck => &self.presence,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditConfig {
    pub dataset_path: PathBuf,
    pub model_path: PathBuf,
    pub selection: AuditSelection,
    pub reports: ReportPaths,
    pub manifest_path: Option<PathBuf>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        resolve(AuditSelection::default(), &PathOverrides::default(), &PathOverrides::default(), &EnvSnapshot::default())
    }
}

/// Optional path settings. Used both for explicit arguments and for the
/// `audit:` section of a params file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PathOverrides {
    pub dataset_path: Option<PathBuf>,
    pub model_path: Option<PathBuf>,
    pub fairness_report: Option<PathBuf>,
    pub scan_report: Option<PathBuf>,
    pub presence_report: Option<PathBuf>,
    pub manifest_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct ParamsFile {
    #[serde(default)]
    audit: PathOverrides,
}

/// `MODELAUDIT_*` variables captured once, so resolution never reads the
/// process environment itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvSnapshot {
    pub fn capture() -> Self {
        Self::from_vars(std::env::vars().filter(|(k, _)| k.starts_with(ENV_PREFIX)))
    }

    pub fn from_vars<K: Into<String>, V: Into<String>>(vars: impl IntoIterator<Item = (K, V)>) -> Self {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .filter(|(_, v)| !v.is_empty())
                .collect(),
        }
    }

    pub fn path(&self, key: &str) -> Option<PathBuf> {
        self.vars.get(key).map(PathBuf::from)
    }
}

/// Reads the `audit:` section of a params file.
///
/// With no explicit path, `params.yaml` in the working directory is used when
/// it exists. A missing file yields an empty section; other sections
/// (e.g. `train:`) are ignored.
pub fn load_params(path: Option<&Path>) -> Result<PathOverrides> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => PathBuf::from(DEFAULT_PARAMS_FILE),
    };

    if !path.exists() {
        if path != Path::new(DEFAULT_PARAMS_FILE) {
            warn!("Params file {} not found; using environment and defaults", path.display());
        }
        return Ok(PathOverrides::default());
    }

    let content = fs::read_to_string(&path)?;
    if content.trim().is_empty() {
        return Ok(PathOverrides::default());
    }

    let params: ParamsFile = serde_yaml::from_str(&content)?;
    debug!("Loaded audit params from {}", path.display());
    Ok(params.audit)
}

pub fn resolve(
    selection: AuditSelection,
    explicit: &PathOverrides,
    file: &PathOverrides,
    env: &EnvSnapshot,
) -> AuditConfig {
    let pick = |arg: &Option<PathBuf>, from_file: &Option<PathBuf>, key: &str, default: &str| {
        arg.clone()
            .or_else(|| from_file.clone())
            .or_else(|| env.path(key))
            .unwrap_or_else(|| PathBuf::from(default))
    };

    AuditConfig {
        dataset_path: pick(&explicit.dataset_path, &file.dataset_path, ENV_DATASET_PATH, DEFAULT_DATASET_PATH),
        model_path: pick(&explicit.model_path, &file.model_path, ENV_MODEL_PATH, DEFAULT_MODEL_PATH),
        selection,
        reports: ReportPaths {
            fairness: pick(&explicit.fairness_report, &file.fairness_report, ENV_FAIRNESS_REPORT, DEFAULT_FAIRNESS_REPORT),
            scan: pick(&explicit.scan_report, &file.scan_report, ENV_SCAN_REPORT, DEFAULT_SCAN_REPORT),
            presence: pick(&explicit.presence_report, &file.presence_report, ENV_PRESENCE_REPORT, DEFAULT_PRESENCE_REPORT),
        },
        manifest_path: explicit
            .manifest_path
            .clone()
            .or_else(|| file.manifest_path.clone())
            .or_else(|| env.path(ENV_MANIFEST_PATH)),
    }
}
