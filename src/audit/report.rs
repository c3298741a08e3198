use std::fs;
use std::path::{Path, PathBuf};
use serde::Serialize;
use tabled::Tabled;
use crate::error::Result;
use super::kind::AuditKind;

/// Writes `body` to `path`, replacing any previous file and creating parent
/// directories as needed.
pub fn write_text(path: impl AsRef<Path>, body: &str) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, body)?;
    Ok(())
}

pub fn write_json<T: Serialize + ?Sized>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let body = serde_json::to_string_pretty(value)?;
    write_text(path, &body)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStatus {
    Written,
    Degraded,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Written => "written",
            ReportStatus::Degraded => "degraded",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            ReportStatus::Written => "✓",
            ReportStatus::Degraded => "⚠",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRecord {
    pub kind: AuditKind,
    pub path: PathBuf,
    pub status: ReportStatus,
    pub detail: Option<String>,
}

impl ReportRecord {
    pub fn written(kind: AuditKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
            status: ReportStatus::Written,
            detail: None,
        }
    }

    pub fn degraded(kind: AuditKind, path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            status: ReportStatus::Degraded,
            detail: Some(detail.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Loaded,
    Running(AuditKind),
    Completed,
    NoOp,
    Aborted,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunState::Idle => write!(f, "idle"),
            RunState::Loaded => write!(f, "loaded"),
            RunState::Running(kind) => write!(f, "running({})", kind),
            RunState::Completed => write!(f, "completed"),
            RunState::NoOp => write!(f, "no-op"),
            RunState::Aborted => write!(f, "aborted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditSummary {
    pub state: RunState,
    pub reports: Vec<ReportRecord>,
    pub manifest: Option<PathBuf>,
}

impl AuditSummary {
    pub fn noop() -> Self {
        Self {
            state: RunState::NoOp,
            reports: Vec::new(),
            manifest: None,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.state == RunState::NoOp
    }

    pub fn degraded_count(&self) -> usize {
        self.reports.iter().filter(|r| r.status == ReportStatus::Degraded).count()
    }

    pub fn report(&self, kind: AuditKind) -> Option<&ReportRecord> {
        self.reports.iter().find(|r| r.kind == kind)
    }
}

#[derive(Debug, Clone, Tabled)]
pub struct ReportTableRow {
    #[tabled(rename = "Audit")]
    pub audit: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Report")]
    pub path: String,
}

impl From<&ReportRecord> for ReportTableRow {
    fn from(record: &ReportRecord) -> Self {
        ReportTableRow {
            audit: record.kind.to_string(),
            status: format!("{} {}", record.status.symbol(), record.status.as_str()),
            path: record.path.display().to_string(),
        }
    }
}
