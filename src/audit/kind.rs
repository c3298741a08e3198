use std::fmt;
use std::sync::Arc;
use crate::scan::{QualityScanner, ScanEngine};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AuditKind {
    Fairness,
    Scan,
    PresenceCheck,
}

impl AuditKind {
    /// Execution order.
    pub const ALL: [AuditKind; 3] = [AuditKind::Fairness, AuditKind::Scan, AuditKind::PresenceCheck];

    pub fn as_str(&self) -> &'static str {
        match self {
            AuditKind::Fairness => "fairness",
            AuditKind::Scan => "scan",
            AuditKind::PresenceCheck => "presence-check",
        }
    }
}

impl fmt::Display for AuditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The backends that make each audit kind runnable. Resolved once before any
/// audit executes.
#[derive(Clone)]
pub struct Capabilities {
    pub fairness: bool,
    pub presence: bool,
    pub scan_engine: Arc<dyn ScanEngine>,
}

impl Capabilities {
    /// What this build was compiled with.
    pub fn detect() -> Self {
        Self {
            fairness: cfg!(feature = "fairness"),
            presence: crate::presence::is_available(),
            scan_engine: Arc::new(QualityScanner::new()),
        }
    }

    pub fn with_scan_engine(mut self, engine: Arc<dyn ScanEngine>) -> Self {
        self.scan_engine = engine;
        self
    }

    pub fn is_available(&self, kind: AuditKind) -> bool {
        match kind {
            AuditKind::Fairness => self.fairness,
            AuditKind::Scan => self.scan_engine.is_available(),
            AuditKind::PresenceCheck => self.presence,
        }
    }

    pub fn backend_name(&self, kind: AuditKind) -> String {
        match kind {
            AuditKind::Fairness => "fairness metrics backend".to_string(),
            AuditKind::Scan => format!("scan engine '{}'", self.scan_engine.name()),
            AuditKind::PresenceCheck => "presence-check toolkit".to_string(),
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::detect()
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities")
            .field("fairness", &self.fairness)
            .field("presence", &self.presence)
            .field("scan_engine", &self.scan_engine.name())
            .finish()
    }
}
