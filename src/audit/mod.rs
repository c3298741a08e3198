mod kind;
mod report;
mod orchestrator;

pub use kind::{AuditKind, Capabilities};
pub use report::{
    write_json, write_text, ReportStatus, ReportRecord, RunState, AuditSummary, ReportTableRow,
};
pub use orchestrator::AuditOrchestrator;
