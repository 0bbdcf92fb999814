//! Run reporting: summaries, HTML highlights and the audit trail

pub mod audit;
pub mod highlight;
pub mod summary;

pub use audit::{AuditLogger, FileAudit};
pub use highlight::{highlight_path, write_highlight, write_highlight_file};
pub use summary::{FileOutcome, FileReport, RunSummary};
