//! Run summary
//!
//! Collects per-file outcomes during a run and renders them for the
//! console or as JSON.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use uuid::Uuid;

/// What happened to one input file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// A redacted copy was written
    Processed {
        output: PathBuf,
        occurrences: usize,
        new_pseudonyms: usize,
        highlight: Option<PathBuf>,
    },
    /// The file was left alone
    Skipped { reason: String },
}

/// Outcome for a named file
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

/// Summary of a whole run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Tables merged at startup
    pub tables_read: Vec<PathBuf>,
    /// Mappings known after loading
    pub pseudonyms_loaded: usize,
    /// Mappings generated during the run
    pub pseudonyms_generated: usize,
    /// Where the table was saved, once saved
    pub table_saved: Option<PathBuf>,
    pub files: Vec<FileReport>,
}

impl RunSummary {
    /// Start a summary for a new run
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            started_at: Utc::now(),
            finished_at: None,
            tables_read: Vec::new(),
            pseudonyms_loaded: 0,
            pseudonyms_generated: 0,
            table_saved: None,
            files: Vec::new(),
        }
    }

    pub fn record(&mut self, path: PathBuf, outcome: FileOutcome) {
        self.files.push(FileReport { path, outcome });
    }

    /// Files that produced output
    pub fn processed_count(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, FileOutcome::Processed { .. }))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.files.len() - self.processed_count()
    }

    /// Occurrences replaced across all files
    pub fn total_occurrences(&self) -> usize {
        self.files
            .iter()
            .map(|f| match f.outcome {
                FileOutcome::Processed { occurrences, .. } => occurrences,
                FileOutcome::Skipped { .. } => 0,
            })
            .sum()
    }

    /// True when no file was skipped
    pub fn is_successful(&self) -> bool {
        self.skipped_count() == 0
    }

    /// Mark the run finished
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Run time in milliseconds, once finished
    pub fn duration_ms(&self) -> Option<i64> {
        self.finished_at
            .map(|end| (end - self.started_at).num_milliseconds())
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            run_id = %self.run_id,
            processed = self.processed_count(),
            skipped = self.skipped_count(),
            replaced = self.total_occurrences(),
            generated = self.pseudonyms_generated,
            duration_ms = self.duration_ms().unwrap_or_default(),
            "Run completed"
        );

        for file in &self.files {
            if let FileOutcome::Skipped { reason } = &file.outcome {
                tracing::warn!(path = %file.path.display(), reason = %reason, "File skipped");
            }
        }
    }

    /// Format the summary for console output
    pub fn format_console(&self) -> String {
        let mut output = String::new();

        output.push('\n');
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push_str("                      NHS NUMBER FILTER                        \n");
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push('\n');

        output.push_str(&format!("  Run ID:                 {}\n", self.run_id));
        output.push_str(&format!("  Tables read:            {}\n", self.tables_read.len()));
        output.push_str(&format!("  Pseudonyms loaded:      {}\n", self.pseudonyms_loaded));
        output.push_str(&format!("  Pseudonyms generated:   {}\n", self.pseudonyms_generated));
        output.push_str(&format!("  Files processed:        {}\n", self.processed_count()));
        output.push_str(&format!("  Files skipped:          {}\n", self.skipped_count()));
        output.push_str(&format!("  Numbers replaced:       {}\n", self.total_occurrences()));
        if let Some(ms) = self.duration_ms() {
            output.push_str(&format!("  Duration:               {} ms\n", ms));
        }
        if let Some(table) = &self.table_saved {
            output.push_str(&format!("  Table saved to:         {}\n", table.display()));
        }
        output.push('\n');

        if !self.files.is_empty() {
            output.push_str("───────────────────────────────────────────────────────────────\n");
            for file in &self.files {
                match &file.outcome {
                    FileOutcome::Processed {
                        output: out,
                        occurrences,
                        ..
                    } => output.push_str(&format!(
                        "  ✓ {} -> {} ({} replaced)\n",
                        file.path.display(),
                        out.display(),
                        occurrences
                    )),
                    FileOutcome::Skipped { reason } => output.push_str(&format!(
                        "  ✗ {} skipped: {}\n",
                        file.path.display(),
                        reason
                    )),
                }
            }
            output.push('\n');
        }

        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output
    }

    /// Format the summary as JSON
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RunSummary {
        let mut summary = RunSummary::new(Uuid::new_v4());
        summary.record(
            PathBuf::from("a.csv"),
            FileOutcome::Processed {
                output: PathBuf::from("ANON_a.csv"),
                occurrences: 3,
                new_pseudonyms: 1,
                highlight: None,
            },
        );
        summary.record(
            PathBuf::from("missing.csv"),
            FileOutcome::Skipped {
                reason: "No such file or directory".to_string(),
            },
        );
        summary
    }

    #[test]
    fn test_counts() {
        let summary = sample();
        assert_eq!(summary.processed_count(), 1);
        assert_eq!(summary.skipped_count(), 1);
        assert_eq!(summary.total_occurrences(), 3);
        assert!(!summary.is_successful());
    }

    #[test]
    fn test_format_console() {
        let mut summary = sample();
        summary.finish();
        let text = summary.format_console();
        assert!(text.contains("a.csv -> ANON_a.csv (3 replaced)"));
        assert!(text.contains("missing.csv skipped"));
        assert!(text.contains("Duration:"));
    }

    #[test]
    fn test_format_json_tags_outcomes() {
        let json = sample().format_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["files"][0]["outcome"]["status"], "processed");
        assert_eq!(value["files"][1]["outcome"]["status"], "skipped");
    }

    #[test]
    fn test_empty_run_is_successful() {
        let summary = RunSummary::new(Uuid::new_v4());
        assert!(summary.is_successful());
        assert_eq!(summary.duration_ms(), None);
    }
}
