//! Run coordinator
//!
//! Drives one redaction run: merge the pseudonym tables, then scan,
//! resolve and rewrite each input in turn, then save the merged table.

use crate::config::FilterConfig;
use crate::core::gate::GenerationGate;
use crate::core::generator::PseudonymGenerator;
use crate::core::inputs::table_sources;
use crate::core::rewriter::{output_path, rewrite_file, Substitution};
use crate::core::scanner::scan_file;
use crate::core::store::PseudonymStore;
use crate::domain::{FilterError, NhsNumber, Result};
use crate::report::{
    highlight_path, write_highlight_file, AuditLogger, FileAudit, FileOutcome, RunSummary,
};
use rand::rngs::StdRng;
use rand::Rng;
use std::path::{Path, PathBuf};
use std::time::Instant;
use uuid::Uuid;

/// Coordinates a run over a list of files
///
/// # Examples
///
/// ```no_run
/// use nhsfilter::config::FilterConfig;
/// use nhsfilter::core::gate::PreApprovedGate;
/// use nhsfilter::core::pipeline::Pipeline;
/// use std::path::PathBuf;
///
/// # fn example() -> nhsfilter::domain::Result<()> {
/// let mut pipeline = Pipeline::new(FilterConfig::default(), Box::new(PreApprovedGate))?;
/// let summary = pipeline.run(&[PathBuf::from("visits.csv")])?;
/// println!("{}", summary.format_console());
/// # Ok(())
/// # }
/// ```
pub struct Pipeline<R: Rng = StdRng> {
    config: FilterConfig,
    store: PseudonymStore,
    generator: PseudonymGenerator<R>,
    gate: Box<dyn GenerationGate>,
    audit: Option<AuditLogger>,
    summary: RunSummary,
}

impl Pipeline<StdRng> {
    /// Create a pipeline with an entropy-seeded generator
    pub fn new(config: FilterConfig, gate: Box<dyn GenerationGate>) -> Result<Self> {
        let generator =
            PseudonymGenerator::new().with_max_attempts(config.pseudonyms.max_attempts);
        Self::with_generator(config, gate, generator)
    }
}

impl<R: Rng> Pipeline<R> {
    /// Create a pipeline around a given generator
    ///
    /// # Errors
    ///
    /// Fails if audit logging is enabled and its directory cannot be created.
    pub fn with_generator(
        config: FilterConfig,
        gate: Box<dyn GenerationGate>,
        generator: PseudonymGenerator<R>,
    ) -> Result<Self> {
        let run_id = Uuid::new_v4();

        let audit = if config.audit.enabled {
            let logger =
                AuditLogger::new(config.audit.log_path.clone(), config.audit.json_format, run_id)
                    .map_err(|e| FilterError::Configuration(format!("{e:#}")))?;
            Some(logger)
        } else {
            None
        };

        let store = PseudonymStore::new(config.pseudonyms.canonical_table_path());

        Ok(Self {
            config,
            store,
            generator,
            gate,
            audit,
            summary: RunSummary::new(run_id),
        })
    }

    /// Process `files` in order and save the merged table
    ///
    /// Files that cannot be read or written are recorded as skipped and the
    /// run continues. The table is saved even when the run stops early.
    ///
    /// # Errors
    ///
    /// - [`FilterError::AutoGenerationDenied`] if generation is refused
    /// - [`FilterError::GenerationExhausted`] if no free pseudonym is found
    /// - [`FilterError::Table`] if the table cannot be saved
    pub fn run(&mut self, files: &[PathBuf]) -> Result<RunSummary> {
        tracing::info!(
            run_id = %self.summary.run_id,
            files = files.len(),
            "Starting run"
        );

        self.load_tables(files);

        for file in files {
            if let Err(e) = self.process_file(file) {
                tracing::error!(path = %file.display(), error = %e, "Run stopped");
                if let Err(save_error) = self.save_table() {
                    tracing::error!(error = %save_error, "Failed to save pseudonym table");
                }
                return Err(e);
            }
        }

        self.save_table()?;
        self.summary.finish();
        self.summary.log_summary();
        Ok(self.summary.clone())
    }

    /// Merge the tables next to `files` and the canonical table
    pub fn load_tables(&mut self, files: &[PathBuf]) {
        let sources = table_sources(
            files,
            &self.config.pseudonyms.table_name,
            self.store.canonical_path(),
        );
        let loaded = self.store.load_files(&sources);

        tracing::info!(
            tables = loaded.tables.len(),
            mappings = self.store.len(),
            skipped_rows = loaded.skipped,
            "Loaded pseudonym tables"
        );

        self.summary.tables_read = loaded.tables;
        self.summary.pseudonyms_loaded = self.store.len();
        self.store.confirm_startup(self.gate.as_mut());
    }

    /// Redact one file
    ///
    /// Every pseudonym for the file is resolved before anything is written,
    /// so a refusal leaves no output for it.
    pub fn process_file(&mut self, path: &Path) -> Result<()> {
        let started = Instant::now();

        let occurrences = match scan_file(path, self.config.scan.trailing_run) {
            Ok(found) => found,
            Err(e) => {
                crate::log_file_skipped!(path, e);
                self.summary.record(
                    path.to_path_buf(),
                    FileOutcome::Skipped {
                        reason: e.to_string(),
                    },
                );
                return Ok(());
            }
        };

        self.store
            .note_seen(occurrences.iter().map(|occurrence| occurrence.number));

        let generated_before = self.store.generated_count();
        let mut pairs = Vec::with_capacity(occurrences.len());
        for occurrence in &occurrences {
            let pseudonym =
                self.store
                    .resolve(occurrence.number, self.gate.as_mut(), &mut self.generator)?;
            pairs.push((*occurrence, pseudonym));
        }
        let new_pseudonyms = self.store.generated_count() - generated_before;

        let substitutions: Vec<Substitution> = pairs
            .iter()
            .map(|(occurrence, pseudonym)| Substitution {
                offset: occurrence.offset,
                replacement: *pseudonym,
            })
            .collect();

        let output = output_path(path, &self.config.scan.output_prefix);
        if let Err(e) = rewrite_file(path, &output, &substitutions) {
            crate::log_file_skipped!(path, e);
            self.summary.record(
                path.to_path_buf(),
                FileOutcome::Skipped {
                    reason: e.to_string(),
                },
            );
            return Ok(());
        }

        let highlight = if self.config.highlight.enabled {
            let dest = highlight_path(path);
            match write_highlight_file(path, &dest, &pairs) {
                Ok(()) => Some(dest),
                Err(e) => {
                    tracing::warn!(path = %dest.display(), error = %e, "Cannot write highlight report");
                    None
                }
            }
        } else {
            None
        };

        let processing_time_ms = started.elapsed().as_millis() as u64;

        if let Some(audit) = &self.audit {
            let numbers: Vec<NhsNumber> = occurrences.iter().map(|o| o.number).collect();
            let entry = FileAudit {
                source: path,
                output: &output,
                numbers: &numbers,
                new_pseudonyms,
                processing_time_ms,
            };
            if let Err(e) = audit.log_file(&entry) {
                tracing::warn!(error = %format!("{e:#}"), "Failed to write audit entry");
            }
        }

        tracing::info!(
            path = %path.display(),
            output = %output.display(),
            occurrences = occurrences.len(),
            new_pseudonyms,
            processing_time_ms,
            "File redacted"
        );

        self.summary.record(
            path.to_path_buf(),
            FileOutcome::Processed {
                output,
                occurrences: occurrences.len(),
                new_pseudonyms,
                highlight,
            },
        );
        Ok(())
    }

    fn save_table(&mut self) -> Result<()> {
        self.summary.pseudonyms_generated = self.store.generated_count();
        self.store.save()?;
        self.summary.table_saved = Some(self.store.canonical_path().to_path_buf());
        Ok(())
    }

    /// The pseudonym store
    pub fn store(&self) -> &PseudonymStore {
        &self.store
    }

    /// The summary so far
    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::gate::PreApprovedGate;
    use std::fs;
    use tempfile::tempdir;

    fn config_in(dir: &Path) -> FilterConfig {
        let mut config = FilterConfig::default();
        config.pseudonyms.canonical_path = Some(dir.join("pseudonyms.csv"));
        config
    }

    fn nhs(s: &str) -> NhsNumber {
        NhsNumber::parse(s).unwrap()
    }

    #[test]
    fn test_run_redacts_and_saves() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("visits.csv");
        fs::write(&input, "id,nhs\n1,9434765919\n2,9434765919\n").unwrap();

        let mut pipeline = Pipeline::with_generator(
            config_in(dir.path()),
            Box::new(PreApprovedGate),
            PseudonymGenerator::seeded(5),
        )
        .unwrap();
        let summary = pipeline.run(&[input.clone()]).unwrap();

        assert_eq!(summary.processed_count(), 1);
        assert_eq!(summary.total_occurrences(), 2);
        assert_eq!(summary.pseudonyms_generated, 1);

        let pseudonym = pipeline.store().lookup(nhs("9434765919")).unwrap();
        let output = fs::read_to_string(dir.path().join("ANON_visits.csv")).unwrap();
        assert_eq!(output, format!("id,nhs\n1,{pseudonym}\n2,{pseudonym}\n"));

        let table = fs::read_to_string(dir.path().join("pseudonyms.csv")).unwrap();
        assert!(table.contains(&format!("9434765919,{pseudonym}")));
    }

    #[test]
    fn test_unreadable_input_is_skipped() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.csv");
        fs::write(&good, "no numbers here\n").unwrap();
        let missing = dir.path().join("missing.csv");

        let mut pipeline =
            Pipeline::new(config_in(dir.path()), Box::new(PreApprovedGate)).unwrap();
        let summary = pipeline.run(&[missing, good]).unwrap();

        assert_eq!(summary.skipped_count(), 1);
        assert_eq!(summary.processed_count(), 1);
        assert!(!summary.is_successful());
        assert!(dir.path().join("ANON_good.csv").exists());
    }

    #[test]
    fn test_denial_stops_run_and_keeps_table() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("pseudonyms.csv"),
            "Real_NHS_Number,Pseudonym_NHS_Number\n9434765919,4010232137\n",
        )
        .unwrap();
        let first = dir.path().join("a.csv");
        let second = dir.path().join("b.csv");
        fs::write(&first, "9434765919\n").unwrap();
        fs::write(&second, "9434765919 0123456789\n").unwrap();

        let gate = |_: Option<NhsNumber>| false;
        let mut pipeline = Pipeline::new(config_in(dir.path()), Box::new(gate)).unwrap();
        let err = pipeline.run(&[first, second]).unwrap_err();

        assert!(matches!(err, FilterError::AutoGenerationDenied { .. }));
        assert_eq!(
            fs::read_to_string(dir.path().join("ANON_a.csv")).unwrap(),
            "4010232137\n"
        );
        assert!(!dir.path().join("ANON_b.csv").exists());

        let table = fs::read_to_string(dir.path().join("pseudonyms.csv")).unwrap();
        assert!(table.contains("9434765919,4010232137"));
    }

    #[test]
    fn test_highlight_written_when_enabled() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("visits.csv");
        fs::write(&input, "x 9434765919 y").unwrap();

        let mut config = config_in(dir.path());
        config.highlight.enabled = true;
        let mut pipeline = Pipeline::new(config, Box::new(PreApprovedGate)).unwrap();
        pipeline.run(&[input]).unwrap();

        let html = fs::read_to_string(dir.path().join("visits.csv.html")).unwrap();
        assert!(html.contains("Red'>9434765919</span>"));
    }

    #[test]
    fn test_audit_entry_written_when_enabled() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("visits.csv");
        fs::write(&input, "9434765919").unwrap();

        let mut config = config_in(dir.path());
        config.audit.enabled = true;
        config.audit.log_path = dir.path().join("audit").join("run.log");
        let mut pipeline = Pipeline::new(config, Box::new(PreApprovedGate)).unwrap();
        pipeline.run(&[input]).unwrap();

        let log = fs::read_to_string(dir.path().join("audit").join("run.log")).unwrap();
        assert_eq!(log.lines().count(), 1);
        assert!(!log.contains("9434765919"));
    }
}
