//! Audit logger for redaction runs
//!
//! One line per processed file. Real NHS numbers are recorded only as
//! SHA-256 hashes, never in plaintext.
//!
//! There are only 10^10 ten-digit values, so a plain digest could be reversed
//! by hashing every candidate. Each logger therefore mixes in a random key
//! that is held in memory for the run and never written out. Hashes match
//! within one run and cannot be correlated across runs.

use crate::domain::NhsNumber;
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use rand::Rng;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// What happened to one file, as handed to the logger
#[derive(Debug, Clone)]
pub struct FileAudit<'a> {
    pub source: &'a Path,
    pub output: &'a Path,
    /// Real numbers found, one per occurrence
    pub numbers: &'a [NhsNumber],
    pub new_pseudonyms: usize,
    pub processing_time_ms: u64,
}

#[derive(Debug, Serialize)]
struct AuditLogEntry {
    timestamp: String,
    run_id: String,
    source: String,
    output: String,
    occurrences: usize,
    new_pseudonyms: usize,
    processing_time_ms: u64,
    /// Keyed SHA-256 of each distinct real number
    number_hashes: Vec<String>,
}

/// Appends audit entries to a log file
pub struct AuditLogger {
    log_path: PathBuf,
    json_format: bool,
    run_id: Uuid,
    hash_key: [u8; 32],
}

impl AuditLogger {
    /// Create a logger for one run, creating the log directory if needed
    pub fn new(log_path: PathBuf, json_format: bool, run_id: Uuid) -> Result<Self> {
        if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create audit log directory: {}", parent.display())
            })?;
        }

        Ok(Self {
            log_path,
            json_format,
            run_id,
            hash_key: rand::thread_rng().gen(),
        })
    }

    /// Record a redacted file
    pub fn log_file(&self, audit: &FileAudit<'_>) -> Result<()> {
        let distinct: BTreeSet<NhsNumber> = audit.numbers.iter().copied().collect();

        let entry = AuditLogEntry {
            timestamp: Utc::now().to_rfc3339(),
            run_id: self.run_id.to_string(),
            source: audit.source.display().to_string(),
            output: audit.output.display().to_string(),
            occurrences: audit.numbers.len(),
            new_pseudonyms: audit.new_pseudonyms,
            processing_time_ms: audit.processing_time_ms,
            number_hashes: distinct
                .into_iter()
                .map(|number| hash_number(&self.hash_key, number))
                .collect(),
        };

        self.write_entry(&entry)
    }

    fn write_entry(&self, entry: &AuditLogEntry) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open audit log: {}", self.log_path.display()))?;

        if self.json_format {
            let json_line =
                serde_json::to_string(entry).context("Failed to serialize audit entry")?;
            writeln!(file, "{json_line}").context("Failed to write audit entry")?;
        } else {
            writeln!(
                file,
                "[{}] Run: {} | File: {} -> {} | Occurrences: {} | New pseudonyms: {} | Time: {}ms",
                entry.timestamp,
                entry.run_id,
                entry.source,
                entry.output,
                entry.occurrences,
                entry.new_pseudonyms,
                entry.processing_time_ms
            )
            .context("Failed to write audit entry")?;
        }

        Ok(())
    }
}

fn hash_number(key: &[u8; 32], number: NhsNumber) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key);
    hasher.update(number.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}
