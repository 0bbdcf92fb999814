//! Digit-run scanner
//!
//! Walks raw bytes once, tracking the length of the current run of ASCII
//! digits. When a run ends on exactly ten digits that pass the check digit,
//! its start offset is recorded. Runs of any other length are dropped whole,
//! so an eleven-digit run never yields an embedded match.

use crate::domain::{NhsNumber, NHS_NUMBER_LEN};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

const READ_CHUNK: usize = 8 * 1024;

/// What to do with a digit run that is still open at end of input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailingRunPolicy {
    /// End of input closes the run like any other non-digit byte
    #[default]
    Boundary,
    /// A run open at end of input is never reported
    Ignore,
}

impl std::str::FromStr for TrailingRunPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "boundary" => Ok(Self::Boundary),
            "ignore" => Ok(Self::Ignore),
            _ => Err(format!(
                "Invalid trailing run policy '{s}'. Must be one of: boundary, ignore"
            )),
        }
    }
}

/// A validated NHS number found in a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    /// Byte offset of the first digit
    pub offset: u64,
    /// The number found at that offset
    pub number: NhsNumber,
}

/// Incremental scanner state
///
/// Only the first ten digits of the current run are kept; anything longer
/// is rejected by length before the window is looked at.
pub struct DigitRunScanner {
    policy: TrailingRunPolicy,
    window: [u8; NHS_NUMBER_LEN],
    run_len: usize,
    position: u64,
    found: Vec<Occurrence>,
}

impl DigitRunScanner {
    /// Create a scanner positioned at offset zero
    pub fn new(policy: TrailingRunPolicy) -> Self {
        Self {
            policy,
            window: [0; NHS_NUMBER_LEN],
            run_len: 0,
            position: 0,
            found: Vec::new(),
        }
    }

    /// Feed the next chunk of input
    pub fn feed(&mut self, chunk: &[u8]) {
        for &byte in chunk {
            if byte.is_ascii_digit() {
                if self.run_len < NHS_NUMBER_LEN {
                    self.window[self.run_len] = byte;
                }
                self.run_len = self.run_len.saturating_add(1);
            } else {
                self.close_run();
            }
            self.position += 1;
        }
    }

    /// Finish the input and return the occurrences in offset order
    pub fn finish(mut self) -> Vec<Occurrence> {
        if self.policy == TrailingRunPolicy::Boundary {
            self.close_run();
        }
        self.found
    }

    fn close_run(&mut self) {
        if self.run_len == NHS_NUMBER_LEN {
            if let Some(number) = NhsNumber::from_digits(&self.window) {
                self.found.push(Occurrence {
                    offset: self.position - NHS_NUMBER_LEN as u64,
                    number,
                });
            }
        }
        self.run_len = 0;
    }
}

/// Scan an in-memory buffer
///
/// # Examples
///
/// ```
/// use nhsfilter::core::scanner::{scan_bytes, TrailingRunPolicy};
///
/// let found = scan_bytes(b"ID:9434765919 end", TrailingRunPolicy::Boundary);
/// assert_eq!(found.len(), 1);
/// assert_eq!(found[0].offset, 3);
/// ```
pub fn scan_bytes(data: &[u8], policy: TrailingRunPolicy) -> Vec<Occurrence> {
    let mut scanner = DigitRunScanner::new(policy);
    scanner.feed(data);
    scanner.finish()
}

/// Scan everything a reader yields, in one pass
pub fn scan_reader<R: Read>(mut reader: R, policy: TrailingRunPolicy) -> io::Result<Vec<Occurrence>> {
    let mut scanner = DigitRunScanner::new(policy);
    let mut buf = [0u8; READ_CHUNK];

    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => scanner.feed(&buf[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(scanner.finish())
}

/// Scan a file on disk
pub fn scan_file(path: &Path, policy: TrailingRunPolicy) -> io::Result<Vec<Occurrence>> {
    let file = File::open(path)?;
    let found = scan_reader(file, policy)?;
    tracing::debug!(
        path = %path.display(),
        occurrences = found.len(),
        "Scanned file"
    );
    Ok(found)
}
