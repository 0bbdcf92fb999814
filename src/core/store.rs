//! Persistent real → pseudonym mapping
//!
//! The store is built once per run. It merges every `pseudonyms.csv` found
//! in the directories the run touches, grows as new NHS numbers are met, and
//! is written back to a single canonical table when the run ends.

use crate::core::gate::GenerationGate;
use crate::core::generator::PseudonymGenerator;
use crate::domain::{FilterError, NhsNumber, Result};
use rand::Rng;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// File name of the per-directory pseudonym table
pub const TABLE_FILE_NAME: &str = "pseudonyms.csv";

/// Header row written at the top of every saved table
pub const TABLE_HEADER: &str = "Real_NHS_Number,Pseudonym_NHS_Number";

/// Where the store stands on generating new pseudonyms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Generation {
    /// Nobody has been asked yet
    Unasked,
    /// The startup question was answered no; ask again when it matters
    DeferredAtStartup,
    /// Generation is enabled for the rest of the run
    Permitted,
    /// Generation was refused at the first unmapped number
    Denied,
}

/// Counts from reading one table file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableStats {
    /// Rows that produced a mapping
    pub loaded: usize,
    /// Rows skipped as malformed (the header included)
    pub skipped: usize,
}

/// Counts from [`PseudonymStore::load`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Tables that were found and read
    pub tables: Vec<PathBuf>,
    /// Rows loaded across all tables
    pub loaded: usize,
    /// Rows skipped across all tables
    pub skipped: usize,
}

/// In-memory pseudonym table for one run
///
/// # Examples
///
/// ```
/// use nhsfilter::core::store::PseudonymStore;
/// use nhsfilter::core::gate::PreApprovedGate;
/// use nhsfilter::core::generator::PseudonymGenerator;
/// use nhsfilter::domain::NhsNumber;
///
/// # fn example() -> nhsfilter::domain::Result<()> {
/// let mut store = PseudonymStore::new("pseudonyms.csv");
/// let mut generator = PseudonymGenerator::seeded(1);
/// let real = NhsNumber::parse("9434765919").unwrap();
///
/// let pseudonym = store.resolve(real, &mut PreApprovedGate, &mut generator)?;
/// assert_eq!(store.lookup(real), Some(pseudonym));
/// # Ok(())
/// # }
/// ```
pub struct PseudonymStore {
    entries: BTreeMap<NhsNumber, NhsNumber>,
    issued: HashSet<NhsNumber>,
    /// Real numbers found in scanned files, mapped or not
    seen: HashSet<NhsNumber>,
    canonical_path: PathBuf,
    generation: Generation,
    generated: usize,
}

impl PseudonymStore {
    /// Create an empty store that will be saved to `canonical_path`
    pub fn new(canonical_path: impl Into<PathBuf>) -> Self {
        Self {
            entries: BTreeMap::new(),
            issued: HashSet::new(),
            seen: HashSet::new(),
            canonical_path: canonical_path.into(),
            generation: Generation::Unasked,
            generated: 0,
        }
    }

    /// Merge the `table_name` file of every directory into the store
    ///
    /// Missing or unreadable tables contribute nothing. When two tables map
    /// the same real number differently, the one read last wins.
    pub fn load<I, P>(&mut self, directories: I, table_name: &str) -> LoadSummary
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.load_files(
            directories
                .into_iter()
                .map(|dir| dir.as_ref().join(table_name)),
        )
    }

    /// Merge the given table files into the store, in order
    pub fn load_files<I, P>(&mut self, tables: I) -> LoadSummary
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut summary = LoadSummary::default();

        for table in tables {
            let path = table.as_ref();
            match self.load_table(path) {
                Ok(stats) => {
                    tracing::info!(
                        path = %path.display(),
                        loaded = stats.loaded,
                        skipped = stats.skipped,
                        "Read pseudonym table"
                    );
                    summary.tables.push(path.to_path_buf());
                    summary.loaded += stats.loaded;
                    summary.skipped += stats.skipped;
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    tracing::debug!(path = %path.display(), "No pseudonym table");
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Could not read pseudonym table, ignoring it"
                    );
                }
            }
        }

        self.issued = self.entries.values().copied().collect();
        summary
    }

    /// Read one table file
    ///
    /// Rows need at least two comma-separated integer fields that are valid
    /// NHS numbers; any other row, including one that is not UTF-8, is
    /// skipped on its own.
    pub fn load_table(&mut self, path: &Path) -> io::Result<TableStats> {
        let contents = fs::read(path)?;
        let mut stats = TableStats::default();

        for (index, raw) in contents.split(|&b| b == b'\n').enumerate() {
            let row = std::str::from_utf8(raw).ok();
            if row.is_some_and(|line| line.trim().is_empty()) {
                continue;
            }
            match row.and_then(parse_row) {
                Some((real, pseudonym)) => {
                    if let Some(previous) = self.entries.insert(real, pseudonym) {
                        if previous != pseudonym {
                            tracing::warn!(
                                path = %path.display(),
                                line = index + 1,
                                "Conflicting pseudonym for the same NHS number, keeping the later one"
                            );
                        }
                    }
                    self.issued.insert(pseudonym);
                    stats.loaded += 1;
                }
                None => {
                    tracing::debug!(path = %path.display(), line = index + 1, "Skipping malformed row");
                    stats.skipped += 1;
                }
            }
        }

        Ok(stats)
    }

    /// Look up an existing pseudonym
    pub fn lookup(&self, real: NhsNumber) -> Option<NhsNumber> {
        self.entries.get(&real).copied()
    }

    /// Record a mapping directly
    pub fn insert(&mut self, real: NhsNumber, pseudonym: NhsNumber) {
        self.entries.insert(real, pseudonym);
        self.issued.insert(pseudonym);
    }

    /// Remember real numbers found in the input so that no pseudonym
    /// generated later in the run equals one of them
    pub fn note_seen<I>(&mut self, numbers: I)
    where
        I: IntoIterator<Item = NhsNumber>,
    {
        self.seen.extend(numbers);
    }

    /// Ask the startup question when nothing was loaded
    ///
    /// A yes enables generation for the whole run. A no defers the decision
    /// to the first unmapped number.
    pub fn confirm_startup(&mut self, gate: &mut dyn GenerationGate) {
        if !self.entries.is_empty() || self.generation != Generation::Unasked {
            return;
        }
        self.generation = if gate.permit(None) {
            tracing::info!("Pseudonym generation enabled at startup");
            Generation::Permitted
        } else {
            Generation::DeferredAtStartup
        };
    }

    /// Return the pseudonym for `real`, generating one if allowed
    ///
    /// New pseudonyms never repeat an issued pseudonym, a mapped real number
    /// or a real number passed to [`note_seen`](Self::note_seen). Numbers in
    /// files not yet scanned are unknown and can still collide.
    ///
    /// # Errors
    ///
    /// - [`FilterError::AutoGenerationDenied`] if generation is refused
    /// - [`FilterError::GenerationExhausted`] if no free pseudonym is found
    pub fn resolve<R: Rng>(
        &mut self,
        real: NhsNumber,
        gate: &mut dyn GenerationGate,
        generator: &mut PseudonymGenerator<R>,
    ) -> Result<NhsNumber> {
        if let Some(pseudonym) = self.lookup(real) {
            return Ok(pseudonym);
        }

        match self.generation {
            Generation::Permitted => {}
            Generation::Denied => {
                return Err(FilterError::AutoGenerationDenied { nhs_number: real });
            }
            Generation::Unasked | Generation::DeferredAtStartup => {
                if gate.permit(Some(real)) {
                    tracing::info!("Pseudonym generation enabled");
                    self.generation = Generation::Permitted;
                } else {
                    self.generation = Generation::Denied;
                    return Err(FilterError::AutoGenerationDenied { nhs_number: real });
                }
            }
        }

        let entries = &self.entries;
        let issued = &self.issued;
        let seen = &self.seen;
        let pseudonym = generator.generate(|candidate| {
            candidate == real
                || issued.contains(&candidate)
                || entries.contains_key(&candidate)
                || seen.contains(&candidate)
        })?;

        self.insert(real, pseudonym);
        self.generated += 1;
        Ok(pseudonym)
    }

    /// Write the whole mapping to the canonical table, replacing it
    ///
    /// The table is written to a temporary file next to the target and
    /// renamed over it once complete.
    pub fn save(&self) -> Result<()> {
        let path = &self.canonical_path;
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let table_error =
            |e: &dyn std::fmt::Display| FilterError::Table(format!("{}: {e}", path.display()));

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| table_error(&e))?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            writeln!(writer, "{TABLE_HEADER}").map_err(|e| table_error(&e))?;
            for (real, pseudonym) in &self.entries {
                writeln!(writer, "{real},{pseudonym}").map_err(|e| table_error(&e))?;
            }
            writer.flush().map_err(|e| table_error(&e))?;
        }
        tmp.persist(path).map_err(|e| table_error(&e))?;

        tracing::info!(
            path = %path.display(),
            entries = self.entries.len(),
            "Saved pseudonym table"
        );
        Ok(())
    }

    /// Number of mappings
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no mappings
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pseudonyms generated during this run
    pub fn generated_count(&self) -> usize {
        self.generated
    }

    /// Path the table is saved to
    pub fn canonical_path(&self) -> &Path {
        &self.canonical_path
    }

    /// Iterate mappings in real-number order
    pub fn iter(&self) -> impl Iterator<Item = (NhsNumber, NhsNumber)> + '_ {
        self.entries.iter().map(|(r, p)| (*r, *p))
    }
}

/// Parse `real,pseudonym`, tolerating whitespace and quoted fields
fn parse_row(line: &str) -> Option<(NhsNumber, NhsNumber)> {
    let mut fields = line.split(',').map(|f| f.trim().trim_matches('"').trim());
    let real = parse_field(fields.next()?)?;
    let pseudonym = parse_field(fields.next()?)?;
    Some((real, pseudonym))
}

fn parse_field(field: &str) -> Option<NhsNumber> {
    let value: u64 = field.parse().ok()?;
    NhsNumber::from_u64(value).ok()
}
