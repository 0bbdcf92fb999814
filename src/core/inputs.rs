//! Input file selection
//!
//! Without explicit arguments the working directory is searched for files
//! with a configured extension. Redacted outputs and the pseudonym table
//! are never picked up as inputs.

use crate::config::ScanConfig;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Candidate inputs in `dir`, sorted by name
///
/// # Errors
///
/// Returns an error if the directory cannot be listed.
pub fn discover_inputs(dir: &Path, scan: &ScanConfig, table_name: &str) -> io::Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if is_candidate(&path, scan, table_name) {
            inputs.push(path);
        }
    }

    inputs.sort();
    tracing::debug!(dir = %dir.display(), count = inputs.len(), "Discovered input files");
    Ok(inputs)
}

/// Whether `path` should be processed when searching a directory
pub fn is_candidate(path: &Path, scan: &ScanConfig, table_name: &str) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if name == table_name {
        return false;
    }

    let extension_matches = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| scan.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)));
    if !extension_matches {
        return false;
    }

    !starts_with_ignore_case(name, &scan.output_prefix)
}

/// Drop the canonical pseudonym table from a discovered input list
///
/// The canonical table may be renamed, in which case `discover_inputs` has
/// no way of recognising it by name alone.
pub fn exclude_table(mut files: Vec<PathBuf>, canonical_path: &Path) -> Vec<PathBuf> {
    let canonical = absolute_file(canonical_path);
    files.retain(|file| absolute_file(file) != canonical);
    files
}

/// Pseudonym tables to merge, in reading order
///
/// One `table_name` file per distinct directory holding an input, followed
/// by the canonical table itself so that it is read last and wins
/// conflicts. The canonical table may carry any name and is listed once.
pub fn table_sources(files: &[PathBuf], table_name: &str, canonical_path: &Path) -> Vec<PathBuf> {
    let canonical = absolute_file(canonical_path);
    let mut sources: Vec<PathBuf> = Vec::new();

    for file in files {
        let table = absolute_dir(file).join(table_name);
        if table != canonical && !sources.contains(&table) {
            sources.push(table);
        }
    }
    sources.push(canonical);
    sources
}

fn absolute_file(path: &Path) -> PathBuf {
    match path.file_name() {
        Some(name) => absolute_dir(path).join(name),
        None => path.to_path_buf(),
    }
}

fn absolute_dir(file: &Path) -> PathBuf {
    let dir = match file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    dir.canonicalize().unwrap_or_else(|_| {
        std::env::current_dir()
            .map(|cwd| cwd.join(&dir))
            .unwrap_or(dir)
    })
}

fn starts_with_ignore_case(name: &str, prefix: &str) -> bool {
    name.len() >= prefix.len()
        && name.is_char_boundary(prefix.len())
        && name[..prefix.len()].eq_ignore_ascii_case(prefix)
}
