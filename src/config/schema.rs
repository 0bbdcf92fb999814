//! Configuration schema types
//!
//! This module defines the configuration structure for nhsfilter. Every
//! section is optional; an empty file yields the same behaviour as running
//! without one.

use crate::core::generator::DEFAULT_MAX_ATTEMPTS;
use crate::core::scanner::TrailingRunPolicy;
use crate::core::store::TABLE_FILE_NAME;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main nhsfilter configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Input selection and scanning
    #[serde(default)]
    pub scan: ScanConfig,

    /// Pseudonym table and generation
    #[serde(default)]
    pub pseudonyms: PseudonymConfig,

    /// HTML highlight reports
    #[serde(default)]
    pub highlight: HighlightConfig,

    /// Audit trail of processed files
    #[serde(default)]
    pub audit: AuditConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl FilterConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.scan.validate()?;
        self.pseudonyms.validate()?;
        self.audit.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Input selection and scanning configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// File extensions picked up when no files are named (case-insensitive, no dot)
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Prefix of redacted output files
    #[serde(default = "default_output_prefix")]
    pub output_prefix: String,

    /// Handling of a digit run still open at end of file
    #[serde(default)]
    pub trailing_run: TrailingRunPolicy,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            output_prefix: default_output_prefix(),
            trailing_run: TrailingRunPolicy::default(),
        }
    }
}

impl ScanConfig {
    fn validate(&self) -> Result<(), String> {
        if self.extensions.is_empty() {
            return Err("scan.extensions cannot be empty".to_string());
        }
        if self
            .extensions
            .iter()
            .any(|e| e.trim().is_empty() || e.starts_with('.'))
        {
            return Err("scan.extensions entries must be non-empty and given without a leading dot".to_string());
        }
        if self.output_prefix.is_empty() {
            return Err("scan.output_prefix cannot be empty".to_string());
        }
        if self.output_prefix.contains(['/', '\\']) {
            return Err(format!(
                "scan.output_prefix '{}' cannot contain path separators",
                self.output_prefix
            ));
        }
        Ok(())
    }
}

/// Pseudonym table and generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PseudonymConfig {
    /// Table file name looked for in each input directory
    #[serde(default = "default_table_name")]
    pub table_name: String,

    /// Where the merged table is saved (defaults to `table_name` in the working directory)
    #[serde(default)]
    pub canonical_path: Option<PathBuf>,

    /// Generate pseudonyms for unmapped numbers without asking
    #[serde(default)]
    pub auto_generate: bool,

    /// Cap on random draws per pseudonym
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
}

impl Default for PseudonymConfig {
    fn default() -> Self {
        Self {
            table_name: default_table_name(),
            canonical_path: None,
            auto_generate: false,
            max_attempts: default_max_attempts(),
        }
    }
}

impl PseudonymConfig {
    fn validate(&self) -> Result<(), String> {
        if self.table_name.trim().is_empty() || self.table_name.contains(['/', '\\']) {
            return Err(format!(
                "pseudonyms.table_name '{}' must be a plain file name",
                self.table_name
            ));
        }
        if self.max_attempts == 0 {
            return Err("pseudonyms.max_attempts must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Path the merged table is written to
    pub fn canonical_table_path(&self) -> PathBuf {
        match &self.canonical_path {
            Some(path) => path.clone(),
            None => std::env::current_dir()
                .map(|dir| dir.join(&self.table_name))
                .unwrap_or_else(|_| PathBuf::from(&self.table_name)),
        }
    }
}

/// HTML highlight report configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HighlightConfig {
    /// Write `<file>.html` next to each input
    #[serde(default)]
    pub enabled: bool,
}

/// Audit trail configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Enable audit logging
    #[serde(default)]
    pub enabled: bool,

    /// Audit log file path
    #[serde(default = "default_audit_log_path")]
    pub log_path: PathBuf,

    /// Use JSON lines instead of plain text
    #[serde(default = "default_audit_json_format")]
    pub json_format: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_path: default_audit_log_path(),
            json_format: default_audit_json_format(),
        }
    }
}

impl AuditConfig {
    fn validate(&self) -> Result<(), String> {
        if self.enabled && self.log_path.as_os_str().is_empty() {
            return Err("audit.log_path cannot be empty when audit is enabled".to_string());
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write JSON logs to rolling files
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_log_path")]
    pub local_path: String,

    /// Rotation: daily, hourly or never
    #[serde(default = "default_log_rotation")]
    pub local_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_log_path(),
            local_rotation: default_log_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when file logging is enabled".to_string());
        }
        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["csv".to_string()]
}

fn default_output_prefix() -> String {
    "ANON_".to_string()
}

fn default_table_name() -> String {
    TABLE_FILE_NAME.to_string()
}

fn default_max_attempts() -> usize {
    DEFAULT_MAX_ATTEMPTS
}

fn default_audit_log_path() -> PathBuf {
    PathBuf::from("./audit/nhsfilter.log")
}

fn default_audit_json_format() -> bool {
    true
}

fn default_log_path() -> String {
    "./logs".to_string()
}

fn default_log_rotation() -> String {
    "daily".to_string()
}
