//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::FilterConfig;
use crate::core::scanner::TrailingRunPolicy;
use crate::domain::errors::FilterError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// File looked for in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "nhsfilter.toml";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into FilterConfig
/// 4. Applies environment variable overrides (NHSFILTER_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`FilterError::Configuration`] if the file is missing or
/// unreadable, a referenced variable is unset, the TOML is malformed, or
/// validation fails.
///
/// # Examples
///
/// ```no_run
/// use nhsfilter::config::loader::load_config;
///
/// let config = load_config("nhsfilter.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<FilterConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(FilterError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        FilterError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let config: FilterConfig = toml::from_str(&contents)
        .map_err(|e| FilterError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    finish(config)
}

/// Loads the configuration for a run
///
/// An explicit path must exist. Without one, [`DEFAULT_CONFIG_FILE`] is read
/// if present and built-in defaults are used otherwise. Environment
/// overrides apply in every case.
pub fn load_config_or_default(path: Option<&Path>) -> Result<FilterConfig> {
    if let Some(path) = path {
        return load_config(path);
    }

    let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
    if default_path.exists() {
        return load_config(default_path);
    }

    tracing::debug!("No configuration file found, using defaults");
    finish(FilterConfig::default())
}

fn finish(mut config: FilterConfig) -> Result<FilterConfig> {
    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        FilterError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left alone.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| FilterError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = re.replace_all(line, |cap: &regex::Captures<'_>| {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    String::new()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(FilterError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the NHSFILTER_* prefix
///
/// Variables follow the pattern NHSFILTER_<SECTION>_<KEY>, for example
/// NHSFILTER_SCAN_OUTPUT_PREFIX or NHSFILTER_PSEUDONYMS_AUTO_GENERATE.
fn apply_env_overrides(config: &mut FilterConfig) -> Result<()> {
    apply_overrides(config, |key| std::env::var(key).ok())
}

fn apply_overrides<F>(config: &mut FilterConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup("NHSFILTER_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    if let Some(val) = lookup("NHSFILTER_SCAN_EXTENSIONS") {
        config.scan.extensions = val
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }
    if let Some(val) = lookup("NHSFILTER_SCAN_OUTPUT_PREFIX") {
        config.scan.output_prefix = val;
    }
    if let Some(val) = lookup("NHSFILTER_SCAN_TRAILING_RUN") {
        config.scan.trailing_run = val
            .parse::<TrailingRunPolicy>()
            .map_err(|e| override_error("NHSFILTER_SCAN_TRAILING_RUN", &e))?;
    }

    if let Some(val) = lookup("NHSFILTER_PSEUDONYMS_TABLE_NAME") {
        config.pseudonyms.table_name = val;
    }
    if let Some(val) = lookup("NHSFILTER_PSEUDONYMS_CANONICAL_PATH") {
        config.pseudonyms.canonical_path = Some(PathBuf::from(val));
    }
    if let Some(val) = lookup("NHSFILTER_PSEUDONYMS_AUTO_GENERATE") {
        config.pseudonyms.auto_generate = parse_bool("NHSFILTER_PSEUDONYMS_AUTO_GENERATE", &val)?;
    }
    if let Some(val) = lookup("NHSFILTER_PSEUDONYMS_MAX_ATTEMPTS") {
        config.pseudonyms.max_attempts = val
            .parse()
            .map_err(|e| override_error("NHSFILTER_PSEUDONYMS_MAX_ATTEMPTS", &e))?;
    }

    if let Some(val) = lookup("NHSFILTER_HIGHLIGHT_ENABLED") {
        config.highlight.enabled = parse_bool("NHSFILTER_HIGHLIGHT_ENABLED", &val)?;
    }

    if let Some(val) = lookup("NHSFILTER_AUDIT_ENABLED") {
        config.audit.enabled = parse_bool("NHSFILTER_AUDIT_ENABLED", &val)?;
    }
    if let Some(val) = lookup("NHSFILTER_AUDIT_LOG_PATH") {
        config.audit.log_path = PathBuf::from(val);
    }

    if let Some(val) = lookup("NHSFILTER_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_bool("NHSFILTER_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Some(val) = lookup("NHSFILTER_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    value
        .trim()
        .parse::<bool>()
        .map_err(|e| override_error(key, &e))
}

fn override_error(key: &str, err: &dyn std::fmt::Display) -> FilterError {
    FilterError::Configuration(format!("Invalid value in {key}: {err}"))
}
