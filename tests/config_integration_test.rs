//! Integration tests for configuration loading and validation
//!
//! Tests that set environment variables hold ENV_MUTEX so that they do not
//! interfere with each other.

use nhsfilter::config::{load_config, load_config_or_default};
use nhsfilter::core::scanner::TrailingRunPolicy;
use nhsfilter::domain::FilterError;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;

static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn cleanup_env_vars() {
    std::env::remove_var("NHSFILTER_SCAN_OUTPUT_PREFIX");
    std::env::remove_var("NHSFILTER_PSEUDONYMS_AUTO_GENERATE");
    std::env::remove_var("NHSFILTER_SCAN_TRAILING_RUN");
    std::env::remove_var("TEST_NHSFILTER_TABLE_DIR");
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
[application]
log_level = "debug"

[scan]
extensions = ["csv", "txt"]
output_prefix = "MASKED_"
trailing_run = "ignore"

[pseudonyms]
table_name = "mapping.csv"
canonical_path = "/secure/mapping.csv"
auto_generate = true
max_attempts = 250

[highlight]
enabled = true

[audit]
enabled = true
log_path = "/var/log/nhsfilter/audit.log"
json_format = false

[logging]
local_enabled = false
local_path = "/var/log/nhsfilter"
local_rotation = "hourly"
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.application.log_level, "debug");
    assert_eq!(config.scan.extensions, vec!["csv", "txt"]);
    assert_eq!(config.scan.output_prefix, "MASKED_");
    assert_eq!(config.scan.trailing_run, TrailingRunPolicy::Ignore);
    assert_eq!(config.pseudonyms.table_name, "mapping.csv");
    assert_eq!(
        config.pseudonyms.canonical_table_path(),
        PathBuf::from("/secure/mapping.csv")
    );
    assert!(config.pseudonyms.auto_generate);
    assert_eq!(config.pseudonyms.max_attempts, 250);
    assert!(config.highlight.enabled);
    assert!(config.audit.enabled);
    assert!(!config.audit.json_format);
    assert_eq!(config.logging.local_rotation, "hourly");
}

#[test]
fn test_env_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("TEST_NHSFILTER_TABLE_DIR", "/srv/tables");

    let file = write_config(
        r#"
[pseudonyms]
canonical_path = "${TEST_NHSFILTER_TABLE_DIR}/pseudonyms.csv"
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(
        config.pseudonyms.canonical_path,
        Some(PathBuf::from("/srv/tables/pseudonyms.csv"))
    );

    cleanup_env_vars();
}

#[test]
fn test_missing_env_var_is_configuration_error() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
[pseudonyms]
canonical_path = "${TEST_NHSFILTER_TABLE_DIR}/pseudonyms.csv"
"#,
    );

    let err = load_config(file.path()).unwrap_err();
    assert!(matches!(err, FilterError::Configuration(_)));
    assert!(err.to_string().contains("TEST_NHSFILTER_TABLE_DIR"));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_env_overrides_file_values() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("NHSFILTER_SCAN_OUTPUT_PREFIX", "REDACTED_");
    std::env::set_var("NHSFILTER_PSEUDONYMS_AUTO_GENERATE", "true");

    let file = write_config(
        r#"
[scan]
output_prefix = "MASKED_"
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.scan.output_prefix, "REDACTED_");
    assert!(config.pseudonyms.auto_generate);

    cleanup_env_vars();
}

#[test]
fn test_invalid_override_value() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("NHSFILTER_SCAN_TRAILING_RUN", "sometimes");

    let file = write_config("");
    let result = load_config(file.path());

    cleanup_env_vars();
    assert!(matches!(result, Err(FilterError::Configuration(_))));
}

#[test]
fn test_validation_rejects_bad_values() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
[scan]
output_prefix = "../out"
"#,
    );

    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("output_prefix"));
}

#[test]
fn test_explicit_path_must_exist() {
    let result = load_config_or_default(Some(Path::new("/nonexistent/nhsfilter.toml")));
    assert!(matches!(result, Err(FilterError::Configuration(_))));
}
