//! Default command: redact files
//!
//! Runs when no subcommand is given. Named files are processed in the
//! order given; without names the working directory is searched.

use crate::config::FilterConfig;
use crate::core::gate::{ConsoleGate, GenerationGate, PreApprovedGate};
use crate::core::inputs::{discover_inputs, exclude_table};
use crate::core::pipeline::Pipeline;
use crate::core::scanner::TrailingRunPolicy;
use clap::Args;
use std::path::PathBuf;

/// Arguments for a redaction run
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Files to redact (defaults to matching files in the current directory)
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Generate pseudonyms for unmapped numbers without asking
    #[arg(short, long)]
    pub yes: bool,

    /// Also write an HTML highlight report per file
    #[arg(long)]
    pub highlight: bool,

    /// Handling of a digit run open at end of file (boundary, ignore)
    #[arg(long, value_name = "POLICY")]
    pub trailing_run: Option<String>,
}

impl RunArgs {
    /// Execute a run with the loaded configuration
    ///
    /// Returns 0 when every file was redacted and 1 when some were skipped.
    /// Pipeline errors are returned for the caller to map to an exit code.
    pub fn execute(&self, mut config: FilterConfig) -> anyhow::Result<i32> {
        if self.highlight {
            config.highlight.enabled = true;
        }
        if let Some(policy) = &self.trailing_run {
            match policy.parse::<TrailingRunPolicy>() {
                Ok(policy) => config.scan.trailing_run = policy,
                Err(e) => {
                    eprintln!("❌ {e}");
                    return Ok(2);
                }
            }
        }

        let files = if self.files.is_empty() {
            let cwd = std::env::current_dir()?;
            let found = discover_inputs(&cwd, &config.scan, &config.pseudonyms.table_name)?;
            exclude_table(found, &config.pseudonyms.canonical_table_path())
        } else {
            self.files.clone()
        };

        if files.is_empty() {
            println!("No input files found");
            return Ok(0);
        }

        let gate: Box<dyn GenerationGate> = if self.yes || config.pseudonyms.auto_generate {
            Box::new(PreApprovedGate)
        } else {
            Box::new(ConsoleGate::stdio())
        };

        let mut pipeline = Pipeline::new(config, gate)?;
        let summary = pipeline.run(&files)?;

        println!("{}", summary.format_console());

        Ok(if summary.is_successful() { 0 } else { 1 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn config_in(dir: &std::path::Path) -> FilterConfig {
        let mut config = FilterConfig::default();
        config.pseudonyms.canonical_path = Some(dir.join("pseudonyms.csv"));
        config
    }

    #[test]
    fn test_invalid_trailing_run_is_configuration_exit() {
        let args = RunArgs {
            files: vec![PathBuf::from("unused.csv")],
            trailing_run: Some("sometimes".to_string()),
            ..RunArgs::default()
        };
        assert_eq!(args.execute(FilterConfig::default()).unwrap(), 2);
    }

    #[test]
    fn test_named_files_exit_codes() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.csv");
        fs::write(&good, "9434765919\n").unwrap();

        let args = RunArgs {
            files: vec![good.clone()],
            yes: true,
            ..RunArgs::default()
        };
        assert_eq!(args.execute(config_in(dir.path())).unwrap(), 0);
        assert!(dir.path().join("ANON_good.csv").exists());

        let args = RunArgs {
            files: vec![good, dir.path().join("missing.csv")],
            yes: true,
            ..RunArgs::default()
        };
        assert_eq!(args.execute(config_in(dir.path())).unwrap(), 1);
    }

    #[test]
    fn test_highlight_flag_enables_report() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("a.csv");
        fs::write(&input, "9434765919").unwrap();

        let args = RunArgs {
            files: vec![input],
            yes: true,
            highlight: true,
            ..RunArgs::default()
        };
        args.execute(config_in(dir.path())).unwrap();
        assert!(dir.path().join("a.csv.html").exists());
    }
}
