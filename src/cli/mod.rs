//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for nhsfilter using clap.
//! With no subcommand the tool redacts the named files, or every matching
//! file in the working directory.

pub mod commands;

use clap::{Parser, Subcommand};

/// nhsfilter - replace NHS numbers in files with consistent pseudonyms
#[derive(Parser, Debug)]
#[command(name = "nhsfilter")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (defaults to ./nhsfilter.toml when present)
    #[arg(short, long, env = "NHSFILTER_CONFIG", global = true)]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "NHSFILTER_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub run: commands::run::RunArgs,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check whether values are valid NHS numbers
    Check(commands::check::CheckArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
