// nhsfilter - NHS number pseudonymisation tool
// Copyright (c) 2025 nhsfilter Contributors
// Licensed under the MIT License

use clap::Parser;
use nhsfilter::cli::{Cli, Commands};
use nhsfilter::config::{load_config_or_default, FilterConfig};
use nhsfilter::domain::FilterError;
use nhsfilter::log_error_with_context;
use nhsfilter::logging::init_logging;
use std::path::Path;
use std::process;

fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    process::exit(run(&cli));
}

/// Run the CLI and return the process exit code
///
/// The logging guard lives inside this function so that file logs are
/// flushed before the process exits.
fn run(cli: &Cli) -> i32 {
    let config = match load_config_or_default(cli.config.as_deref().map(Path::new)) {
        Ok(config) => config,
        // Only a redaction run needs a usable configuration
        Err(_) if cli.command.is_some() => FilterConfig::default(),
        Err(e) => {
            eprintln!("Error: {e}");
            return e.exit_code();
        }
    };

    let log_level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.application.log_level.clone());

    let _guard = match init_logging(&log_level, &config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return e.exit_code();
        }
    };

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "nhsfilter starting");

    let result = match &cli.command {
        Some(Commands::Check(args)) => args.execute(),
        Some(Commands::Init(args)) => args.execute(),
        None => cli.run.execute(config),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            log_error_with_context!(format!("{e:#}"), "Command execution failed");
            eprintln!("Error: {e:#}");
            e.downcast_ref::<FilterError>()
                .map_or(5, FilterError::exit_code)
        }
    }
}
