//! Configuration management for nhsfilter.
//!
//! nhsfilter reads an optional TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `NHSFILTER_<SECTION>_<KEY>` overrides
//! - Default values for every setting
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use nhsfilter::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("nhsfilter.toml")?;
//! println!("Output prefix: {}", config.scan.output_prefix);
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [scan]
//! extensions = ["csv"]
//! output_prefix = "ANON_"
//! trailing_run = "boundary"
//!
//! [pseudonyms]
//! table_name = "pseudonyms.csv"
//! auto_generate = false
//!
//! [highlight]
//! enabled = false
//!
//! [audit]
//! enabled = true
//! log_path = "./audit/nhsfilter.log"
//! ```

pub mod loader;
pub mod schema;

pub use loader::{load_config, load_config_or_default, DEFAULT_CONFIG_FILE};
pub use schema::{
    ApplicationConfig, AuditConfig, FilterConfig, HighlightConfig, LoggingConfig, PseudonymConfig,
    ScanConfig,
};
