//! Init command implementation
//!
//! Writes a commented sample configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "nhsfilter.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        match fs::write(&self.output, Self::sample_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Run nhsfilter in the directory holding your files");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(5)
            }
        }
    }

    fn sample_config() -> &'static str {
        r#"# nhsfilter configuration
# Every setting is optional; the values below are the defaults.
# Any setting can be overridden with NHSFILTER_<SECTION>_<KEY>.

[application]
log_level = "info"  # trace | debug | info | warn | error

[scan]
# Extensions picked up when no files are named on the command line
extensions = ["csv"]
# Redacted copies are written next to the input as <prefix><name>
output_prefix = "ANON_"
# A ten-digit run that ends the file: "boundary" treats it like any
# other run, "ignore" never reports it
trailing_run = "boundary"

[pseudonyms]
# Read from every input directory and merged
table_name = "pseudonyms.csv"
# Where the merged table is saved (defaults to the working directory)
# canonical_path = "/secure/pseudonyms.csv"
# Generate pseudonyms for new numbers without asking
auto_generate = false
max_attempts = 1000

[highlight]
# Write <file>.html marking each replaced number
enabled = false

[audit]
enabled = false
log_path = "./audit/nhsfilter.log"
json_format = true

[logging]
local_enabled = false
local_path = "./logs"
local_rotation = "daily"  # daily | hourly | never
"#
    }
}
