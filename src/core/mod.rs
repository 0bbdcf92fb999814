//! Core business logic for nhsfilter.
//!
//! # Modules
//!
//! - [`checksum`] - Modulus-11 check digit
//! - [`scanner`] - Finds NHS numbers in raw bytes
//! - [`generator`] - Random checksum-valid pseudonyms
//! - [`gate`] - Permission to generate new pseudonyms
//! - [`store`] - Persisted real-to-pseudonym table
//! - [`rewriter`] - Writes the redacted copy of a file
//! - [`inputs`] - Picks the files to process
//! - [`pipeline`] - Runs all of the above over a list of files
//!
//! # Workflow
//!
//! 1. **Load**: merge `pseudonyms.csv` from every input directory
//! 2. **Scan**: find isolated 10-digit runs that pass the checksum
//! 3. **Resolve**: look up or generate a pseudonym for each number
//! 4. **Rewrite**: write `ANON_<file>` with the numbers replaced
//! 5. **Save**: write the merged table back
//!
//! # Example
//!
//! ```rust,no_run
//! use nhsfilter::config::load_config_or_default;
//! use nhsfilter::core::gate::ConsoleGate;
//! use nhsfilter::core::pipeline::Pipeline;
//! use std::path::PathBuf;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config_or_default(None)?;
//! let mut pipeline = Pipeline::new(config, Box::new(ConsoleGate::stdio()))?;
//! let summary = pipeline.run(&[PathBuf::from("visits.csv")])?;
//! println!("Replaced: {}", summary.total_occurrences());
//! # Ok(())
//! # }
//! ```

pub mod checksum;
pub mod gate;
pub mod generator;
pub mod inputs;
pub mod pipeline;
pub mod rewriter;
pub mod scanner;
pub mod store;
