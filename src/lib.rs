// nhsfilter - NHS number pseudonymisation tool
// Copyright (c) 2025 nhsfilter Contributors
// Licensed under the MIT License

//! # nhsfilter - NHS number pseudonymisation
//!
//! nhsfilter finds NHS numbers in text files and writes redacted copies in
//! which each number is replaced by a pseudonym. Pseudonyms are themselves
//! checksum-valid NHS numbers and stay the same across runs because the
//! mapping is kept in a `pseudonyms.csv` table.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Scanning, pseudonym resolution and rewriting
//! - [`report`] - Run summaries, HTML highlights and the audit trail
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nhsfilter::config::FilterConfig;
//! use nhsfilter::core::gate::PreApprovedGate;
//! use nhsfilter::core::pipeline::Pipeline;
//! use std::path::PathBuf;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut pipeline = Pipeline::new(FilterConfig::default(), Box::new(PreApprovedGate))?;
//!     let summary = pipeline.run(&[PathBuf::from("visits.csv")])?;
//!
//!     println!("Replaced {} NHS numbers", summary.total_occurrences());
//!     Ok(())
//! }
//! ```
//!
//! ## What counts as an NHS number
//!
//! A run of exactly ten ASCII digits with no digit immediately before or
//! after it, whose last digit is the Modulus-11 check digit of the first
//! nine. Longer runs are never split up.
//!
//! ```rust
//! use nhsfilter::core::scanner::{scan_bytes, TrailingRunPolicy};
//!
//! let found = scan_bytes(b"id=9434765919;phone=094347659190", TrailingRunPolicy::Boundary);
//! assert_eq!(found.len(), 1);
//! assert_eq!(found[0].offset, 3);
//! ```
//!
//! ## Error Handling
//!
//! The library uses [`domain::FilterError`]; the binary wraps it in
//! `anyhow` and maps it to an exit code.

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
pub mod report;
