//! Domain types for nhsfilter.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **A validated identifier type** ([`NhsNumber`]), used for both real
//!   NHS numbers and their pseudonyms
//! - **Error types** ([`FilterError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! An [`NhsNumber`] can only be built from digits that pass the Modulus-11
//! check, so every value flowing through the pipeline is already validated:
//!
//! ```rust
//! use nhsfilter::domain::NhsNumber;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let real = NhsNumber::parse("9434765919")?;
//! assert_eq!(real.to_string(), "9434765919");
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod nhs_number;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::FilterError;
pub use nhs_number::{NhsNumber, NHS_NUMBER_LEN};
pub use result::Result;
