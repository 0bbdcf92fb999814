//! Check command implementation
//!
//! Reports whether each argument is a valid NHS number.

use crate::domain::NhsNumber;
use clap::Args;

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Values to check (ten digits each)
    #[arg(required = true, value_name = "NUMBER")]
    pub numbers: Vec<String>,
}

impl CheckArgs {
    /// Execute the check command
    ///
    /// Returns 0 if every value is valid and 1 otherwise.
    pub fn execute(&self) -> anyhow::Result<i32> {
        let mut all_valid = true;
        for value in &self.numbers {
            let (valid, line) = describe(value);
            all_valid &= valid;
            println!("{line}");
        }
        Ok(if all_valid { 0 } else { 1 })
    }
}

fn describe(value: &str) -> (bool, String) {
    match NhsNumber::parse(value) {
        Ok(number) => (true, format!("✅ {number} is a valid NHS number")),
        Err(reason) => (false, format!("❌ {}: {reason}", value.trim())),
    }
}
