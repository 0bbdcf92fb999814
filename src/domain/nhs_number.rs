//! NHS number newtype with validation
//!
//! An [`NhsNumber`] can only be constructed from ten digits that pass the
//! Modulus-11 check, so any value of this type is a valid identifier. The
//! same type is used for real numbers and for pseudonyms.

use crate::core::checksum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of digits in an NHS number
pub const NHS_NUMBER_LEN: usize = 10;

const MAX_VALUE: u64 = 9_999_999_999;

/// Checksum-valid 10-digit NHS number
///
/// Stored as a `u64`; always rendered as exactly ten digits, zero-padded.
///
/// # Examples
///
/// ```
/// use nhsfilter::domain::NhsNumber;
///
/// let number = NhsNumber::parse("9434765919").unwrap();
/// assert_eq!(number.to_string(), "9434765919");
/// assert!(NhsNumber::parse("9434765918").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct NhsNumber(u64);

impl NhsNumber {
    /// Parses a 10-character digit string
    ///
    /// # Returns
    ///
    /// Returns `Ok(NhsNumber)` if the string is ten digits with a valid check digit
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        Self::from_digits(s.as_bytes())
            .ok_or_else(|| format!("'{s}' is not a valid 10-digit NHS number"))
    }

    /// Builds a number from exactly ten ASCII digit bytes, if they validate
    pub fn from_digits(digits: &[u8]) -> Option<Self> {
        if !checksum::is_valid(digits) {
            return None;
        }
        let value = digits
            .iter()
            .fold(0u64, |acc, d| acc * 10 + u64::from(d - b'0'));
        Some(Self(value))
    }

    /// Builds a number from its integer value
    ///
    /// Values below 10^9 are treated as having leading zeros, the way a
    /// spreadsheet would have stored them.
    pub fn from_u64(value: u64) -> Result<Self, String> {
        if value > MAX_VALUE {
            return Err(format!("{value} has more than {NHS_NUMBER_LEN} digits"));
        }
        let candidate = Self(value);
        if checksum::is_valid(&candidate.digits()) {
            Ok(candidate)
        } else {
            Err(format!("{candidate} fails the NHS number check digit"))
        }
    }

    /// Returns the integer value
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Returns the ten ASCII digits, zero-padded
    pub fn digits(&self) -> [u8; NHS_NUMBER_LEN] {
        let mut out = [b'0'; NHS_NUMBER_LEN];
        let mut rest = self.0;
        for slot in out.iter_mut().rev() {
            *slot = b'0' + (rest % 10) as u8;
            rest /= 10;
        }
        out
    }
}

impl fmt::Display for NhsNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:010}", self.0)
    }
}

impl FromStr for NhsNumber {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<u64> for NhsNumber {
    type Error = String;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::from_u64(value)
    }
}

impl From<NhsNumber> for u64 {
    fn from(number: NhsNumber) -> Self {
        number.0
    }
}
