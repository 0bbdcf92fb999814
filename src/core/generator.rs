//! Pseudonym generation
//!
//! Pseudonyms are random NHS numbers: nine random digits (the first never
//! zero) followed by their Modulus-11 check digit. Draws whose check digit
//! would be 10 are thrown away and redrawn.

use crate::core::checksum::check_digit;
use crate::domain::{FilterError, NhsNumber, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Default cap on draws per pseudonym
pub const DEFAULT_MAX_ATTEMPTS: usize = 1000;

/// Random generator of checksum-valid pseudonyms
///
/// Generic over the random source so tests can use a seeded [`StdRng`].
///
/// # Examples
///
/// ```
/// use nhsfilter::core::generator::PseudonymGenerator;
/// use nhsfilter::core::checksum::validate;
///
/// let mut generator = PseudonymGenerator::new();
/// let pseudonym = generator.generate(|_| false).unwrap();
/// assert!(validate(&pseudonym.to_string()));
/// ```
pub struct PseudonymGenerator<R: Rng = StdRng> {
    rng: R,
    max_attempts: usize,
}

impl PseudonymGenerator<StdRng> {
    /// Create a generator seeded from OS entropy
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create a reproducible generator
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> PseudonymGenerator<R> {
    /// Create a generator around an existing random source
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Set the cap on draws per call to [`generate`](Self::generate)
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Draw a fresh pseudonym that `is_taken` does not reject
    ///
    /// Every draw counts towards the cap, including those discarded because
    /// the check digit came out as 10.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::GenerationExhausted`] if no acceptable
    /// candidate turns up within the cap.
    pub fn generate<F>(&mut self, is_taken: F) -> Result<NhsNumber>
    where
        F: Fn(NhsNumber) -> bool,
    {
        for attempt in 1..=self.max_attempts {
            let mut digits = [0u8; 10];
            digits[0] = b'0' + self.rng.gen_range(1..=9u8);
            for slot in &mut digits[1..9] {
                *slot = b'0' + self.rng.gen_range(0..=9u8);
            }

            let Some(check) = check_digit(&digits[..9]) else {
                tracing::trace!(attempt, "Discarding draw with check digit 10");
                continue;
            };
            digits[9] = b'0' + check;

            let Some(candidate) = NhsNumber::from_digits(&digits) else {
                continue;
            };
            if is_taken(candidate) {
                tracing::debug!(attempt, "Discarding pseudonym already in use");
                continue;
            }
            return Ok(candidate);
        }

        Err(FilterError::GenerationExhausted {
            attempts: self.max_attempts,
        })
    }
}

impl Default for PseudonymGenerator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::checksum::is_valid;
    use std::cell::{Cell, RefCell};
    use std::collections::HashSet;

    #[test]
    fn test_generated_pseudonyms_validate() {
        let mut generator = PseudonymGenerator::seeded(7);
        for _ in 0..500 {
            let pseudonym = generator.generate(|_| false).unwrap();
            let digits = pseudonym.digits();
            assert!(is_valid(&digits));
            assert_ne!(digits[0], b'0');
            assert_eq!(pseudonym.to_string().len(), 10);
        }
    }

    #[test]
    fn test_seeded_generators_are_reproducible() {
        let mut first = PseudonymGenerator::seeded(42);
        let mut second = PseudonymGenerator::seeded(42);

        for _ in 0..20 {
            assert_eq!(
                first.generate(|_| false).unwrap(),
                second.generate(|_| false).unwrap()
            );
        }
    }

    #[test]
    fn test_taken_candidates_are_skipped() {
        let mut lookahead = PseudonymGenerator::seeded(99);
        let first = lookahead.generate(|_| false).unwrap();

        let mut generator = PseudonymGenerator::seeded(99);
        let next = generator.generate(|n| n == first).unwrap();
        assert_ne!(next, first);
    }

    #[test]
    fn test_exhaustion_is_an_error() {
        let mut generator = PseudonymGenerator::seeded(1).with_max_attempts(5);
        let result = generator.generate(|_| true);
        assert!(matches!(
            result,
            Err(FilterError::GenerationExhausted { attempts: 5 })
        ));
    }

    #[test]
    fn test_zero_attempt_cap_is_clamped_to_one_draw() {
        let calls = Cell::new(0);
        let mut generator = PseudonymGenerator::seeded(3).with_max_attempts(0);
        let result = generator.generate(|_| {
            calls.set(calls.get() + 1);
            true
        });

        assert!(matches!(
            result,
            Err(FilterError::GenerationExhausted { attempts: 1 })
        ));
        // The one draw is offered to the predicate unless its check digit was 10
        assert!(calls.get() <= 1);

        let mut clamped = PseudonymGenerator::seeded(3).with_max_attempts(0);
        let mut single = PseudonymGenerator::seeded(3).with_max_attempts(1);
        assert_eq!(
            clamped.generate(|_| false).ok(),
            single.generate(|_| false).ok()
        );
    }

    #[test]
    fn test_no_duplicates_when_tracking_issued() {
        let issued = RefCell::new(HashSet::new());
        let mut generator = PseudonymGenerator::seeded(2024);

        for _ in 0..200 {
            let pseudonym = generator
                .generate(|n| issued.borrow().contains(&n))
                .unwrap();
            assert!(issued.borrow_mut().insert(pseudonym));
        }
    }
}
