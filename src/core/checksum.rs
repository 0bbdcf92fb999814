//! Modulus-11 check digit for NHS numbers
//!
//! The first nine digits are weighted 10 down to 2 and summed. The check
//! digit is `11 - (total mod 11)`, with 11 mapped to 0. A result of 10 means
//! no valid number can be formed from those nine digits.

/// Weight applied to the first of the nine payload digits
const FIRST_WEIGHT: u32 = 10;

/// Computes the check digit for nine ASCII digits
///
/// Returns `None` when the input is not nine ASCII digits, or when the
/// check digit would be 10.
///
/// # Examples
///
/// ```
/// use nhsfilter::core::checksum::check_digit;
///
/// assert_eq!(check_digit(b"943476591"), Some(9));
/// assert_eq!(check_digit(b"12345"), None);
/// ```
pub fn check_digit(payload: &[u8]) -> Option<u8> {
    if payload.len() != 9 || !payload.iter().all(u8::is_ascii_digit) {
        return None;
    }

    let total: u32 = payload
        .iter()
        .zip((2..=FIRST_WEIGHT).rev())
        .map(|(digit, weight)| u32::from(digit - b'0') * weight)
        .sum();

    match 11 - total % 11 {
        11 => Some(0),
        10 => None,
        digit => Some(digit as u8),
    }
}

/// Checks whether ten bytes form a valid NHS number
///
/// Anything other than exactly ten ASCII digits is invalid. Never panics.
///
/// # Examples
///
/// ```
/// use nhsfilter::core::checksum::is_valid;
///
/// assert!(is_valid(b"9434765919"));
/// assert!(!is_valid(b"9434765910"));
/// assert!(!is_valid(b"943476591"));
/// ```
pub fn is_valid(candidate: &[u8]) -> bool {
    match candidate {
        [payload @ .., last] if candidate.len() == 10 && last.is_ascii_digit() => {
            check_digit(payload) == Some(last - b'0')
        }
        _ => false,
    }
}

/// String convenience wrapper around [`is_valid`]
pub fn validate(s: &str) -> bool {
    is_valid(s.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("9434765919" ; "published sample")]
    #[test_case("4010232137" ; "sample with check digit 7")]
    #[test_case("0000000000" ; "all zeros")]
    #[test_case("0123456789" ; "leading zero")]
    fn test_valid_numbers(s: &str) {
        assert!(validate(s));
    }

    #[test_case("" ; "empty")]
    #[test_case("943476591" ; "nine digits")]
    #[test_case("94347659190" ; "eleven digits")]
    #[test_case("94347659 9" ; "embedded space")]
    #[test_case("943476591x" ; "letter check digit")]
    #[test_case("ééééé" ; "ten non-digit bytes")]
    fn test_malformed_inputs(s: &str) {
        assert!(!validate(s));
    }

    #[test]
    fn test_every_other_final_digit_is_rejected() {
        let payload = b"943476591";
        for last in b'0'..=b'9' {
            let mut candidate = payload.to_vec();
            candidate.push(last);
            assert_eq!(is_valid(&candidate), last == b'9', "final digit {}", last as char);
        }
    }

    #[test]
    fn test_check_digit_ten_is_never_valid() {
        // 1*10 + 0*9 + ... + 0*3 + 1*2 = 12, 12 % 11 = 1, check digit 10
        assert_eq!(check_digit(b"100000001"), None);
        for last in b'0'..=b'9' {
            let mut candidate = b"100000001".to_vec();
            candidate.push(last);
            assert!(!is_valid(&candidate));
        }
    }

    #[test]
    fn test_remainder_zero_maps_to_zero() {
        assert_eq!(check_digit(b"000000000"), Some(0));
        // 1*9 + 1*2 = 11 -> remainder 0 -> check digit 0
        assert_eq!(check_digit(b"010000001"), Some(0));
    }

    #[test]
    fn test_deterministic() {
        for _ in 0..3 {
            assert!(validate("9434765919"));
        }
    }
}
