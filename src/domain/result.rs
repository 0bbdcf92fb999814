//! Result type alias for nhsfilter
//!
//! This module provides a convenient Result type alias that uses FilterError
//! as the error type.

use super::errors::FilterError;

/// Result type alias for nhsfilter operations
///
/// # Examples
///
/// ```
/// use nhsfilter::domain::result::Result;
/// use nhsfilter::domain::errors::FilterError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(FilterError::Other("bad input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, FilterError>;
