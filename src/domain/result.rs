//! Result type alias for nmdose

use super::errors::NmdoseError;

/// Result type alias for nmdose operations
///
/// # Examples
///
/// ```
/// use nmdose::domain::result::Result;
/// use nmdose::domain::errors::NmdoseError;
///
/// fn failing_function() -> Result<()> {
///     Err(NmdoseError::Validation("Invalid input".to_string()))
/// }
///
/// assert!(failing_function().is_err());
/// ```
pub type Result<T> = std::result::Result<T, NmdoseError>;
