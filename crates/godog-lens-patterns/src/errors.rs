//! Error types raised while validating run-pattern templates.

use thiserror::Error;

/// Problems found in a `testPatternFormat` template.
///
/// Rendering never fails; these errors are reported by
/// [`validate_template`](crate::validate_template) so callers can warn about
/// a template that will not substitute the way its author expects.
///
/// # Examples
/// ```
/// use godog_lens_patterns::{PatternError, validate_template};
///
/// let err = validate_template("/${featureName").unwrap_err();
/// assert_eq!(err, PatternError::UnterminatedPlaceholder { position: 1 });
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// A `${` opener has no closing brace.
    #[error("unterminated placeholder at byte {position} (zero-based)")]
    UnterminatedPlaceholder {
        /// Byte offset of the `$` that opens the placeholder.
        position: usize,
    },
    /// A placeholder names a variable the formatter does not know about.
    #[error("unknown placeholder `{name}` at byte {position} (zero-based)")]
    UnknownPlaceholder {
        /// The text between the braces.
        name: String,
        /// Byte offset of the `$` that opens the placeholder.
        position: usize,
    },
}
