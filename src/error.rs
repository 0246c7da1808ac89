//! Error types for the anofox-sampen library.

use thiserror::Error;

/// Result type alias for entropy estimation operations.
pub type Result<T> = std::result::Result<T, SampenError>;

/// Errors that can occur during sample entropy estimation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SampenError {
    /// Input series is empty.
    #[error("empty input series")]
    EmptySeries,

    /// Series is too short for the requested template length.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Input file or stream does not match the declared format.
    #[error("invalid input format at line {line}: {message}")]
    InvalidFormat { line: usize, message: String },

    /// Sample entropy is undefined because a pair count is zero.
    ///
    /// This is never silently coerced to zero or infinity; callers that can
    /// tolerate an undefined value should read the `Option` on the result
    /// instead of using the strict accessor.
    #[error("sample entropy undefined: no template matches at one of the lengths")]
    UndefinedEntropy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = SampenError::EmptySeries;
        assert_eq!(err.to_string(), "empty input series");

        let err = SampenError::InsufficientData { needed: 4, got: 2 };
        assert_eq!(err.to_string(), "insufficient data: need at least 4, got 2");

        let err = SampenError::InvalidFormat {
            line: 17,
            message: "expected a number".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid input format at line 17: expected a number"
        );
    }

    #[test]
    fn errors_are_clonable_and_comparable() {
        let err1 = SampenError::UndefinedEntropy;
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }
}
