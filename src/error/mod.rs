//! Error definitions
//!
//! This module provides error types for testkit-mock.

use thiserror::Error;

/// Main error type for testkit-mock
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A verification did not hold.
    ///
    /// The message is the full diagnostic, e.g.
    /// `Wanted but not invoked: obj.greeting()`.
    #[error("{0}")]
    Verification(String),

    /// The mock's template declares no method with this name.
    #[error("{label} has no method named `{method}`")]
    UnknownMethod {
        /// Receiver label of the mock.
        label: String,
        /// The requested method name.
        method: String,
    },
}

impl Error {
    /// Create a verification failure carrying a diagnostic message.
    #[must_use]
    pub fn verification(message: impl Into<String>) -> Self {
        Self::Verification(message.into())
    }

    /// Create an unknown-method error.
    #[must_use]
    pub fn unknown_method(label: impl Into<String>, method: impl Into<String>) -> Self {
        Self::UnknownMethod {
            label: label.into(),
            method: method.into(),
        }
    }

    /// The diagnostic text if this is a verification failure.
    #[must_use]
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Self::Verification(message) => Some(message),
            Self::UnknownMethod { .. } => None,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_displays_message_verbatim() {
        let err = Error::verification("Wanted but not invoked: obj.greeting()");
        assert_eq!(err.to_string(), "Wanted but not invoked: obj.greeting()");
        assert_eq!(
            err.diagnostic(),
            Some("Wanted but not invoked: obj.greeting()")
        );
    }

    #[test]
    fn test_unknown_method_display() {
        let err = Error::unknown_method("obj", "missing");
        assert_eq!(err.to_string(), "obj has no method named `missing`");
        assert!(err.diagnostic().is_none());
    }
}
