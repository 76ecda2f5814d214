//! Per-mock configuration.

use crate::value::Value;

/// Configuration for a single mock.
///
/// # Example
///
/// ```rust
/// use testkit_mock::{MockSettings, Value};
///
/// let settings = MockSettings::new()
///     .with_label("repo")
///     .with_default_return(Value::Null);
///
/// assert_eq!(settings.label(), "repo");
/// assert_eq!(settings.default_return(), &Value::Null);
/// ```
#[derive(Clone, Debug)]
pub struct MockSettings {
    label: String,
    default_return: Value,
}

impl MockSettings {
    /// Default settings: label `obj`, unmatched calls return `Undefined`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            label: "obj".to_string(),
            default_return: Value::Undefined,
        }
    }

    /// Set the receiver label used in diagnostics.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the value returned when no stub rule matches a call.
    #[must_use]
    pub fn with_default_return(mut self, value: impl Into<Value>) -> Self {
        self.default_return = value.into();
        self
    }

    /// The receiver label used in diagnostics.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The value returned for unmatched calls.
    #[must_use]
    pub fn default_return(&self) -> &Value {
        &self.default_return
    }
}

impl Default for MockSettings {
    fn default() -> Self {
        Self::new()
    }
}
