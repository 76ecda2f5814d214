// Allow must_use_candidate for matcher factory functions since returning the matcher
// without using it is the common pattern for test setup
#![allow(clippy::must_use_candidate)]

//! Argument matchers for stubbing and verification.
//!
//! - [`Matcher`] trait for custom matchers
//! - [`ArgMatcher`], the shared handle every expectation stores
//! - [`IntoMatcher`], which turns plain values into [`equal_to`] matchers
//! - Built-in matchers: [`equal_to`], [`anything`], [`less_than`], [`same_as`], ...
//! - Combinators: [`all_of`], [`any_of`], [`not`]
//!
//! # Example
//!
//! ```rust
//! use testkit_mock::matcher::{anything, less_than, not, IntoMatcher, Matcher};
//! use testkit_mock::Value;
//!
//! let m = less_than(10);
//! assert!(m.matches(&Value::from(9)));
//! assert_eq!(m.describe(), "less than 10");
//!
//! // Plain values become equality matchers
//! let m = "hunter".into_matcher();
//! assert_eq!(m.describe(), "equal to \"hunter\"");
//!
//! assert!(anything().matches(&Value::Undefined));
//! assert!(!not(anything()).matches(&Value::Null));
//! ```

mod builtin;

use std::fmt;
use std::sync::Arc;

pub use builtin::{
    all_of, any_of, anything, equal_to, greater_than, instance_of, less_than, nil, not, same_as,
    satisfies,
};

use crate::mock::Mock;
use crate::value::{Object, Value};

/// A predicate over a single [`Value`] plus a description of what it expects.
///
/// Matchers must be pure: evaluating one never changes any state.
///
/// # Implementing Custom Matchers
///
/// ```rust
/// use testkit_mock::matcher::{ArgMatcher, Matcher};
/// use testkit_mock::Value;
///
/// struct IsEven;
///
/// impl Matcher for IsEven {
///     fn matches(&self, value: &Value) -> bool {
///         value.as_f64().is_some_and(|n| n % 2.0 == 0.0)
///     }
///
///     fn describe(&self) -> String {
///         "even".to_string()
///     }
/// }
///
/// let m = ArgMatcher::new(IsEven);
/// assert!(m.matches(&Value::from(4)));
/// assert!(!m.matches(&Value::from(3)));
/// ```
pub trait Matcher: Send + Sync {
    /// Check if the value matches.
    fn matches(&self, value: &Value) -> bool;

    /// Describe what this matcher expects.
    fn describe(&self) -> String;

    /// Describe why a value didn't match.
    fn describe_mismatch(&self, value: &Value) -> String {
        format!("was {}", value.literal())
    }
}

/// A shared, cheaply clonable matcher.
#[derive(Clone)]
pub struct ArgMatcher(Arc<dyn Matcher>);

impl ArgMatcher {
    /// Wrap a matcher implementation.
    pub fn new(matcher: impl Matcher + 'static) -> Self {
        Self(Arc::new(matcher))
    }
}

impl Matcher for ArgMatcher {
    fn matches(&self, value: &Value) -> bool {
        self.0.matches(value)
    }

    fn describe(&self) -> String {
        self.0.describe()
    }

    fn describe_mismatch(&self, value: &Value) -> String {
        self.0.describe_mismatch(value)
    }
}

impl fmt::Debug for ArgMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.describe())
    }
}

/// Conversion into an [`ArgMatcher`].
///
/// Matchers convert to themselves; anything that is a [`Value`] is wrapped
/// in [`equal_to`].
pub trait IntoMatcher {
    /// Perform the conversion.
    fn into_matcher(self) -> ArgMatcher;
}

impl IntoMatcher for ArgMatcher {
    fn into_matcher(self) -> ArgMatcher {
        self
    }
}

impl IntoMatcher for &ArgMatcher {
    fn into_matcher(self) -> ArgMatcher {
        self.clone()
    }
}

macro_rules! impl_into_matcher_for_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl IntoMatcher for $t {
                fn into_matcher(self) -> ArgMatcher {
                    equal_to(self)
                }
            }
        )*
    };
}

impl_into_matcher_for_value!(
    Value, &Value, Object, Mock, &Mock, &str, String, bool, i8, i16, i32, i64, u8, u16, u32, u64,
    usize, isize, f32, f64,
);

impl<T: Into<Value>> IntoMatcher for Vec<T> {
    fn into_matcher(self) -> ArgMatcher {
        equal_to(self)
    }
}

/// Build a `Vec<ArgMatcher>`, coercing plain values to equality matchers.
///
/// ```rust
/// use testkit_mock::matcher::{less_than, Matcher};
/// use testkit_mock::matchers;
///
/// let expected = matchers!["hunter", less_than(100)];
/// assert_eq!(expected.len(), 2);
/// assert_eq!(expected[0].describe(), "equal to \"hunter\"");
/// ```
#[macro_export]
macro_rules! matchers {
    () => {
        ::std::vec::Vec::<$crate::matcher::ArgMatcher>::new()
    };
    ($($m:expr),+ $(,)?) => {
        ::std::vec![$($crate::matcher::IntoMatcher::into_matcher($m)),+]
    };
}

/// Build a `Vec<Value>` of call arguments.
///
/// ```rust
/// use testkit_mock::{args, Value};
///
/// let a = args!["hello", Value::Undefined, 5];
/// assert_eq!(a.len(), 3);
/// assert!(a[1].is_undefined());
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($v:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($v)),+]
    };
}

/// Assert that a value matches a matcher.
///
/// # Panics
///
/// Panics with a descriptive message if the value doesn't match.
///
/// # Example
///
/// ```rust
/// use testkit_mock::{assert_that, matcher::less_than, Value};
///
/// assert_that!(Value::from(42), less_than(100));
/// assert_that!(Value::from("stub result"), "stub result");
/// ```
#[macro_export]
macro_rules! assert_that {
    ($value:expr, $matcher:expr) => {{
        let value: &$crate::Value = &$value;
        let matcher = $crate::matcher::IntoMatcher::into_matcher($matcher);
        if !$crate::matcher::Matcher::matches(&matcher, value) {
            panic!(
                "assertion failed: {}\n  expected: {}\n  got: {:?}",
                $crate::matcher::Matcher::describe_mismatch(&matcher, value),
                $crate::matcher::Matcher::describe(&matcher),
                value
            );
        }
    }};
    ($value:expr, $matcher:expr, $($arg:tt)+) => {{
        let value: &$crate::Value = &$value;
        let matcher = $crate::matcher::IntoMatcher::into_matcher($matcher);
        if !$crate::matcher::Matcher::matches(&matcher, value) {
            panic!(
                "assertion failed: {}\n  expected: {}\n  got: {:?}\n  message: {}",
                $crate::matcher::Matcher::describe_mismatch(&matcher, value),
                $crate::matcher::Matcher::describe(&matcher),
                value,
                format_args!($($arg)+)
            );
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_coerce_to_equal_to() {
        assert_eq!("hunter".into_matcher().describe(), "equal to \"hunter\"");
        assert_eq!(67_i32.into_matcher().describe(), "equal to 67");
        assert_eq!(Value::Undefined.into_matcher().describe(), "equal to undefined");
        assert!(67_i32.into_matcher().matches(&Value::from(67.0)));
        assert!(!67_i32.into_matcher().matches(&Value::from("67")));
    }

    #[test]
    fn test_matchers_pass_through() {
        let m = less_than(10).into_matcher();
        assert_eq!(m.describe(), "less than 10");
    }

    #[test]
    fn test_matchers_macro() {
        let list = matchers!["foo", less_than(10), anything()];
        let descriptions: Vec<_> = list.iter().map(Matcher::describe).collect();
        assert_eq!(
            descriptions,
            vec!["equal to \"foo\"", "less than 10", "anything"]
        );
        assert!(matchers![].is_empty());
    }

    #[test]
    fn test_args_macro_preserves_undefined() {
        let list = args!["hello", Value::Undefined, 5];
        assert_eq!(
            list,
            vec![Value::from("hello"), Value::Undefined, Value::from(5)]
        );
    }

    #[test]
    fn test_debug_shows_description() {
        assert_eq!(format!("{:?}", less_than(3)), "<less than 3>");
    }

    #[test]
    fn test_assert_that_passes() {
        assert_that!(Value::from(5), less_than(10));
        assert_that!(Value::Undefined, same_as(Value::Undefined), "scope was not the same");
    }

    #[test]
    #[should_panic(expected = "expected: less than 10")]
    fn test_assert_that_panics() {
        assert_that!(Value::from(11), less_than(10));
    }
}
