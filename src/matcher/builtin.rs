//! Built-in matchers and combinators.

use std::sync::OnceLock;

use super::{ArgMatcher, IntoMatcher, Matcher};
use crate::mock::{Mock, Template, WeakMock};
use crate::value::Value;

// =============================================================================
// Built-in Matchers
// =============================================================================

/// Create a deep-equality matcher.
///
/// Arrays and objects are compared element by element; `Undefined` only
/// equals `Undefined`.
///
/// # Example
///
/// ```rust
/// use testkit_mock::matcher::{equal_to, Matcher};
/// use testkit_mock::Value;
///
/// let m = equal_to(vec!["hello", "world"]);
/// assert!(m.matches(&Value::from(vec!["hello", "world"])));
/// assert!(!m.matches(&Value::from(vec!["hello"])));
/// ```
///
/// A mock compares by identity and is held weakly, so a matcher stored in a
/// mock's own stub rules does not keep that mock alive.
pub fn equal_to(expected: impl Into<Value>) -> ArgMatcher {
    match expected.into() {
        Value::Mock(mock) => MockIdentity::matcher("equal to", &mock),
        expected => ArgMatcher::new(EqualTo { expected }),
    }
}

struct EqualTo {
    expected: Value,
}

impl Matcher for EqualTo {
    fn matches(&self, value: &Value) -> bool {
        value == &self.expected
    }

    fn describe(&self) -> String {
        format!("equal to {}", self.expected.literal())
    }
}

/// A matcher that accepts every value, `Undefined` included.
///
/// The matcher is stateless, so every call hands out the same instance.
pub fn anything() -> ArgMatcher {
    static ANYTHING: OnceLock<ArgMatcher> = OnceLock::new();
    ANYTHING.get_or_init(|| ArgMatcher::new(Anything)).clone()
}

struct Anything;

impl Matcher for Anything {
    fn matches(&self, _value: &Value) -> bool {
        true
    }

    fn describe(&self) -> String {
        "anything".to_string()
    }
}

/// Create a matcher for numbers strictly less than `bound`.
///
/// Non-numeric values never match.
///
/// # Example
///
/// ```rust
/// use testkit_mock::matcher::{less_than, Matcher};
/// use testkit_mock::Value;
///
/// let m = less_than(10);
/// assert!(m.matches(&Value::from(9)));
/// assert!(!m.matches(&Value::from(10)));
/// assert!(!m.matches(&Value::from("9")));
/// ```
pub fn less_than(bound: impl Into<f64>) -> ArgMatcher {
    ArgMatcher::new(LessThan {
        bound: bound.into(),
    })
}

struct LessThan {
    bound: f64,
}

impl Matcher for LessThan {
    fn matches(&self, value: &Value) -> bool {
        value.as_f64().is_some_and(|n| n < self.bound)
    }

    fn describe(&self) -> String {
        format!("less than {}", Value::Number(self.bound))
    }
}

/// Create a matcher for numbers strictly greater than `bound`.
pub fn greater_than(bound: impl Into<f64>) -> ArgMatcher {
    ArgMatcher::new(GreaterThan {
        bound: bound.into(),
    })
}

struct GreaterThan {
    bound: f64,
}

impl Matcher for GreaterThan {
    fn matches(&self, value: &Value) -> bool {
        value.as_f64().is_some_and(|n| n > self.bound)
    }

    fn describe(&self) -> String {
        format!("greater than {}", Value::Number(self.bound))
    }
}

/// Create a matcher for mocks classified as instances of `template`.
pub fn instance_of(template: &Template) -> ArgMatcher {
    ArgMatcher::new(InstanceOf {
        template: template.clone(),
    })
}

struct InstanceOf {
    template: Template,
}

impl Matcher for InstanceOf {
    fn matches(&self, value: &Value) -> bool {
        value
            .as_mock()
            .is_some_and(|mock| mock.is_instance_of(&self.template))
    }

    fn describe(&self) -> String {
        format!("instance of {}", self.template.name())
    }
}

/// Create an identity matcher.
///
/// # Example
///
/// ```rust
/// use testkit_mock::matcher::{same_as, Matcher};
/// use testkit_mock::Value;
///
/// let scope = Value::empty_object();
/// assert!(same_as(scope.clone()).matches(&scope));
/// assert!(!same_as(scope).matches(&Value::empty_object()));
/// ```
pub fn same_as(expected: impl Into<Value>) -> ArgMatcher {
    match expected.into() {
        Value::Mock(mock) => MockIdentity::matcher("same as", &mock),
        expected => ArgMatcher::new(SameAs { expected }),
    }
}

struct SameAs {
    expected: Value,
}

impl Matcher for SameAs {
    fn matches(&self, value: &Value) -> bool {
        value.is_same(&self.expected)
    }

    fn describe(&self) -> String {
        format!("same as {}", self.expected.literal())
    }
}

// Matches one particular mock without owning it.
struct MockIdentity {
    relation: &'static str,
    target: WeakMock,
    template: String,
}

impl MockIdentity {
    fn matcher(relation: &'static str, mock: &Mock) -> ArgMatcher {
        ArgMatcher::new(Self {
            relation,
            target: mock.downgrade(),
            template: mock.template().name().to_string(),
        })
    }
}

impl Matcher for MockIdentity {
    fn matches(&self, value: &Value) -> bool {
        value
            .as_mock()
            .is_some_and(|mock| self.target.points_to(mock))
    }

    fn describe(&self) -> String {
        format!("{} [object {}]", self.relation, self.template)
    }
}

/// A matcher for `Undefined` or `Null`.
pub fn nil() -> ArgMatcher {
    static NIL: OnceLock<ArgMatcher> = OnceLock::new();
    NIL.get_or_init(|| ArgMatcher::new(Nil)).clone()
}

struct Nil;

impl Matcher for Nil {
    fn matches(&self, value: &Value) -> bool {
        value.is_nil()
    }

    fn describe(&self) -> String {
        "null or undefined".to_string()
    }
}

/// Create a predicate-based matcher.
///
/// # Example
///
/// ```rust
/// use testkit_mock::matcher::{satisfies, Matcher};
/// use testkit_mock::Value;
///
/// let m = satisfies(|v| v.as_str().is_some_and(|s| s.starts_with("hun")), "starts with \"hun\"");
/// assert!(m.matches(&Value::from("hunter")));
/// assert_eq!(m.describe(), "starts with \"hun\"");
/// ```
pub fn satisfies<F>(predicate: F, description: &str) -> ArgMatcher
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    ArgMatcher::new(Predicate {
        predicate,
        description: description.to_string(),
    })
}

struct Predicate<F> {
    predicate: F,
    description: String,
}

impl<F: Fn(&Value) -> bool + Send + Sync> Matcher for Predicate<F> {
    fn matches(&self, value: &Value) -> bool {
        (self.predicate)(value)
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

// =============================================================================
// Combinators
// =============================================================================

/// Create a matcher that inverts another.
///
/// Plain values are coerced first, so `not("foo")` means "not equal to foo".
pub fn not(matcher: impl IntoMatcher) -> ArgMatcher {
    ArgMatcher::new(Not {
        inner: matcher.into_matcher(),
    })
}

struct Not {
    inner: ArgMatcher,
}

impl Matcher for Not {
    fn matches(&self, value: &Value) -> bool {
        !self.inner.matches(value)
    }

    fn describe(&self) -> String {
        format!("not {}", self.inner.describe())
    }
}

/// Create a matcher that matches when all matchers match.
///
/// # Example
///
/// ```rust
/// use testkit_mock::matcher::{all_of, greater_than, less_than, Matcher};
/// use testkit_mock::Value;
///
/// let m = all_of(vec![greater_than(0), less_than(100)]);
/// assert!(m.matches(&Value::from(50)));
/// assert!(!m.matches(&Value::from(0)));
/// assert_eq!(m.describe(), "(greater than 0 and less than 100)");
/// ```
pub fn all_of(matchers: Vec<ArgMatcher>) -> ArgMatcher {
    ArgMatcher::new(AllOf { matchers })
}

struct AllOf {
    matchers: Vec<ArgMatcher>,
}

impl Matcher for AllOf {
    fn matches(&self, value: &Value) -> bool {
        self.matchers.iter().all(|m| m.matches(value))
    }

    fn describe(&self) -> String {
        let descriptions: Vec<_> = self.matchers.iter().map(Matcher::describe).collect();
        format!("({})", descriptions.join(" and "))
    }

    fn describe_mismatch(&self, value: &Value) -> String {
        let failures: Vec<_> = self
            .matchers
            .iter()
            .filter(|m| !m.matches(value))
            .map(|m| m.describe_mismatch(value))
            .collect();
        format!("failed: {}", failures.join("; "))
    }
}

/// Create a matcher that matches when any matcher matches.
pub fn any_of(matchers: Vec<ArgMatcher>) -> ArgMatcher {
    ArgMatcher::new(AnyOf { matchers })
}

struct AnyOf {
    matchers: Vec<ArgMatcher>,
}

impl Matcher for AnyOf {
    fn matches(&self, value: &Value) -> bool {
        self.matchers.iter().any(|m| m.matches(value))
    }

    fn describe(&self) -> String {
        let descriptions: Vec<_> = self.matchers.iter().map(Matcher::describe).collect();
        format!("({})", descriptions.join(" or "))
    }
}
