//! Receiver ("this") tracking and the matching rule shared by stubbing and
//! verification.
//!
//! A call is always a `(receiver, arguments)` pair. Calls made directly on
//! a mock, or with the mock passed explicitly as receiver, record
//! [`Receiver::Mock`]; any other receiver is kept as a [`Receiver::Value`].

use crate::matcher::{ArgMatcher, Matcher};
use crate::mock::{Invocation, Mock};
use crate::value::Value;

/// The receiver a call was made against.
#[derive(Debug, Clone)]
pub enum Receiver {
    /// The mock the method belongs to.
    Mock,
    /// Some other receiver.
    Value(Value),
}

impl Receiver {
    /// Normalize an explicit receiver against the mock being called.
    pub(crate) fn resolve(value: Value, owner: &Mock) -> Self {
        match value {
            Value::Mock(ref m) if m.same_instance(owner) => Self::Mock,
            other => Self::Value(other),
        }
    }

    /// Whether the call was made on the mock itself.
    #[must_use]
    pub fn is_mock(&self) -> bool {
        matches!(self, Self::Mock)
    }

    /// The receiver as a value, given the mock it was recorded by.
    #[must_use]
    pub fn to_value(&self, owner: &Mock) -> Value {
        match self {
            Self::Mock => Value::Mock(owner.clone()),
            Self::Value(value) => value.clone(),
        }
    }
}

/// Which receivers an expectation accepts.
#[derive(Clone, Debug, Default)]
pub enum Scope {
    /// Only the mock itself.
    #[default]
    Default,
    /// Whatever the matcher accepts.
    Explicit(ArgMatcher),
}

impl Scope {
    /// Check a receiver recorded by `owner`.
    #[must_use]
    pub fn matches(&self, receiver: &Receiver, owner: &Mock) -> bool {
        match self {
            Self::Default => receiver.is_mock(),
            Self::Explicit(matcher) => matcher.matches(&receiver.to_value(owner)),
        }
    }
}

/// Method name, argument matchers and scope: the part of a stub rule or a
/// verification query that is compared against calls.
#[derive(Clone, Debug)]
pub(crate) struct Expectation {
    method: String,
    args: Vec<ArgMatcher>,
    scope: Scope,
}

impl Expectation {
    pub(crate) fn new(method: &str, args: Vec<ArgMatcher>, scope: Scope) -> Self {
        Self {
            method: method.to_string(),
            args,
            scope,
        }
    }

    pub(crate) fn method(&self) -> &str {
        &self.method
    }

    /// Prefix match: every matcher must accept the argument at its position.
    ///
    /// Extra actual arguments are ignored. Fewer actual arguments than
    /// matchers never match, whatever the trailing matchers are.
    pub(crate) fn matches_args(&self, actual: &[Value]) -> bool {
        actual.len() >= self.args.len()
            && self
                .args
                .iter()
                .zip(actual)
                .all(|(matcher, value)| matcher.matches(value))
    }

    pub(crate) fn matches(&self, args: &[Value], receiver: &Receiver, owner: &Mock) -> bool {
        self.matches_args(args) && self.scope.matches(receiver, owner)
    }

    pub(crate) fn matches_invocation(&self, invocation: &Invocation, owner: &Mock) -> bool {
        invocation.method() == self.method
            && self.matches(invocation.args(), invocation.receiver(), owner)
    }

    /// `label.method(<d1>, <d2>)`, plus `, 'this' being <d>` for an explicit scope.
    pub(crate) fn signature(&self, label: &str) -> String {
        let args: Vec<_> = self
            .args
            .iter()
            .map(|m| format!("<{}>", m.describe()))
            .collect();
        let mut out = format!("{label}.{}({})", self.method, args.join(", "));
        if let Scope::Explicit(matcher) = &self.scope {
            out.push_str(&format!(", 'this' being {}", matcher.describe()));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::{anything, less_than, IntoMatcher};
    use crate::mock::{mock, Template};

    fn template() -> Template {
        Template::builder("MyObject")
            .method("greeting")
            .method("farewell")
            .build()
    }

    #[test]
    fn test_resolve_normalizes_own_mock() {
        let m = mock(&template());
        let other = mock(&template());

        assert!(Receiver::resolve(Value::from(&m), &m).is_mock());
        assert!(!Receiver::resolve(Value::from(&other), &m).is_mock());
        assert!(!Receiver::resolve(Value::empty_object(), &m).is_mock());
    }

    #[test]
    fn test_prefix_matching() {
        let e = Expectation::new(
            "farewell",
            crate::matchers!["foo", less_than(10), anything()],
            Scope::Default,
        );

        assert!(e.matches_args(&crate::args!["foo", 9, Value::empty_object()]));
        assert!(e.matches_args(&crate::args!["foo", 9, Value::Undefined, "extra"]));
        assert!(!e.matches_args(&crate::args!["foo", 11, "bar"]));
        // anything() is not satisfied by a missing argument
        assert!(!e.matches_args(&crate::args!["foo", 9]));
    }

    #[test]
    fn test_empty_expectation_matches_any_arguments() {
        let e = Expectation::new("farewell", Vec::new(), Scope::Default);
        assert!(e.matches_args(&[]));
        assert!(e.matches_args(&crate::args!["hunter", "thompson", 67]));
    }

    #[test]
    fn test_default_scope_is_the_mock() {
        let m = mock(&template());
        let scope = Scope::Default;
        assert!(scope.matches(&Receiver::Mock, &m));
        assert!(!scope.matches(&Receiver::Value(Value::empty_object()), &m));
    }

    #[test]
    fn test_explicit_scope() {
        let m = mock(&template());
        let this = Value::empty_object();

        let any = Scope::Explicit(anything());
        assert!(any.matches(&Receiver::Mock, &m));
        assert!(any.matches(&Receiver::Value(this.clone()), &m));

        let own = Scope::Explicit(Value::from(&m).into_matcher());
        assert!(own.matches(&Receiver::Mock, &m));
        assert!(!own.matches(&Receiver::Value(this), &m));
    }

    #[test]
    fn test_signature() {
        let e = Expectation::new(
            "farewell",
            crate::matchers!["hunter", "thompson", 68],
            Scope::Default,
        );
        assert_eq!(
            e.signature("obj"),
            "obj.farewell(<equal to \"hunter\">, <equal to \"thompson\">, <equal to 68>)"
        );

        let e = Expectation::new(
            "greeting",
            Vec::new(),
            Scope::Explicit(Value::empty_object().into_matcher()),
        );
        assert_eq!(
            e.signature("obj"),
            "obj.greeting(), 'this' being equal to [object Object]"
        );
    }
}
