//! Stubbing: conditional behavior for mock methods.
//!
//! `when(&mock).method(name)` starts a rule. Choosing the arguments
//! (`with`, `call` or `apply`) registers it straight away with an action
//! that returns `Undefined`; `then` / `then_return` supersede that action.
//!
//! At call time the newest rule whose argument matchers and scope accept
//! the call wins.
//!
//! # Example
//!
//! ```rust
//! use testkit_mock::matcher::{anything, less_than};
//! use testkit_mock::{args, matchers, mock, when, Template, Value};
//!
//! let m = mock(&Template::builder("MyObject").method("farewell").build());
//!
//! when(&m)
//!     .method("farewell")
//!     .with(matchers!["foo", less_than(10), anything()])
//!     .unwrap()
//!     .then(|_this, _args| Value::from("stub result"));
//!
//! let farewell = m.method("farewell").unwrap();
//! assert_eq!(farewell.invoke(args!["foo", 9, Value::empty_object()]), Value::from("stub result"));
//! assert!(farewell.invoke(args!["foo", 11, "bar"]).is_undefined());
//! assert!(farewell.invoke(args!["foo", 9]).is_undefined());
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::matcher::{ArgMatcher, IntoMatcher};
use crate::mock::{Action, Mock};
use crate::scope::{Expectation, Receiver, Scope};
use crate::value::Value;

/// A registered conditional behavior.
#[derive(Clone)]
pub(crate) struct StubRule {
    id: u64,
    expectation: Expectation,
    action: Option<Action>,
}

impl StubRule {
    pub(crate) fn matches(&self, args: &[Value], receiver: &Receiver, owner: &Mock) -> bool {
        self.expectation.matches(args, receiver, owner)
    }

    /// Run the action with `this` as receiver. Rules without one return `Undefined`.
    pub(crate) fn answer(&self, this: &Value, args: &[Value]) -> Value {
        self.action
            .as_ref()
            .map_or(Value::Undefined, |action| action(this, args))
    }
}

/// Per-mock stub rules, grouped by method in registration order.
#[derive(Default)]
pub(crate) struct StubRegistry {
    rules: HashMap<String, Vec<StubRule>>,
    next_id: u64,
}

impl StubRegistry {
    pub(crate) fn register(&mut self, expectation: Expectation) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.rules
            .entry(expectation.method().to_string())
            .or_default()
            .push(StubRule {
                id,
                expectation,
                action: None,
            });
        id
    }

    /// Replace the action of rule `id`. Returns false if the rule is gone.
    pub(crate) fn supersede(&mut self, method: &str, id: u64, action: Action) -> bool {
        let Some(rule) = self
            .rules
            .get_mut(method)
            .and_then(|rules| rules.iter_mut().find(|r| r.id == id))
        else {
            return false;
        };
        rule.action = Some(action);
        true
    }

    /// Snapshot of the rules for `method`, oldest first.
    pub(crate) fn rules_for(&self, method: &str) -> Vec<StubRule> {
        self.rules.get(method).cloned().unwrap_or_default()
    }

    pub(crate) fn clear(&mut self) {
        self.rules.clear();
    }
}

/// Begin stubbing `mock`.
#[must_use]
pub fn when(mock: &Mock) -> When<'_> {
    When { mock }
}

/// Entry point returned by [`when`].
pub struct When<'a> {
    mock: &'a Mock,
}

impl<'a> When<'a> {
    /// Choose the method to stub.
    #[must_use]
    pub fn method(self, name: &'a str) -> StubBuilder<'a> {
        StubBuilder {
            mock: self.mock,
            method: name,
        }
    }
}

/// Chooses the arguments and receiver a stub rule applies to.
pub struct StubBuilder<'a> {
    mock: &'a Mock,
    method: &'a str,
}

impl<'a> StubBuilder<'a> {
    /// Match calls made on the mock itself.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownMethod`] if the template has no such method.
    pub fn with(self, args: Vec<ArgMatcher>) -> Result<Stubbing<'a>> {
        self.register(Scope::Default, args)
    }

    /// Match calls whose receiver satisfies `scope`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownMethod`] if the template has no such method.
    pub fn call(self, scope: impl IntoMatcher, args: Vec<ArgMatcher>) -> Result<Stubbing<'a>> {
        self.register(Scope::Explicit(scope.into_matcher()), args)
    }

    /// Like [`StubBuilder::call`], taking the argument matchers as a slice.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownMethod`] if the template has no such method.
    pub fn apply(self, scope: impl IntoMatcher, args: &[ArgMatcher]) -> Result<Stubbing<'a>> {
        self.call(scope, args.to_vec())
    }

    fn register(self, scope: Scope, args: Vec<ArgMatcher>) -> Result<Stubbing<'a>> {
        self.mock.ensure_method(self.method)?;
        let expectation = Expectation::new(self.method, args, scope);
        let id = self.mock.stubs().lock().register(expectation);
        debug!(
            mock = self.mock.label(),
            method = self.method,
            rule = id,
            "registered stub rule"
        );
        Ok(Stubbing {
            mock: self.mock,
            method: self.method,
            id,
        })
    }
}

/// A registered rule whose behavior can still be set.
pub struct Stubbing<'a> {
    mock: &'a Mock,
    method: &'a str,
    id: u64,
}

impl Stubbing<'_> {
    /// Answer matching calls with `action`.
    ///
    /// The action receives the call's receiver (the mock itself for direct
    /// calls) and the actual arguments, extras included.
    pub fn then<F>(self, action: F)
    where
        F: Fn(&Value, &[Value]) -> Value + Send + Sync + 'static,
    {
        let superseded = self
            .mock
            .stubs()
            .lock()
            .supersede(self.method, self.id, Arc::new(action));
        if !superseded {
            debug!(
                method = self.method,
                rule = self.id,
                "stub rule removed before its action was set"
            );
        }
    }

    /// Answer matching calls with a fixed value.
    pub fn then_return(self, value: impl Into<Value>) {
        let value = value.into();
        self.then(move |_, _| value.clone());
    }
}
