//! Verification of recorded calls.
//!
//! `verify(&mock).method(name)` followed by `with`, `call` or `apply`
//! replays the expectation against the mock's call history. Arguments are
//! matched by prefix, exactly as stub rules are. Failures are
//! [`Error::Verification`] values carrying the diagnostic text.
//!
//! # Example
//!
//! ```rust
//! use testkit_mock::matcher::less_than;
//! use testkit_mock::{args, matchers, mock, verify, Template};
//!
//! let m = mock(&Template::builder("MyObject").method("farewell").build());
//! m.invoke("farewell", args!["hunter", "thompson", 67]).unwrap();
//!
//! verify(&m).method("farewell").with(matchers![]).unwrap();
//! verify(&m).method("farewell").with(matchers!["hunter", "thompson", less_than(100)]).unwrap();
//!
//! let err = verify(&m)
//!     .method("farewell")
//!     .with(matchers!["hunter", "thompson", 68])
//!     .unwrap_err();
//! assert_eq!(
//!     err.to_string(),
//!     "Wanted but not invoked: obj.farewell(<equal to \"hunter\">, <equal to \"thompson\">, <equal to 68>)"
//! );
//! ```

use tracing::debug;

use crate::error::{Error, Result};
use crate::matcher::{ArgMatcher, IntoMatcher};
use crate::mock::{Invocation, Mock};
use crate::scope::{Expectation, Scope};

/// How many matching calls a verification requires.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CallPolicy {
    /// One or more.
    #[default]
    AtLeastOnce,
    /// Exactly this many. `Times(0)` is [`never`].
    Times(usize),
    /// This many or more.
    AtLeast(usize),
    /// This many or fewer.
    AtMost(usize),
}

impl CallPolicy {
    /// Whether `count` matching calls satisfy the policy.
    #[must_use]
    pub fn admits(self, count: usize) -> bool {
        match self {
            Self::AtLeastOnce => count >= 1,
            Self::Times(n) => count == n,
            Self::AtLeast(n) => count >= n,
            Self::AtMost(n) => count <= n,
        }
    }

    fn failure(self, count: usize, signature: &str) -> String {
        match self {
            Self::Times(0) => format!("Never wanted but invoked: {signature}"),
            Self::Times(n) if count > n => {
                format!("Wanted {n} invocations but got {count}: {signature}")
            }
            Self::AtMost(n) if count > n => {
                format!("Wanted at most {n} invocations but got {count}: {signature}")
            }
            _ => format!("Wanted but not invoked: {signature}"),
        }
    }
}

/// Exactly `n` matching calls.
#[must_use]
pub fn times(n: usize) -> CallPolicy {
    CallPolicy::Times(n)
}

/// No matching calls.
#[must_use]
pub fn never() -> CallPolicy {
    CallPolicy::Times(0)
}

/// At least `n` matching calls.
#[must_use]
pub fn at_least(n: usize) -> CallPolicy {
    CallPolicy::AtLeast(n)
}

/// At most `n` matching calls.
#[must_use]
pub fn at_most(n: usize) -> CallPolicy {
    CallPolicy::AtMost(n)
}

/// One or more matching calls (the default).
#[must_use]
pub fn at_least_once() -> CallPolicy {
    CallPolicy::AtLeastOnce
}

/// Begin verifying `mock` with the default policy.
#[must_use]
pub fn verify(mock: &Mock) -> Verify<'_> {
    verify_with(mock, CallPolicy::default())
}

/// Begin verifying `mock` with an explicit call policy.
///
/// ```rust
/// use testkit_mock::{args, matchers, mock, times, verify_with, Template};
///
/// let m = mock(&Template::builder("MyObject").method("greeting").build());
/// m.invoke("greeting", args![]).unwrap();
///
/// verify_with(&m, times(1)).method("greeting").with(matchers![]).unwrap();
/// assert!(verify_with(&m, times(2)).method("greeting").with(matchers![]).is_err());
/// ```
#[must_use]
pub fn verify_with(mock: &Mock, policy: CallPolicy) -> Verify<'_> {
    Verify { mock, policy }
}

/// Entry point returned by [`verify`] and [`verify_with`].
pub struct Verify<'a> {
    mock: &'a Mock,
    policy: CallPolicy,
}

impl<'a> Verify<'a> {
    /// Choose the method to verify.
    #[must_use]
    pub fn method(self, name: &'a str) -> VerifyBuilder<'a> {
        VerifyBuilder {
            mock: self.mock,
            method: name,
            policy: self.policy,
        }
    }
}

/// Chooses the arguments and receiver to look for, then runs the check.
pub struct VerifyBuilder<'a> {
    mock: &'a Mock,
    method: &'a str,
    policy: CallPolicy,
}

impl VerifyBuilder<'_> {
    /// Look for calls made on the mock itself.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Verification`] if the policy is not met, or
    /// [`Error::UnknownMethod`] if the template has no such method.
    pub fn with(self, args: Vec<ArgMatcher>) -> Result<()> {
        self.check(Scope::Default, args)
    }

    /// Look for calls whose receiver satisfies `scope`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Verification`] if the policy is not met, or
    /// [`Error::UnknownMethod`] if the template has no such method.
    pub fn call(self, scope: impl IntoMatcher, args: Vec<ArgMatcher>) -> Result<()> {
        self.check(Scope::Explicit(scope.into_matcher()), args)
    }

    /// Like [`VerifyBuilder::call`], taking the argument matchers as a slice.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Verification`] if the policy is not met, or
    /// [`Error::UnknownMethod`] if the template has no such method.
    pub fn apply(self, scope: impl IntoMatcher, args: &[ArgMatcher]) -> Result<()> {
        self.call(scope, args.to_vec())
    }

    fn check(self, scope: Scope, args: Vec<ArgMatcher>) -> Result<()> {
        self.mock.ensure_method(self.method)?;
        let expectation = Expectation::new(self.method, args, scope);

        // Matchers run on a snapshot so none of them can observe a held lock.
        let matched: Vec<u64> = self
            .mock
            .invocations(self.method)
            .iter()
            .filter(|inv| expectation.matches_invocation(inv, self.mock))
            .map(Invocation::sequence)
            .collect();

        if self.policy.admits(matched.len()) {
            self.mock.log().lock().mark_verified(matched);
            return Ok(());
        }

        let message = self
            .policy
            .failure(matched.len(), &expectation.signature(self.mock.label()));
        debug!(
            mock = self.mock.label(),
            method = self.method,
            matched = matched.len(),
            policy = ?self.policy,
            "verification failed"
        );
        Err(Error::verification(message))
    }
}

fn render_calls(mock: &Mock, calls: &[Invocation]) -> String {
    calls
        .iter()
        .map(|inv| inv.render(mock.label()))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Check that `mock` was never called.
///
/// # Errors
///
/// Returns [`Error::Verification`] listing the recorded calls.
pub fn verify_zero_interactions(mock: &Mock) -> Result<()> {
    let calls = mock.all_invocations();
    if calls.is_empty() {
        return Ok(());
    }
    debug!(mock = mock.label(), calls = calls.len(), "unexpected interactions");
    Err(Error::verification(format!(
        "No interactions wanted, but found: {}",
        render_calls(mock, &calls)
    )))
}

/// Check that every recorded call was accounted for by a successful
/// verification.
///
/// # Errors
///
/// Returns [`Error::Verification`] listing the unverified calls.
pub fn verify_no_more_interactions(mock: &Mock) -> Result<()> {
    let pending = mock.log().lock().unverified();
    if pending.is_empty() {
        return Ok(());
    }
    debug!(mock = mock.label(), calls = pending.len(), "unverified interactions");
    Err(Error::verification(format!(
        "No more interactions wanted, but found: {}",
        render_calls(mock, &pending)
    )))
}
