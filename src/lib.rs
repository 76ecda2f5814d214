//! # testkit-mock
//!
//! > Mock objects with stubbing and verification for Rust tests
//!
//! **testkit-mock** builds test doubles from a [`Template`], records every
//! call made to them, answers calls with stubbed behavior, and verifies the
//! recorded history against argument and receiver matchers.
//!
//! ## Quick Start
//!
//! ```rust
//! use testkit_mock::prelude::*;
//!
//! let template = Template::builder("MyObject")
//!     .method("greeting")
//!     .method("farewell")
//!     .build();
//! let m = mock(&template);
//!
//! when(&m)
//!     .method("farewell")
//!     .with(matchers!["foo", less_than(10), anything()])
//!     .unwrap()
//!     .then_return("stub result");
//!
//! let farewell = m.method("farewell").unwrap();
//! assert_eq!(farewell.invoke(args!["foo", 9, Value::empty_object()]), Value::from("stub result"));
//!
//! verify(&m).method("farewell").with(matchers!["foo"]).unwrap();
//! assert_eq!(
//!     verify(&m).method("greeting").with(matchers![]).unwrap_err().to_string(),
//!     "Wanted but not invoked: obj.greeting()"
//! );
//! ```
//!
//! ## Features
//!
//! - **Mocks** - intercept every method a template declares
//! - **Stubbing** - `when(...).then(...)`, newest matching rule wins
//! - **Verification** - prefix argument matching, receiver matching, call counts
//! - **Matchers** - `equal_to`, `anything`, `less_than`, `same_as`, combinators
//! - **`#[template]`** - derive a template from an `impl` block (feature `macros`)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod matcher;
pub mod mock;
pub mod scope;
pub mod stub;
pub mod value;
pub mod verify;

/// Prelude for convenient imports
///
/// ```rust
/// use testkit_mock::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::matcher::{
        all_of, any_of, anything, equal_to, greater_than, instance_of, less_than, nil, not,
        same_as, satisfies, ArgMatcher, IntoMatcher, Matcher,
    };
    pub use crate::mock::{
        mock, mock_of, mock_with, Mock, MockSettings, Mockable, Template, WeakMock,
    };
    pub use crate::stub::when;
    pub use crate::value::Value;
    pub use crate::verify::{
        at_least, at_least_once, at_most, never, times, verify, verify_no_more_interactions,
        verify_with, verify_zero_interactions,
    };
    pub use crate::{args, assert_that, matchers};
}

// Re-exports
pub use error::{Error, Result};
pub use mock::{
    mock, mock_of, mock_with, Invocation, MethodRef, Mock, MockSettings, Mockable, Template,
    WeakMock,
};
pub use scope::{Receiver, Scope};
pub use stub::when;
pub use value::Value;
pub use verify::{
    at_least, at_least_once, at_most, never, times, verify, verify_no_more_interactions,
    verify_with, verify_zero_interactions, CallPolicy,
};

// Re-export the template attribute when macros feature is enabled
#[cfg(feature = "macros")]
pub use testkit_mock_macros::template;
