//! Mock construction and call interception.
//!
//! - [`Template`] - the shape a mock conforms to
//! - [`Mock`] - the test double, with one intercepted [`MethodRef`] per template method
//! - [`Invocation`] - a recorded call
//! - [`MockSettings`] - per-mock configuration
//!
//! # Example
//!
//! ```rust
//! use testkit_mock::{args, mock, Template};
//!
//! let template = Template::builder("MyObject")
//!     .method("greeting")
//!     .method("farewell")
//!     .build();
//!
//! let m = mock(&template);
//! m.invoke("farewell", args!["hunter", "thompson", 67]).unwrap();
//!
//! let calls = m.invocations("farewell");
//! assert_eq!(calls.len(), 1);
//! assert_eq!(calls[0].args().len(), 3);
//! ```

mod instance;
mod invocation;
mod settings;
mod template;

use std::sync::Arc;

pub use instance::{MethodRef, Mock, WeakMock};
pub use invocation::Invocation;
pub use settings::MockSettings;
pub use template::{Mockable, Template, TemplateBuilder};

use crate::value::Value;

/// Behavior attached to a method: called with the receiver and the arguments.
pub type Action = Arc<dyn Fn(&Value, &[Value]) -> Value + Send + Sync>;

/// Create a mock of `template` with default settings.
#[must_use]
pub fn mock(template: &Template) -> Mock {
    mock_with(template, MockSettings::default())
}

/// Create a mock of `template` with custom settings.
#[must_use]
pub fn mock_with(template: &Template, settings: MockSettings) -> Mock {
    Mock::new(template, settings)
}

/// Create a mock of a [`Mockable`] type.
#[must_use]
pub fn mock_of<T: Mockable>() -> Mock {
    mock(&T::template())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_is_instance_of_template() {
        let template = Template::builder("MyObject").method("greeting").build();
        let m = mock(&template);
        assert!(m.is_instance_of(&template));
        assert!(!m.is_instance_of(&Template::builder("MyObject").build()));
    }

    #[test]
    fn test_mock_with_label() {
        let template = Template::builder("MyObject").build();
        let m = mock_with(&template, MockSettings::new().with_label("greeter"));
        assert_eq!(m.label(), "greeter");
    }

    struct Repository;

    impl Mockable for Repository {
        fn template() -> Template {
            Template::builder_for::<Self>("Repository")
                .method("find")
                .method("save")
                .build()
        }
    }

    #[test]
    fn test_mock_of() {
        let m = mock_of::<Repository>();
        assert!(m.is_instance_of(&Template::of::<Repository>()));
        assert!(m.template().has_method("save"));
    }
}
