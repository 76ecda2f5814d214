//! Mock instances and the interception wrapper installed for each method.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::{debug, trace};

use super::invocation::{Invocation, InvocationLog};
use super::settings::MockSettings;
use super::template::Template;
use crate::error::{Error, Result};
use crate::scope::Receiver;
use crate::stub::StubRegistry;
use crate::value::Value;

struct MockInner {
    template: Template,
    settings: MockSettings,
    log: Mutex<InvocationLog>,
    stubs: Mutex<StubRegistry>,
}

/// A test double shaped like a [`Template`].
///
/// Every method the template declares is intercepted: calls are recorded
/// and answered by the newest matching stub rule, or by the default return
/// value (`Undefined` unless configured otherwise).
///
/// Clones are handles to the same mock. The mock is freed with its last
/// handle; stub actions that call back into the mock should capture a
/// [`WeakMock`] from [`Mock::downgrade`] rather than a clone. Calls that
/// pass a mock as an argument to its own methods keep it alive until
/// [`Mock::reset`].
///
/// # Example
///
/// ```rust
/// use testkit_mock::{args, mock, Template, Value};
///
/// let template = Template::builder("MyObject").method("greeting").build();
/// let m = mock(&template);
///
/// let result = m.method("greeting").unwrap().invoke(args![]);
/// assert!(result.is_undefined());
/// assert_eq!(m.invocations("greeting").len(), 1);
/// assert!(m.is_instance_of(&template));
/// ```
#[derive(Clone)]
pub struct Mock {
    inner: Arc<MockInner>,
}

impl Mock {
    pub(crate) fn new(template: &Template, settings: MockSettings) -> Self {
        Self {
            inner: Arc::new(MockInner {
                template: template.clone(),
                settings,
                log: Mutex::new(InvocationLog::default()),
                stubs: Mutex::new(StubRegistry::default()),
            }),
        }
    }

    /// The template this mock was built from.
    #[must_use]
    pub fn template(&self) -> &Template {
        &self.inner.template
    }

    /// The settings this mock was built with.
    #[must_use]
    pub fn settings(&self) -> &MockSettings {
        &self.inner.settings
    }

    /// The receiver label used in diagnostics.
    #[must_use]
    pub fn label(&self) -> &str {
        self.inner.settings.label()
    }

    /// Whether this mock classifies as an instance of `template`.
    #[must_use]
    pub fn is_instance_of(&self, template: &Template) -> bool {
        self.inner.template.is_same_type(template)
    }

    /// Whether both handles refer to the same mock.
    #[must_use]
    pub fn same_instance(&self, other: &Mock) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// A handle that does not keep the mock alive.
    #[must_use]
    pub fn downgrade(&self) -> WeakMock {
        WeakMock {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// The intercepted method called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownMethod`] if the template has no such method.
    pub fn method<'a>(&'a self, name: &'a str) -> Result<MethodRef<'a>> {
        self.ensure_method(name)?;
        Ok(MethodRef { mock: self, name })
    }

    /// Call `name` on the mock itself.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownMethod`] if the template has no such method.
    pub fn invoke(&self, name: &str, args: Vec<Value>) -> Result<Value> {
        Ok(self.method(name)?.invoke(args))
    }

    /// Recorded calls of one method, in call order.
    #[must_use]
    pub fn invocations(&self, method: &str) -> Vec<Invocation> {
        self.inner.log.lock().for_method(method).to_vec()
    }

    /// Every recorded call, in call order.
    #[must_use]
    pub fn all_invocations(&self) -> Vec<Invocation> {
        self.inner.log.lock().all()
    }

    /// Forget all recorded calls and stub rules.
    pub fn reset(&self) {
        self.inner.log.lock().clear();
        self.inner.stubs.lock().clear();
    }

    pub(crate) fn ensure_method(&self, name: &str) -> Result<()> {
        if self.inner.template.has_method(name) {
            Ok(())
        } else {
            Err(Error::unknown_method(self.label(), name))
        }
    }

    pub(crate) fn log(&self) -> &Mutex<InvocationLog> {
        &self.inner.log
    }

    pub(crate) fn stubs(&self) -> &Mutex<StubRegistry> {
        &self.inner.stubs
    }
}

impl fmt::Debug for Mock {
    // Never locks: a mock may be formatted while one of its own locks is held.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mock")
            .field("template", &self.inner.template.name())
            .field("label", &self.label())
            .finish_non_exhaustive()
    }
}

/// A non-owning handle to a [`Mock`].
///
/// # Example
///
/// ```rust
/// use testkit_mock::{args, matchers, mock, when, Template, Value};
///
/// let m = mock(&Template::builder("MyObject").method("greeting").method("farewell").build());
/// let weak = m.downgrade();
/// when(&m)
///     .method("greeting")
///     .with(matchers![])
///     .unwrap()
///     .then(move |_, _| match weak.upgrade() {
///         Some(m) => m.invoke("farewell", args![]).unwrap_or_default(),
///         None => Value::Undefined,
///     });
///
/// m.invoke("greeting", args![]).unwrap();
/// assert_eq!(m.invocations("farewell").len(), 1);
/// ```
#[derive(Clone)]
pub struct WeakMock {
    inner: Weak<MockInner>,
}

impl WeakMock {
    /// The mock, if it is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<Mock> {
        self.inner.upgrade().map(|inner| Mock { inner })
    }

    /// Whether `mock` is the mock this handle points at.
    ///
    /// The allocation outlives the mock while this handle exists, so a
    /// dropped mock never compares equal to a newer one.
    #[must_use]
    pub fn points_to(&self, mock: &Mock) -> bool {
        std::ptr::eq(self.inner.as_ptr(), Arc::as_ptr(&mock.inner))
    }
}

impl fmt::Debug for WeakMock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakMock")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

/// An intercepted method of a [`Mock`].
///
/// The three call forms all reduce to a `(receiver, arguments)` pair before
/// anything is recorded.
#[derive(Clone, Copy)]
pub struct MethodRef<'a> {
    mock: &'a Mock,
    name: &'a str,
}

impl MethodRef<'_> {
    /// The method name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name
    }

    /// Call the method on the mock itself.
    pub fn invoke(&self, args: Vec<Value>) -> Value {
        self.dispatch(Receiver::Mock, args)
    }

    /// Call the method with an explicit receiver.
    pub fn call(&self, receiver: impl Into<Value>, args: Vec<Value>) -> Value {
        self.dispatch(Receiver::resolve(receiver.into(), self.mock), args)
    }

    /// Call the method with an explicit receiver and an argument slice.
    pub fn apply(&self, receiver: impl Into<Value>, args: &[Value]) -> Value {
        self.call(receiver, args.to_vec())
    }

    fn dispatch(&self, receiver: Receiver, args: Vec<Value>) -> Value {
        let sequence = self
            .mock
            .log()
            .lock()
            .record(self.name, args.clone(), receiver.clone());
        debug!(
            mock = self.mock.label(),
            method = self.name,
            sequence,
            arg_count = args.len(),
            "recorded invocation"
        );

        // Lock released before the action runs, so actions may call back in.
        let rules = self.mock.stubs().lock().rules_for(self.name);
        let answer = rules
            .iter()
            .rev()
            .find(|rule| rule.matches(&args, &receiver, self.mock));

        match answer {
            Some(rule) => {
                trace!(method = self.name, sequence, "stub rule matched");
                rule.answer(&receiver.to_value(self.mock), &args)
            }
            None => {
                trace!(method = self.name, sequence, "no stub rule matched");
                self.mock.settings().default_return().clone()
            }
        }
    }
}

impl fmt::Debug for MethodRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.mock.label(), self.name)
    }
}
