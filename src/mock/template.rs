//! Templates describe the shape a mock must conform to.
//!
//! A [`Template`] is a type name, a type identity used for classification,
//! and an ordered list of method names. Methods may carry their original body
//! so tests can compare the real behavior with the mocked one.

use std::any::TypeId;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::Action;
use crate::error::{Error, Result};
use crate::value::Value;

static NEXT_TEMPLATE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Identity {
    /// Derived from a Rust type.
    Type(TypeId),
    /// A template built by hand; unique per builder.
    Anonymous(u64),
}

struct MethodDef {
    name: String,
    body: Option<Action>,
}

struct TemplateInner {
    name: String,
    identity: Identity,
    methods: Vec<MethodDef>,
}

/// The shape of a mockable object.
///
/// Clones share identity, so a mock built from one clone is an instance of
/// every other clone.
///
/// # Example
///
/// ```rust
/// use testkit_mock::{Template, Value};
///
/// let template = Template::builder("MyObject")
///     .method_with("greeting", |_this, _args| Value::from("hello"))
///     .method("farewell")
///     .build();
///
/// assert_eq!(template.name(), "MyObject");
/// assert_eq!(template.method_names().collect::<Vec<_>>(), vec!["greeting", "farewell"]);
/// ```
#[derive(Clone)]
pub struct Template {
    inner: Arc<TemplateInner>,
}

impl Template {
    /// Start a template with a fresh, unique identity.
    pub fn builder(name: impl Into<String>) -> TemplateBuilder {
        TemplateBuilder::new(
            name.into(),
            Identity::Anonymous(NEXT_TEMPLATE_ID.fetch_add(1, Ordering::Relaxed)),
        )
    }

    /// Start a template whose identity is the Rust type `T`.
    ///
    /// Two templates built for the same `T` classify the same mocks.
    pub fn builder_for<T: ?Sized + 'static>(name: impl Into<String>) -> TemplateBuilder {
        TemplateBuilder::new(name.into(), Identity::Type(TypeId::of::<T>()))
    }

    /// The template of a [`Mockable`] type.
    #[must_use]
    pub fn of<T: Mockable>() -> Self {
        T::template()
    }

    /// The type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Method names in declaration order.
    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.inner.methods.iter().map(|m| m.name.as_str())
    }

    /// Whether the template declares `method`.
    #[must_use]
    pub fn has_method(&self, method: &str) -> bool {
        self.inner.methods.iter().any(|m| m.name == method)
    }

    /// Whether both templates classify as the same type.
    #[must_use]
    pub fn is_same_type(&self, other: &Template) -> bool {
        self.inner.identity == other.inner.identity
    }

    /// Run the original body of `method`.
    ///
    /// A method declared without a body returns `Undefined`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownMethod`] if the template has no such method.
    pub fn call_original(&self, method: &str, receiver: &Value, args: &[Value]) -> Result<Value> {
        let def = self
            .inner
            .methods
            .iter()
            .find(|m| m.name == method)
            .ok_or_else(|| Error::unknown_method(self.name(), method))?;

        Ok(def
            .body
            .as_ref()
            .map_or(Value::Undefined, |body| body(receiver, args)))
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("name", &self.inner.name)
            .field("methods", &self.method_names().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder returned by [`Template::builder`] and [`Template::builder_for`].
pub struct TemplateBuilder {
    name: String,
    identity: Identity,
    methods: Vec<MethodDef>,
}

impl TemplateBuilder {
    fn new(name: String, identity: Identity) -> Self {
        Self {
            name,
            identity,
            methods: Vec::new(),
        }
    }

    /// Declare a method without an original body.
    #[must_use]
    pub fn method(mut self, name: impl Into<String>) -> Self {
        self.define(MethodDef {
            name: name.into(),
            body: None,
        });
        self
    }

    /// Declare a method with its original body.
    #[must_use]
    pub fn method_with<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Value + Send + Sync + 'static,
    {
        self.define(MethodDef {
            name: name.into(),
            body: Some(Arc::new(body)),
        });
        self
    }

    /// Finish the template.
    #[must_use]
    pub fn build(self) -> Template {
        Template {
            inner: Arc::new(TemplateInner {
                name: self.name,
                identity: self.identity,
                methods: self.methods,
            }),
        }
    }

    // A redefinition replaces the earlier one but keeps its position.
    fn define(&mut self, def: MethodDef) {
        match self.methods.iter_mut().find(|m| m.name == def.name) {
            Some(existing) => *existing = def,
            None => self.methods.push(def),
        }
    }
}

/// Types that can describe themselves as a [`Template`].
///
/// Usually derived with the `#[testkit_mock::template]` attribute on an
/// inherent `impl` block.
pub trait Mockable: 'static {
    /// The template for this type.
    fn template() -> Template;
}
