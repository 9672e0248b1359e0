//! Type metadata: what the container knows about a type.
//!
//! Rust has no runtime reflection, so every type the container can build
//! carries a [`TypeInfo`]: its constructor parameters (name, declared
//! type, default), a constructor function, an optional provider
//! capability and any methods `call` may invoke.
//!
//! `TypeInfo`s come from two places:
//! - `#[derive(Injectable)]`, which generates them and submits them to
//!   the process-wide catalog through [`inventory`]
//! - manual registration with [`Container::register_type`](crate::container::Container::register_type)
//!
//! # Examples
//! ```
//! use sanad_container::prelude::*;
//! use std::sync::Arc;
//!
//! struct Foo;
//! struct Bar {
//!     foo: Arc<Foo>,
//!     qux: Option<String>,
//! }
//!
//! let container = Container::builder()
//!     .discover_types(false)
//!     .register_type(TypeInfo::of::<Foo>().constructor(|_| Ok(Foo)))
//!     .register_type(
//!         TypeInfo::of::<Bar>()
//!             .param(Parameter::of::<Foo>("foo"))
//!             .param(Parameter::untyped("qux").default_value(None::<String>))
//!             .constructor(|args| {
//!                 Ok(Bar {
//!                     foo: args.arc("foo")?,
//!                     qux: args.cloned("qux")?,
//!                 })
//!             }),
//!     )
//!     .build();
//!
//! let bar: Arc<Bar> = container.get_as("Bar").unwrap();
//! assert!(bar.qux.is_none());
//! ```

use std::any::{Any, TypeId, type_name};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::args::Args;
use crate::container::Container;
use crate::error::{InvalidCallableError, Result, SanadError};
use crate::key::DependencyKey;
use crate::provider::Provider;
use crate::scope::Scope;

/// A resolved object. Identity is `Arc` pointer identity.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Produces the default value of a parameter.
pub type DefaultFn = Arc<dyn Fn() -> Instance + Send + Sync>;

/// Builds an instance from resolved constructor arguments.
pub type ConstructFn = Arc<dyn Fn(Args) -> Result<Instance> + Send + Sync>;

/// The provider capability: builds the instance for a key on its own.
pub type ProvideFn = fn(&DependencyKey, &Container) -> Result<Instance>;

/// Invokes a method; the receiver is `None` for static methods.
pub type MethodFn = Arc<dyn Fn(Option<&Instance>, Args) -> Result<Instance> + Send + Sync>;

/// Rust type of the value behind an instance (not of the `Arc`).
pub(crate) fn type_id_of(instance: &Instance) -> TypeId {
    let any: &dyn Any = &**instance;
    any.type_id()
}

// ═══════════════════════════════════════════
// Parameter
// ═══════════════════════════════════════════

/// One constructor or callable parameter.
#[derive(Clone)]
pub struct Parameter {
    name: Cow<'static, str>,
    declared: Option<DependencyKey>,
    default: Option<DefaultFn>,
}

impl Parameter {
    /// A parameter with no declared type: it needs an explicit value or a default.
    pub fn untyped(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            declared: None,
            default: None,
        }
    }

    /// A parameter whose value the container resolves through `key`.
    pub fn typed(name: impl Into<Cow<'static, str>>, key: impl Into<DependencyKey>) -> Self {
        Self {
            declared: Some(key.into()),
            ..Self::untyped(name)
        }
    }

    /// A parameter declared as Rust type `T`.
    pub fn of<T: ?Sized + 'static>(name: impl Into<Cow<'static, str>>) -> Self {
        Self::typed(name, DependencyKey::of::<T>())
    }

    /// Gives the parameter a default, produced fresh on each use.
    pub fn with_default<T: Any + Send + Sync>(
        mut self,
        default: impl Fn() -> T + Send + Sync + 'static,
    ) -> Self {
        self.default = Some(Arc::new(move || Arc::new(default()) as Instance));
        self
    }

    /// Gives the parameter a default that is already shared, such as an
    /// `Arc<T>` a field should hold directly.
    pub fn with_default_instance(
        mut self,
        default: impl Fn() -> Instance + Send + Sync + 'static,
    ) -> Self {
        self.default = Some(Arc::new(default));
        self
    }

    /// Gives the parameter a fixed default value.
    pub fn default_value<T: Any + Send + Sync + Clone>(self, value: T) -> Self {
        self.with_default(move || value.clone())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn owned_name(&self) -> Cow<'static, str> {
        self.name.clone()
    }

    /// The declared type, `None` for primitive/untyped parameters.
    pub fn declared(&self) -> Option<&DependencyKey> {
        self.declared.as_ref()
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Produces the default value, if the parameter has one.
    pub fn default_instance(&self) -> Option<Instance> {
        self.default.as_ref().map(|default| default())
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("name", &self.name)
            .field("declared", &self.declared)
            .field("has_default", &self.has_default())
            .finish()
    }
}

// ═══════════════════════════════════════════
// Method
// ═══════════════════════════════════════════

/// A method `call` can invoke.
pub struct Method {
    params: Vec<Parameter>,
    receiver: Option<TypeId>,
    invoke: MethodFn,
}

impl Method {
    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    /// Returns `true` if the method needs a receiver instance.
    pub fn is_bound(&self) -> bool {
        self.receiver.is_some()
    }

    /// Checks that `receiver` is of the type this method was declared on.
    pub(crate) fn accepts(&self, receiver: &Instance) -> bool {
        match self.receiver {
            Some(expected) => type_id_of(receiver) == expected,
            None => true,
        }
    }

    pub(crate) fn invoke(&self, receiver: Option<&Instance>, args: Args) -> Result<Instance> {
        (self.invoke)(receiver, args)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("params", &self.params)
            .field("bound", &self.is_bound())
            .finish()
    }
}

// ═══════════════════════════════════════════
// TypeInfo
// ═══════════════════════════════════════════

/// Everything the container knows about one type.
#[derive(Clone)]
pub struct TypeInfo {
    key: DependencyKey,
    type_id: Option<TypeId>,
    scope: Scope,
    params: Vec<Parameter>,
    constructor: Option<ConstructFn>,
    provider: Option<ProvideFn>,
    methods: HashMap<Cow<'static, str>, Arc<Method>>,
}

impl TypeInfo {
    /// Metadata for Rust type `T`, keyed by its short name.
    pub fn of<T: Any + Send + Sync>() -> Self {
        Self {
            type_id: Some(TypeId::of::<T>()),
            ..Self::named(DependencyKey::of::<T>())
        }
    }

    /// Metadata for a name with no Rust type behind it, such as a
    /// provider-only entry.
    pub fn named(key: impl Into<DependencyKey>) -> Self {
        Self {
            key: key.into(),
            type_id: None,
            scope: Scope::Singleton,
            params: Vec::new(),
            constructor: None,
            provider: None,
            methods: HashMap::new(),
        }
    }

    /// Registers the type under a different key.
    pub fn with_key(mut self, key: impl Into<DependencyKey>) -> Self {
        self.key = key.into();
        self
    }

    /// Appends a constructor parameter.
    pub fn param(mut self, param: Parameter) -> Self {
        self.params.push(param);
        self
    }

    /// Sets the constructor.
    pub fn constructor<T: Any + Send + Sync>(
        mut self,
        construct: impl Fn(Args) -> Result<T> + Send + Sync + 'static,
    ) -> Self {
        self.constructor = Some(Arc::new(move |args| {
            construct(args).map(|value| Arc::new(value) as Instance)
        }));
        self
    }

    /// Marks the type as self-identifying transient: its instances are
    /// never cached.
    pub fn transient(mut self) -> Self {
        self.scope = Scope::Transient;
        self
    }

    /// Gives the type the provider capability of `P`.
    pub fn provided_by<P: Provider>(mut self) -> Self {
        self.provider = Some(P::provide);
        self
    }

    /// Adds a static method.
    pub fn static_method<R: Any + Send + Sync>(
        mut self,
        name: impl Into<Cow<'static, str>>,
        params: Vec<Parameter>,
        body: impl Fn(Args) -> Result<R> + Send + Sync + 'static,
    ) -> Self {
        let method = Method {
            params,
            receiver: None,
            invoke: Arc::new(move |_, args| body(args).map(|value| Arc::new(value) as Instance)),
        };
        self.methods.insert(name.into(), Arc::new(method));
        self
    }

    /// Adds a method invoked on an instance of `T`.
    pub fn method<T: Any + Send + Sync, R: Any + Send + Sync>(
        mut self,
        name: impl Into<Cow<'static, str>>,
        params: Vec<Parameter>,
        body: impl Fn(&T, Args) -> Result<R> + Send + Sync + 'static,
    ) -> Self {
        let name = name.into();
        let method_name = name.clone();
        let method = Method {
            params,
            receiver: Some(TypeId::of::<T>()),
            invoke: Arc::new(move |receiver, args| {
                let this = receiver
                    .and_then(|receiver| receiver.downcast_ref::<T>())
                    .ok_or_else(|| {
                        SanadError::InvalidCallable(InvalidCallableError {
                            callable: method_name.to_string(),
                            reason: format!("receiver is not a {}", type_name::<T>()),
                        })
                    })?;
                body(this, args).map(|value| Arc::new(value) as Instance)
            }),
        };
        self.methods.insert(name, Arc::new(method));
        self
    }

    pub fn key(&self) -> &DependencyKey {
        &self.key
    }

    pub fn type_id(&self) -> Option<TypeId> {
        self.type_id
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Constructor parameters, in declaration order.
    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    pub fn constructor_fn(&self) -> Option<&ConstructFn> {
        self.constructor.as_ref()
    }

    pub fn provider(&self) -> Option<ProvideFn> {
        self.provider
    }

    pub fn method_named(&self, name: &str) -> Option<Arc<Method>> {
        self.methods.get(name).cloned()
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<&str> = self.methods.keys().map(|name| name.as_ref()).collect();
        methods.sort_unstable();
        f.debug_struct("TypeInfo")
            .field("key", &self.key)
            .field("scope", &self.scope)
            .field("params", &self.params)
            .field("constructible", &self.constructor.is_some())
            .field("provider", &self.provider.is_some())
            .field("methods", &methods)
            .finish()
    }
}

// ═══════════════════════════════════════════
// Injectable + discovery
// ═══════════════════════════════════════════

/// A type that describes its own construction.
///
/// Usually derived:
///
/// ```rust,ignore
/// #[derive(Injectable)]
/// struct Bar {
///     foo: Arc<Foo>,
///     #[inject(default = "None")]
///     qux: Option<String>,
/// }
/// ```
pub trait Injectable: Any + Send + Sync + Sized {
    /// Metadata used to construct the type.
    fn type_info() -> TypeInfo;

    /// Key the type is registered under.
    fn key() -> DependencyKey {
        DependencyKey::of::<Self>()
    }
}

/// A catalog entry submitted at link time by `#[derive(Injectable)]`.
pub struct TypeEntry {
    describe: fn() -> TypeInfo,
}

impl TypeEntry {
    pub const fn new(describe: fn() -> TypeInfo) -> Self {
        Self { describe }
    }

    pub fn describe(&self) -> TypeInfo {
        (self.describe)()
    }
}

inventory::collect!(TypeEntry);
