//! # The Container: heart of Sanad
//!
//! Maps a requested type name to a constructed object graph.
//!
//! # Resolution pipeline
//! ```text
//! get / resolve(key, values)
//!    │
//!    ├─ concrete(key)          follow bindings  A → B → C
//!    ├─ cached(C)              instance cache hit? return it (not with values)
//!    ├─ provider for C         provider owns construction
//!    ├─ construct(C)           resolve each constructor parameter:
//!    │                           custom resolver > values > default > get(type)
//!    └─ cache policy           skip if transient or values were passed
//! ```
//!
//! # Examples
//! ```rust
//! use sanad_container::prelude::*;
//! use std::sync::Arc;
//!
//! struct Foo;
//! struct Foo2;
//!
//! let container = Container::builder()
//!     .discover_types(false)
//!     .register_type(TypeInfo::of::<Foo>().constructor(|_| Ok(Foo)))
//!     .register_type(TypeInfo::of::<Foo2>().constructor(|_| Ok(Foo2)))
//!     .bind("FooInterface", "Foo")
//!     .bind("Foo", "Foo2")
//!     .build();
//!
//! // Bindings resolve to the most concrete type
//! let foo: Arc<Foo2> = container.get_as("FooInterface").expect("Failed to resolve");
//!
//! // Shared by default
//! let again: Arc<Foo2> = container.get_as("Foo2").expect("Failed to resolve");
//! assert!(Arc::ptr_eq(&foo, &again));
//! ```

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::{DashMap, DashSet};
use parking_lot::RwLock;
use sanad_support::rendering::{render_chain, suggest_similar};
use tracing::{debug, instrument, trace, warn};

use crate::args::{Args, Values, downcast};
use crate::callable::{Callable, Function};
use crate::error::{
    CircularDependencyError, InvalidCallableError, Result, SanadError, UnknownTypeError,
    UnresolvableParameterError,
};
use crate::graph::GraphValidator;
use crate::key::DependencyKey;
use crate::reflect::{Injectable, Instance, Method, Parameter, ProvideFn, TypeInfo, type_id_of};
use crate::registry::{TypeRegistry, discovered};
use crate::scope::Scope;
use crate::settings::{ContainerSettings, ProviderPolicy};

/// Custom argument resolver for [`Container::call`]: given a parameter's
/// declared type and name, return a value or `None` to fall through.
pub type ArgResolver<'a> = &'a dyn Fn(Option<&DependencyKey>, &str) -> Option<Instance>;

static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(1);

// ============================================================
// ContainerBuilder
// ============================================================

/// Builds a [`Container`] with settings and initial registrations.
///
/// Everything the builder does can also be done on a live container;
/// the builder just keeps setup in one expression.
pub struct ContainerBuilder {
    settings: ContainerSettings,
    types: TypeRegistry,
    bindings: Vec<(DependencyKey, DependencyKey)>,
    transient: Vec<DependencyKey>,
    providers: Vec<(DependencyKey, DependencyKey)>,
}

impl ContainerBuilder {
    fn new() -> Self {
        Self {
            settings: ContainerSettings::default(),
            types: TypeRegistry::new(),
            bindings: Vec::new(),
            transient: Vec::new(),
            providers: Vec::new(),
        }
    }

    /// Replace all settings.
    pub fn settings(mut self, settings: ContainerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn provider_policy(mut self, policy: ProviderPolicy) -> Self {
        self.settings.provider_policy = policy;
        self
    }

    /// Whether types submitted by `#[derive(Injectable)]` are visible.
    pub fn discover_types(mut self, discover: bool) -> Self {
        self.settings.discover_types = discover;
        self
    }

    pub fn max_suggestions(mut self, max: usize) -> Self {
        self.settings.max_suggestions = max;
        self
    }

    /// Register type metadata.
    pub fn register_type(mut self, info: TypeInfo) -> Self {
        self.types.register(info);
        self
    }

    /// Register the metadata of an [`Injectable`] type.
    pub fn register<T: Injectable>(self) -> Self {
        self.register_type(T::type_info().with_key(T::key()))
    }

    pub fn bind(
        mut self,
        abstract_key: impl Into<DependencyKey>,
        concrete: impl Into<DependencyKey>,
    ) -> Self {
        self.bindings.push((abstract_key.into(), concrete.into()));
        self
    }

    pub fn transient(mut self, concrete: impl Into<DependencyKey>) -> Self {
        self.transient.push(concrete.into());
        self
    }

    pub fn provider(
        mut self,
        abstract_key: impl Into<DependencyKey>,
        provider: impl Into<DependencyKey>,
    ) -> Self {
        self.providers.push((abstract_key.into(), provider.into()));
        self
    }

    /// Build the container.
    pub fn build(self) -> Container {
        let container = Container {
            id: NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed),
            settings: self.settings,
            bindings: DashMap::new(),
            instances: DashMap::new(),
            transient: DashSet::new(),
            providers: DashMap::new(),
            types: RwLock::new(self.types),
        };

        for (abstract_key, concrete) in self.bindings {
            container.bind(abstract_key, concrete);
        }
        for concrete in self.transient {
            container.transient(concrete);
        }
        for (abstract_key, provider) in self.providers {
            container.provider(abstract_key, provider);
        }

        debug!(container = ?container, "Built container");
        container
    }
}

// ═══════════════════════════════════════════
// Container
// ═══════════════════════════════════════════

/// Dependency injection container.
///
/// Holds bindings, cached instances, transient markers, provider
/// registrations and type metadata. All methods take `&self`; the
/// registries are concurrent maps, so a container can be shared
/// behind an `Arc`.
///
/// Two threads resolving the same uncached key at the same time may
/// both construct it; the last one to finish is what stays cached.
pub struct Container {
    id: u64,
    settings: ContainerSettings,
    bindings: DashMap<DependencyKey, DependencyKey>,
    instances: DashMap<DependencyKey, Instance>,
    transient: DashSet<DependencyKey>,
    providers: DashMap<DependencyKey, DependencyKey>,
    types: RwLock<TypeRegistry>,
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Container {
    /// Create a container with default settings.
    pub fn new() -> Self {
        ContainerBuilder::new().build()
    }

    /// Create a new builder.
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    pub fn settings(&self) -> &ContainerSettings {
        &self.settings
    }

    // ── Registration ──

    /// Resolve `abstract_key` as `concrete` from now on.
    pub fn bind(&self, abstract_key: impl Into<DependencyKey>, concrete: impl Into<DependencyKey>) {
        let (from, to) = (abstract_key.into(), concrete.into());
        debug!(from = %from, to = %to, "Registered binding");
        self.bindings.insert(from, to);
    }

    /// Use `instance` for every later cacheable resolution of `concrete`.
    pub fn instance(&self, concrete: impl Into<DependencyKey>, instance: Instance) {
        let key = concrete.into();
        debug!(key = %key, "Registered instance");
        self.instances.insert(key, instance);
    }

    /// Never cache `concrete`.
    pub fn transient(&self, concrete: impl Into<DependencyKey>) {
        let key = concrete.into();
        debug!(key = %key, "Marked transient");
        self.transient.insert(key);
    }

    /// Build `abstract_key` with the provider capability of type `provider`.
    pub fn provider(
        &self,
        abstract_key: impl Into<DependencyKey>,
        provider: impl Into<DependencyKey>,
    ) {
        let (key, provider) = (abstract_key.into(), provider.into());
        debug!(key = %key, provider = %provider, "Registered provider");
        self.providers.insert(key, provider);
    }

    /// Register type metadata, replacing earlier metadata for the same key.
    pub fn register_type(&self, info: TypeInfo) {
        self.types.write().register(info);
    }

    /// Register the metadata of an [`Injectable`] type.
    pub fn register<T: Injectable>(&self) {
        self.register_type(T::type_info().with_key(T::key()));
    }

    /// Drop the cached instance of `concrete`, returning it.
    pub fn forget_instance(&self, concrete: impl Into<DependencyKey>) -> Option<Instance> {
        self.instances
            .remove(&concrete.into())
            .map(|(_, instance)| instance)
    }

    /// Drop every cached instance.
    pub fn clear_instances(&self) {
        debug!(count = self.instances.len(), "Clearing instances");
        self.instances.clear();
    }

    // ── Lookups ──

    /// Follow the binding chain of `abstract_key` to its final type.
    ///
    /// # Errors
    /// [`SanadError::CircularDependency`] if the chain loops.
    pub fn concrete(&self, abstract_key: impl Into<DependencyKey>) -> Result<DependencyKey> {
        let mut current = abstract_key.into();
        let mut chain: Vec<DependencyKey> = Vec::new();

        loop {
            let next = match self.bindings.get(&current) {
                Some(entry) => entry.value().clone(),
                None => break,
            };
            trace!(from = %current, to = %next, "Following binding");
            chain.push(current);

            if let Some(start) = chain.iter().position(|key| *key == next) {
                let mut cycle = chain.split_off(start);
                cycle.push(next);
                warn!(cycle = %render_chain(&cycle), "Circular binding detected");
                return Err(SanadError::CircularDependency(CircularDependencyError {
                    chain: cycle,
                }));
            }
            current = next;
        }

        Ok(current)
    }

    /// The cached instance of `concrete`, if any.
    pub fn cached(&self, concrete: impl Into<DependencyKey>) -> Option<Instance> {
        self.instances
            .get(&concrete.into())
            .map(|entry| entry.value().clone())
    }

    /// Metadata for `key`: explicit registrations first, then derived types.
    pub fn type_info(&self, key: impl Into<DependencyKey>) -> Option<Arc<TypeInfo>> {
        self.lookup(&key.into())
    }

    /// Whether `concrete` was marked with [`Container::transient`].
    pub fn is_transient(&self, concrete: impl Into<DependencyKey>) -> bool {
        self.transient.contains(&concrete.into())
    }

    // ── Resolution ──

    /// Resolve `abstract_key`, reusing and filling the instance cache.
    pub fn get(&self, abstract_key: impl Into<DependencyKey>) -> Result<Instance> {
        self.solve(&abstract_key.into(), None, None)
    }

    /// Resolve `abstract_key` with explicit constructor values.
    ///
    /// Values override defaults and container resolution for the named
    /// parameters. The instance cache is bypassed and the result is never
    /// cached, even if `values` is empty.
    pub fn resolve(&self, abstract_key: impl Into<DependencyKey>, values: &Values) -> Result<Instance> {
        self.solve(&abstract_key.into(), Some(values), None)
    }

    /// [`get`](Container::get), downcast to `T`.
    pub fn get_as<T: Any + Send + Sync>(&self, abstract_key: impl Into<DependencyKey>) -> Result<Arc<T>> {
        let key = abstract_key.into();
        let instance = self.solve(&key, None, None)?;
        downcast(instance, key.name())
    }

    /// Resolve an [`Injectable`] type by its own key.
    pub fn make<T: Injectable>(&self) -> Result<Arc<T>> {
        self.get_as::<T>(T::key())
    }

    /// Invoke `callable` with resolved arguments.
    ///
    /// Per parameter: `custom` resolver, then `values`, then the
    /// parameter default, then the container.
    pub fn call(
        &self,
        callable: &Callable,
        values: &Values,
        custom: Option<ArgResolver<'_>>,
    ) -> Result<Instance> {
        let target = self.callable_target(callable)?;
        let args = self.resolve_parameters(target.params(), None, Some(values), custom)?;
        debug!(callable = %callable, args = args.len(), "Calling");
        target.invoke(args)
    }

    /// [`call`](Container::call), downcast to `R`.
    pub fn call_as<R: Any + Send + Sync>(
        &self,
        callable: &Callable,
        values: &Values,
        custom: Option<ArgResolver<'_>>,
    ) -> Result<Arc<R>> {
        let result = self.call(callable, values, custom)?;
        downcast(result, &callable.to_string())
    }

    /// Resolve the arguments `call` would pass, without invoking.
    pub fn call_args(
        &self,
        callable: &Callable,
        values: &Values,
        custom: Option<ArgResolver<'_>>,
    ) -> Result<Args> {
        let target = self.callable_target(callable)?;
        self.resolve_parameters(target.params(), None, Some(values), custom)
    }

    /// Check that `key` could be resolved, without constructing anything.
    ///
    /// # Errors
    /// - [`SanadError::CircularDependency`]: cycle in bindings or constructors
    /// - [`SanadError::UnknownType`]: a required type has no metadata
    /// - [`SanadError::UnresolvableParameter`]: a parameter can never get a value
    #[instrument(skip(self, key), fields(key = tracing::field::Empty))]
    pub fn validate(&self, key: impl Into<DependencyKey>) -> Result<()> {
        let key = key.into();
        tracing::Span::current().record("key", tracing::field::display(&key));
        GraphValidator::new(self).validate(&key)
    }

    // ── Internals ──

    fn solve(
        &self,
        abstract_key: &DependencyKey,
        values: Option<&Values>,
        required_by: Option<&DependencyKey>,
    ) -> Result<Instance> {
        let concrete = self.concrete(abstract_key)?;

        if values.is_none() {
            if let Some(instance) = self.cached(&concrete) {
                trace!(key = %concrete, "Using cached instance");
                return Ok(instance);
            }
        }

        let _guard = ResolutionGuard::enter(self.id, &concrete)?;

        let instance = match self.provider_for(&concrete, required_by)? {
            Some(instance) => instance,
            None => self.construct(&concrete, values, required_by)?,
        };

        self.apply_cache_policy(&concrete, &instance, values.is_some());
        Ok(instance)
    }

    /// Builds `concrete` through its provider, if one applies.
    fn provider_for(
        &self,
        concrete: &DependencyKey,
        required_by: Option<&DependencyKey>,
    ) -> Result<Option<Instance>> {
        match self.provider_fn(concrete, required_by)? {
            Some(provide) => {
                trace!(key = %concrete, "Using provider");
                provide(concrete, self).map(Some)
            }
            None => Ok(None),
        }
    }

    /// The provider capability that builds `concrete`, per policy.
    pub(crate) fn provider_fn(
        &self,
        concrete: &DependencyKey,
        required_by: Option<&DependencyKey>,
    ) -> Result<Option<ProvideFn>> {
        let registered = self
            .providers
            .get(concrete)
            .map(|entry| entry.value().clone());

        if let Some(provider_key) = registered {
            let info = self.reflect(&provider_key, required_by.or(Some(concrete)))?;
            match info.provider() {
                Some(provide) => return Ok(Some(provide)),
                None => warn!(
                    key = %concrete,
                    provider = %provider_key,
                    "Registered provider has no provider capability, ignoring it"
                ),
            }
        }

        if self.settings.provider_policy == ProviderPolicy::SelfProviding {
            if let Some(provide) = self.lookup(concrete).and_then(|info| info.provider()) {
                return Ok(Some(provide));
            }
        }

        Ok(None)
    }

    fn construct(
        &self,
        concrete: &DependencyKey,
        values: Option<&Values>,
        required_by: Option<&DependencyKey>,
    ) -> Result<Instance> {
        let info = self.reflect(concrete, required_by)?;
        let construct = info.constructor_fn().cloned().ok_or_else(|| {
            SanadError::construction(concrete, "no constructor is registered for this type")
        })?;

        let args = self.resolve_parameters(info.params(), Some(concrete), values, None)?;
        trace!(key = %concrete, args = ?args, "Constructing");
        construct(args)
    }

    fn resolve_parameters(
        &self,
        params: &[Parameter],
        owner: Option<&DependencyKey>,
        values: Option<&Values>,
        custom: Option<ArgResolver<'_>>,
    ) -> Result<Args> {
        let mut args = Args::with_capacity(params.len());

        for param in params {
            if let Some(value) = custom.and_then(|resolve| resolve(param.declared(), param.name())) {
                args.push(param.owned_name(), value);
                continue;
            }

            let value = if let Some(value) = values.and_then(|values| values.get(param.name())) {
                value.clone()
            } else if let Some(default) = param.default_instance() {
                default
            } else if let Some(declared) = param.declared() {
                self.solve(declared, None, owner)?
            } else {
                return Err(SanadError::UnresolvableParameter(UnresolvableParameterError {
                    parameter: param.name().to_string(),
                    owner: owner.cloned(),
                }));
            };

            args.push(param.owned_name(), value);
        }

        Ok(args)
    }

    fn apply_cache_policy(&self, concrete: &DependencyKey, instance: &Instance, explicit_values: bool) {
        if self.transient.contains(concrete) {
            trace!(key = %concrete, "Transient key, not caching");
            return;
        }
        let declared = self.lookup(concrete).map(|info| info.scope());
        if !declared.unwrap_or_default().is_cached() || !self.scope_of_instance(instance).is_cached() {
            trace!(key = %concrete, "Transient type, not caching");
            return;
        }
        if explicit_values {
            trace!(key = %concrete, "Built with explicit values, not caching");
            return;
        }

        trace!(key = %concrete, "Caching instance");
        self.instances.insert(concrete.clone(), instance.clone());
    }

    /// Scope the Rust type behind `instance` declares for itself.
    fn scope_of_instance(&self, instance: &Instance) -> Scope {
        let type_id = type_id_of(instance);
        let explicit = self.types.read().scope_of_type(type_id);
        explicit
            .or_else(|| {
                self.settings
                    .discover_types
                    .then(|| discovered().scope_of_type(type_id))
                    .flatten()
            })
            .unwrap_or_default()
    }

    pub(crate) fn lookup(&self, key: &DependencyKey) -> Option<Arc<TypeInfo>> {
        let explicit = self.types.read().get(key);
        explicit.or_else(|| {
            self.settings
                .discover_types
                .then(|| discovered().get(key))
                .flatten()
        })
    }

    /// Metadata for `key`, or an [`SanadError::UnknownType`] with suggestions.
    pub(crate) fn reflect(
        &self,
        key: &DependencyKey,
        required_by: Option<&DependencyKey>,
    ) -> Result<Arc<TypeInfo>> {
        self.lookup(key).ok_or_else(|| {
            SanadError::UnknownType(UnknownTypeError {
                requested: key.clone(),
                required_by: required_by.cloned(),
                suggestions: self.suggestions(key),
            })
        })
    }

    fn suggestions(&self, key: &DependencyKey) -> Vec<String> {
        let mut names: Vec<String> = self
            .types
            .read()
            .keys()
            .map(|k| k.name().to_string())
            .collect();
        if self.settings.discover_types {
            names.extend(discovered().keys().map(|k| k.name().to_string()));
        }
        names.extend(self.bindings.iter().map(|entry| entry.key().name().to_string()));

        suggest_similar(
            key.name(),
            names.iter().map(String::as_str),
            self.settings.max_suggestions,
        )
    }

    fn callable_target<'a>(&self, callable: &'a Callable) -> Result<CallTarget<'a>> {
        match callable {
            Callable::Function(function) => Ok(CallTarget::Function(function)),
            Callable::Method {
                receiver,
                target,
                name,
            } => {
                let method = self.method_of(callable, target, name)?;
                if !method.accepts(receiver) {
                    return Err(invalid_callable(
                        callable,
                        format!("receiver is not an instance of {target}"),
                    ));
                }
                Ok(CallTarget::Method {
                    method,
                    receiver: Some(receiver),
                })
            }
            Callable::Static { target, name } => self.static_target(callable, target, name),
            Callable::Path(path) => {
                let (target, name) = Callable::split_path(path)?;
                self.static_target(callable, &target, name)
            }
        }
    }

    fn static_target<'a>(
        &self,
        callable: &Callable,
        target: &DependencyKey,
        name: &str,
    ) -> Result<CallTarget<'a>> {
        let method = self.method_of(callable, target, name)?;
        if method.is_bound() {
            return Err(invalid_callable(
                callable,
                format!("{target}::{name} needs a receiver, use Callable::method"),
            ));
        }
        Ok(CallTarget::Method {
            method,
            receiver: None,
        })
    }

    fn method_of(&self, callable: &Callable, target: &DependencyKey, name: &str) -> Result<Arc<Method>> {
        self.reflect(target, None)?
            .method_named(name)
            .ok_or_else(|| invalid_callable(callable, format!("{target} has no method {name}")))
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("bindings", &self.bindings.len())
            .field("instances", &self.instances.len())
            .field("transient", &self.transient.len())
            .field("providers", &self.providers.len())
            .field("types", &self.types.read().len())
            .field("settings", &self.settings)
            .finish()
    }
}

fn invalid_callable(callable: &Callable, reason: String) -> SanadError {
    SanadError::InvalidCallable(InvalidCallableError {
        callable: callable.to_string(),
        reason,
    })
}

// ═══════════════════════════════════════════
// Call targets
// ═══════════════════════════════════════════

/// A callable after lookup: parameters known, ready to invoke.
enum CallTarget<'a> {
    Function(&'a Function),
    Method {
        method: Arc<Method>,
        receiver: Option<&'a Instance>,
    },
}

impl CallTarget<'_> {
    fn params(&self) -> &[Parameter] {
        match self {
            CallTarget::Function(function) => function.params(),
            CallTarget::Method { method, .. } => method.params(),
        }
    }

    fn invoke(&self, args: Args) -> Result<Instance> {
        match self {
            CallTarget::Function(function) => function.invoke(args),
            CallTarget::Method { method, receiver } => method.invoke(*receiver, args),
        }
    }
}

// ═══════════════════════════════════════════
// Cycle detection
// ═══════════════════════════════════════════

thread_local! {
    /// Keys under construction on this thread, tagged with the container id.
    static RESOLVING: RefCell<Vec<(u64, DependencyKey)>> = const { RefCell::new(Vec::new()) };
}

/// Marks a key as under construction until dropped.
struct ResolutionGuard;

impl ResolutionGuard {
    fn enter(container: u64, key: &DependencyKey) -> Result<Self> {
        RESOLVING.with(|stack| {
            let mut stack = stack.borrow_mut();

            if let Some(start) = stack.iter().position(|(id, k)| *id == container && k == key) {
                let mut chain: Vec<DependencyKey> = stack[start..]
                    .iter()
                    .filter(|(id, _)| *id == container)
                    .map(|(_, k)| k.clone())
                    .collect();
                chain.push(key.clone());

                warn!(cycle = %render_chain(&chain), "Circular dependency detected");
                return Err(SanadError::CircularDependency(CircularDependencyError { chain }));
            }

            stack.push((container, key.clone()));
            Ok(ResolutionGuard)
        })
    }
}

impl Drop for ResolutionGuard {
    fn drop(&mut self) {
        let _ = RESOLVING.try_with(|stack| stack.borrow_mut().pop());
    }
}

// ═══════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════

pub mod prelude {
    pub use super::{ArgResolver, Container, ContainerBuilder};
    pub use crate::args::{Args, Values};
    pub use crate::callable::{Callable, Function};
    pub use crate::error::{Result, SanadError};
    pub use crate::global::{container, set_container};
    pub use crate::key::DependencyKey;
    pub use crate::provider::Provider;
    pub use crate::reflect::{Injectable, Instance, Parameter, TypeInfo};
    pub use crate::scope::Scope;
    pub use crate::settings::{ContainerSettings, ProviderPolicy};
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
