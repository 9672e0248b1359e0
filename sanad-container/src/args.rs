//! Explicit values and resolved arguments.
//!
//! [`Values`] is what callers hand in: name → value overrides for a
//! single resolution. [`Args`] is what comes out of parameter
//! resolution: every parameter of a constructor or callable, in
//! declaration order, ready to be consumed.

use std::any::{Any, type_name};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Result, SanadError, TypeMismatchError, UnresolvableParameterError};
use crate::reflect::Instance;

/// Downcasts a resolved instance to its concrete type.
///
/// `name` is only used in the error message.
pub fn downcast<T: Any + Send + Sync>(instance: Instance, name: &str) -> Result<Arc<T>> {
    instance.downcast::<T>().map_err(|_| {
        SanadError::TypeMismatch(TypeMismatchError {
            name: name.to_string(),
            expected: type_name::<T>(),
        })
    })
}

/// Explicit values for one resolution, keyed by parameter name.
///
/// Passing values through [`Container::resolve`](crate::container::Container::resolve)
/// makes the result non-canonical: it is never cached.
///
/// # Examples
/// ```
/// use sanad_container::args::Values;
///
/// let values = Values::new()
///     .with("qux", Some(String::from("x")))
///     .with("retries", 3u32);
///
/// assert_eq!(values.len(), 2);
/// assert!(values.contains("qux"));
/// ```
#[derive(Clone, Default)]
pub struct Values {
    entries: HashMap<String, Instance>,
}

impl Values {
    /// Creates an empty set of values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value, wrapping it into an [`Instance`].
    ///
    /// Pass an existing `Arc<T>` through [`with_instance`](Values::with_instance)
    /// instead; `with` would wrap it a second time.
    pub fn with<T: Any + Send + Sync>(self, name: impl Into<String>, value: T) -> Self {
        debug_assert!(
            !type_name::<T>().starts_with("alloc::sync::Arc<"),
            "Values::with got an Arc; use Values::with_instance to keep it shared"
        );
        self.with_instance(name, Arc::new(value))
    }

    /// Adds an already shared instance, keeping its identity.
    pub fn with_instance(mut self, name: impl Into<String>, instance: Instance) -> Self {
        self.insert(name, instance);
        self
    }

    /// Inserts or replaces a value.
    pub fn insert(&mut self, name: impl Into<String>, instance: Instance) {
        self.entries.insert(name.into(), instance);
    }

    pub fn get(&self, name: &str) -> Option<&Instance> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Instance)> for Values {
    fn from_iter<I: IntoIterator<Item = (String, Instance)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl fmt::Debug for Values {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Values").field("names", &names).finish()
    }
}

/// Resolved arguments, in parameter declaration order.
///
/// Constructors and callables pull their inputs out by name:
///
/// ```rust,ignore
/// TypeInfo::of::<Bar>()
///     .param(Parameter::of::<Foo>("foo"))
///     .constructor(|args| Ok(Bar { foo: args.arc::<Foo>("foo")? }))
/// ```
#[derive(Clone, Default)]
pub struct Args {
    entries: Vec<(Cow<'static, str>, Instance)>,
}

impl Args {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, name: Cow<'static, str>, instance: Instance) {
        self.entries.push((name, instance));
    }

    /// Returns the raw instance for `name`, if resolved.
    pub fn get(&self, name: &str) -> Option<&Instance> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, instance)| instance)
    }

    /// Returns the raw instance for `name`.
    pub fn instance(&self, name: &str) -> Result<Instance> {
        self.get(name).cloned().ok_or_else(|| {
            SanadError::UnresolvableParameter(UnresolvableParameterError {
                parameter: name.to_string(),
                owner: None,
            })
        })
    }

    /// Returns the argument `name` as a shared `Arc<T>`, keeping identity.
    pub fn arc<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
        downcast(self.instance(name)?, name)
    }

    /// Returns a clone of the argument `name`.
    ///
    /// Used for plain values (`String`, `Option<String>`, numbers).
    pub fn cloned<T: Any + Send + Sync + Clone>(&self, name: &str) -> Result<T> {
        Ok(T::clone(&*self.arc::<T>(name)?))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parameter names, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Instance)> {
        self.entries
            .iter()
            .map(|(name, instance)| (name.as_ref(), instance))
    }

    /// Converts into a name → instance map.
    pub fn into_map(self) -> HashMap<String, Instance> {
        self.entries
            .into_iter()
            .map(|(name, instance)| (name.into_owned(), instance))
            .collect()
    }
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(entries: Vec<(&'static str, Instance)>) -> Args {
        let mut args = Args::with_capacity(entries.len());
        for (name, instance) in entries {
            args.push(Cow::Borrowed(name), instance);
        }
        args
    }

    #[test]
    fn values_replace_by_name() {
        let values = Values::new().with("qux", 1u8).with("qux", 2u8);
        assert_eq!(values.len(), 1);
        let qux = downcast::<u8>(values.get("qux").cloned().unwrap(), "qux").unwrap();
        assert_eq!(*qux, 2);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "with_instance")]
    fn values_with_rejects_shared_values() {
        let _ = Values::new().with("foo", Arc::new(1u8));
    }

    #[test]
    fn values_keep_shared_identity() {
        let shared: Instance = Arc::new(String::from("shared"));
        let values = Values::new().with_instance("s", shared.clone());
        assert!(Arc::ptr_eq(values.get("s").unwrap(), &shared));
    }

    #[test]
    fn args_preserve_declaration_order() {
        let args = args(vec![
            ("b", Arc::new(1u32) as Instance),
            ("a", Arc::new(2u32) as Instance),
        ]);
        assert_eq!(args.names().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn args_typed_access() {
        let args = args(vec![
            ("qux", Arc::new(Some(String::from("x"))) as Instance),
            ("count", Arc::new(7u32) as Instance),
        ]);

        assert_eq!(args.cloned::<Option<String>>("qux").unwrap(), Some("x".to_string()));
        assert_eq!(*args.arc::<u32>("count").unwrap(), 7);
    }

    #[test]
    fn args_type_mismatch() {
        let args = args(vec![("count", Arc::new(7u32) as Instance)]);

        match args.arc::<String>("count").unwrap_err() {
            SanadError::TypeMismatch(err) => {
                assert_eq!(err.name, "count");
                assert!(err.expected.contains("String"));
            }
            other => panic!("Expected TypeMismatch, got: {other:?}"),
        }
    }

    #[test]
    fn args_missing_name() {
        let args = Args::default();
        assert!(matches!(
            args.instance("nope"),
            Err(SanadError::UnresolvableParameter(_))
        ));
    }

    #[test]
    fn args_into_map() {
        let map = args(vec![("foo", Arc::new(()) as Instance)]).into_map();
        assert!(map.contains_key("foo"));
    }
}
