//! Callables the container can invoke with resolved arguments.
//!
//! A [`Callable`] is one of:
//! - [`Callable::Function`]: a closure or free function plus its parameters
//! - [`Callable::Method`]: a method bound to a receiver instance
//! - [`Callable::Static`]: a static method looked up in the type catalog
//! - [`Callable::Path`]: the `"Type::method"` string form of a static method
//!
//! Methods are declared on a type's [`TypeInfo`](crate::reflect::TypeInfo)
//! with `static_method` / `method`.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use sanad_support::rendering::shorten_type_name;

use crate::args::Args;
use crate::error::{InvalidCallableError, Result, SanadError};
use crate::key::DependencyKey;
use crate::reflect::{Injectable, Instance, Parameter};

/// Body of a [`Function`].
pub type FunctionBody = Arc<dyn Fn(Args) -> Result<Instance> + Send + Sync>;

/// A closure or free function together with its parameter list.
#[derive(Clone)]
pub struct Function {
    params: Vec<Parameter>,
    body: FunctionBody,
}

impl Function {
    pub fn new<R: Any + Send + Sync>(
        params: Vec<Parameter>,
        body: impl Fn(Args) -> Result<R> + Send + Sync + 'static,
    ) -> Self {
        Self {
            params,
            body: Arc::new(move |args| body(args).map(|value| Arc::new(value) as Instance)),
        }
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    pub(crate) fn invoke(&self, args: Args) -> Result<Instance> {
        (self.body)(args)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function").field("params", &self.params).finish()
    }
}

/// Something `Container::call` can invoke.
#[derive(Clone)]
pub enum Callable {
    /// Closure or free function.
    Function(Function),
    /// Method `name` of `target`, invoked on `receiver`.
    Method {
        receiver: Instance,
        target: DependencyKey,
        name: Cow<'static, str>,
    },
    /// Static method `name` of `target`.
    Static {
        target: DependencyKey,
        name: Cow<'static, str>,
    },
    /// `"Type::method"`, parsed when called.
    Path(String),
}

impl Callable {
    /// Wraps a closure taking resolved arguments.
    pub fn function<R: Any + Send + Sync>(
        params: Vec<Parameter>,
        body: impl Fn(Args) -> Result<R> + Send + Sync + 'static,
    ) -> Self {
        Callable::Function(Function::new(params, body))
    }

    /// Method `name` on `receiver`.
    pub fn method<T: Injectable>(receiver: Arc<T>, name: impl Into<Cow<'static, str>>) -> Self {
        Callable::Method {
            receiver,
            target: T::key(),
            name: name.into(),
        }
    }

    /// Static method `name` of `target`.
    pub fn static_method(
        target: impl Into<DependencyKey>,
        name: impl Into<Cow<'static, str>>,
    ) -> Self {
        Callable::Static {
            target: target.into(),
            name: name.into(),
        }
    }

    /// Splits a `Path` into its target and method name.
    ///
    /// Module qualifiers are dropped: catalog keys are short type names.
    ///
    /// # Errors
    /// [`SanadError::InvalidCallable`] if the path is not `Type::method`.
    pub(crate) fn split_path(path: &str) -> Result<(DependencyKey, &str)> {
        match path.rsplit_once("::") {
            Some((target, name)) if !target.is_empty() && !name.is_empty() => {
                Ok((DependencyKey::from(shorten_type_name(target)), name))
            }
            _ => Err(SanadError::InvalidCallable(InvalidCallableError {
                callable: format!("{path:?}"),
                reason: "expected \"Type::method\"".to_string(),
            })),
        }
    }
}

impl From<&str> for Callable {
    fn from(path: &str) -> Self {
        Callable::Path(path.to_string())
    }
}

impl From<Function> for Callable {
    fn from(function: Function) -> Self {
        Callable::Function(function)
    }
}

impl fmt::Display for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Function(function) => write!(f, "closure({} params)", function.params.len()),
            Callable::Method { target, name, .. } => write!(f, "{target}->{name}"),
            Callable::Static { target, name } => write!(f, "{target}::{name}"),
            Callable::Path(path) => write!(f, "{path:?}"),
        }
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callable({self})")
    }
}
