//! Error types for Sanad container operations.
//!
//! Every error names the type or parameter involved and, where it helps,
//! what required it and what was probably meant.

use std::fmt;

use sanad_support::rendering::render_chain;

use crate::key::DependencyKey;

/// Main error type for all Sanad operations.
#[derive(Debug, thiserror::Error)]
pub enum SanadError {
    /// No metadata is known for the requested type.
    #[error("{}", .0)]
    UnknownType(UnknownTypeError),

    /// A parameter has no explicit value, no default and no declared type.
    #[error("{}", .0)]
    UnresolvableParameter(UnresolvableParameterError),

    /// The callable handed to `call` cannot be looked up or invoked.
    #[error("{}", .0)]
    InvalidCallable(InvalidCallableError),

    /// Circular binding chain or constructor dependency.
    #[error("{}", .0)]
    CircularDependency(CircularDependencyError),

    /// A resolved value is not of the Rust type its consumer expects.
    #[error("{}", .0)]
    TypeMismatch(TypeMismatchError),

    /// A constructor, method or provider failed.
    #[error("Failed to construct {key}: {source}")]
    ConstructionFailed {
        key: DependencyKey,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl SanadError {
    /// Wraps an arbitrary failure raised while building `key`.
    pub fn construction(
        key: impl Into<DependencyKey>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        SanadError::ConstructionFailed {
            key: key.into(),
            source: source.into(),
        }
    }
}

/// Error when no type metadata exists for a name.
#[derive(Debug)]
pub struct UnknownTypeError {
    /// The type that was requested
    pub requested: DependencyKey,
    /// What required this type (if known)
    pub required_by: Option<DependencyKey>,
    /// Known names that look similar
    pub suggestions: Vec<String>,
}

impl fmt::Display for UnknownTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown type: {}", self.requested)?;

        if let Some(ref parent) = self.required_by {
            write!(f, "\n  Required by: {parent}")?;
        }

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n    - {suggestion}")?;
            }
        }

        write!(
            f,
            "\n  Hint: derive Injectable for {0}, register its TypeInfo, or bind {0} to a known type",
            self.requested
        )
    }
}

/// Error when a parameter cannot be given a value.
#[derive(Debug)]
pub struct UnresolvableParameterError {
    /// Parameter name
    pub parameter: String,
    /// Type whose constructor declares the parameter; `None` for callables
    pub owner: Option<DependencyKey>,
}

impl fmt::Display for UnresolvableParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cannot resolve parameter '{}'", self.parameter)?;
        if let Some(ref owner) = self.owner {
            write!(f, " of {owner}")?;
        }
        write!(
            f,
            "\n  Hint: pass it in the explicit values, give it a default, or declare its type"
        )
    }
}

/// Error when a callable has an unsupported shape.
#[derive(Debug)]
pub struct InvalidCallableError {
    /// Rendering of the offending callable
    pub callable: String,
    /// What is wrong with it
    pub reason: String,
}

impl fmt::Display for InvalidCallableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid callable {}: {}", self.callable, self.reason)
    }
}

/// Error when resolution runs in a circle.
///
/// Shows the full chain so you can see WHERE the cycle is.
#[derive(Debug)]
pub struct CircularDependencyError {
    /// The chain that forms the cycle, first element repeated at the end.
    /// Example: ["A", "B", "C", "A"]
    pub chain: Vec<DependencyKey>,
}

impl fmt::Display for CircularDependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Circular dependency detected:\n  {}", render_chain(&self.chain))?;
        write!(
            f,
            "\n  Hint: break the cycle with an explicit value, an instance or a provider"
        )
    }
}

/// Error when a value does not downcast to the expected type.
#[derive(Debug)]
pub struct TypeMismatchError {
    /// Parameter or key the value was found under
    pub name: String,
    /// Rust type that was expected
    pub expected: &'static str,
}

impl fmt::Display for TypeMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Type mismatch for '{}': expected {}",
            self.name, self.expected
        )
    }
}

/// Convenient Result type for Sanad operations.
pub type Result<T> = std::result::Result<T, SanadError>;
