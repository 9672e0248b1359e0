//! Dependency lifecycles.
//!
//! Sanad knows two lifecycles:
//! - [`Scope::Singleton`]: resolved once, cached, shared afterwards
//! - [`Scope::Transient`]: constructed fresh on every resolve
use std::fmt;

/// Lifecycle a type declares for itself in its [`TypeInfo`](crate::reflect::TypeInfo).
///
/// A type that self-identifies as [`Scope::Transient`] is never cached,
/// whatever key it was resolved through. Keys can also be marked
/// transient from the outside with
/// [`Container::transient`](crate::container::Container::transient).
///
/// # Examples
/// ```
/// use sanad_container::scope::Scope;
///
/// assert!(Scope::Singleton.is_cached());
/// assert!(!Scope::Transient.is_cached());
/// assert_eq!(Scope::default(), Scope::Singleton);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scope {
    /// One instance per container, created on first resolve.
    #[default]
    Singleton,

    /// New instance on every resolve. Never cached.
    Transient,
}

impl Scope {
    /// Returns `true` if resolutions of this scope are cached.
    #[inline]
    pub fn is_cached(&self) -> bool {
        matches!(self, Scope::Singleton)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Singleton => write!(f, "Singleton"),
            Scope::Transient => write!(f, "Transient"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_is_cached() {
        assert!(Scope::Singleton.is_cached());
        assert!(!Scope::Transient.is_cached());
    }

    #[test]
    fn scope_display() {
        assert_eq!(format!("{}", Scope::Singleton), "Singleton");
        assert_eq!(format!("{}", Scope::Transient), "Transient");
    }
}
