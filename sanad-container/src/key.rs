//! Dependency identification keys.
//!
//! [`DependencyKey`] names a dependency within the container. Keys are
//! plain type names: `Foo`, `FooInterface`, or any abstract label such
//! as `Quux` that a binding or provider gives meaning to.

use std::any::type_name;
use std::borrow::Cow;
use std::fmt;

use sanad_support::rendering::shorten_type_name;

/// Names a dependency in the container.
///
/// # Examples
/// ```
/// use sanad_container::key::DependencyKey;
///
/// struct Mailer;
///
/// // Rust types map to their short name
/// assert_eq!(DependencyKey::of::<Mailer>().name(), "Mailer");
///
/// // Abstract names are just strings
/// let key = DependencyKey::named("MailerInterface");
/// assert_eq!(key, DependencyKey::from("MailerInterface"));
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DependencyKey {
    name: Cow<'static, str>,
}

impl DependencyKey {
    /// Creates the key of Rust type `T`: its path-less type name.
    ///
    /// Two types with the same name in different modules share a key;
    /// give one of them an explicit name when both are registered.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            name: Cow::Owned(shorten_type_name(type_name::<T>())),
        }
    }

    /// Creates a key from a static name.
    #[inline]
    pub const fn named(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
        }
    }

    /// Returns the type name this key stands for.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl From<&'static str> for DependencyKey {
    fn from(name: &'static str) -> Self {
        Self::named(name)
    }
}

impl From<String> for DependencyKey {
    fn from(name: String) -> Self {
        Self {
            name: Cow::Owned(name),
        }
    }
}

impl From<&DependencyKey> for DependencyKey {
    fn from(key: &DependencyKey) -> Self {
        key.clone()
    }
}

impl AsRef<str> for DependencyKey {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for DependencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DependencyKey({})", self.name)
    }
}

impl fmt::Display for DependencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
