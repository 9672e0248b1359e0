//! Provider capability: types that build instances themselves.
//!
//! A provider takes over construction for a key completely: the
//! container hands it the key and itself, and uses whatever comes back
//! without injecting anything into it afterwards.
//!
//! Providers are used in two ways:
//! - registered for a key: `container.provider("Quux", "BazProvider")`
//! - self-providing: a type whose own [`TypeInfo`](crate::reflect::TypeInfo)
//!   carries the capability is built by its provider whenever it is
//!   resolved (see [`ProviderPolicy`](crate::settings::ProviderPolicy))
//!
//! # Examples
//! ```rust,ignore
//! struct BazProvider;
//!
//! impl Provider for BazProvider {
//!     fn provide(_key: &DependencyKey, _container: &Container) -> Result<Instance> {
//!         Ok(Arc::new(Baz))
//!     }
//! }
//!
//! container.register_type(TypeInfo::named("BazProvider").provided_by::<BazProvider>());
//! container.provider("Quux", "BazProvider");
//! ```

use crate::container::Container;
use crate::error::Result;
use crate::key::DependencyKey;
use crate::reflect::Instance;

/// Builds the instance for a key on the container's behalf.
pub trait Provider: 'static {
    /// Produces a fully constructed instance for `abstract_key`.
    ///
    /// `container` may be used to resolve further dependencies; it
    /// re-enters the normal resolution pipeline (including cycle checks).
    fn provide(abstract_key: &DependencyKey, container: &Container) -> Result<Instance>;
}
