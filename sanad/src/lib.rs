//! # Sanad: Dependency Injection Container for Rust
//!
//! Resolves objects by type name: follows bindings to the most concrete
//! type, reuses cached instances, hands construction to providers, and
//! otherwise builds the type from its constructor metadata, resolving
//! every parameter recursively.
//!
//! ```rust,ignore
//! use sanad::Injectable;
//! use std::sync::Arc;
//!
//! #[derive(Injectable)]
//! struct Foo;
//!
//! #[derive(Injectable)]
//! struct Bar {
//!     foo: Arc<Foo>,
//!     #[inject(default = "None")]
//!     qux: Option<String>,
//! }
//!
//! let bar: Arc<Bar> = sanad::container().get_as("Bar")?;
//! ```

pub use sanad_container::*;
pub use sanad_derive::*;
pub use sanad_support::*;

#[doc(hidden)]
pub mod __private {
    pub use inventory;
}
