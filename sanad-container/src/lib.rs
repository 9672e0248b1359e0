//! Core container implementation for Sanad DI.

pub mod args;
pub mod callable;
pub mod container;
pub mod error;
mod graph;
pub mod global;
pub mod key;
pub mod provider;
pub mod reflect;
mod registry;
pub mod scope;
pub mod settings;

pub use args::{Args, Values, downcast};
pub use callable::{Callable, Function};
pub use container::{ArgResolver, Container, ContainerBuilder, prelude};
pub use error::{Result, SanadError};
pub use global::{container, set_container};
pub use key::DependencyKey;
pub use provider::Provider;
pub use reflect::{Injectable, Instance, Parameter, TypeEntry, TypeInfo};
pub use scope::Scope;
pub use settings::{ContainerSettings, ProviderPolicy};
