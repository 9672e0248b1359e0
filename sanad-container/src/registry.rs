//! Type registry: the metadata catalog the container resolves against.
//!
//! Maps a [`DependencyKey`] to the [`TypeInfo`] that knows how to build
//! it, and a Rust [`TypeId`] to the [`Scope`] the type declares for
//! itself. Each container owns a registry for explicit registrations;
//! types submitted by `#[derive(Injectable)]` live in one shared,
//! lazily built [`discovered`] registry.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::{debug, warn};

use crate::key::DependencyKey;
use crate::reflect::{TypeEntry, TypeInfo};
use crate::scope::Scope;

/// Stores type metadata by key.
#[derive(Debug, Default)]
pub(crate) struct TypeRegistry {
    types: HashMap<DependencyKey, Arc<TypeInfo>>,
    scopes: HashMap<TypeId, Scope>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers metadata, replacing any entry with the same key.
    ///
    /// Returns the replaced entry.
    pub fn register(&mut self, info: TypeInfo) -> Option<Arc<TypeInfo>> {
        let key = info.key().clone();
        if let Some(type_id) = info.type_id() {
            self.scopes.insert(type_id, info.scope());
        }

        debug!(key = %key, scope = %info.scope(), params = info.params().len(), "Registered type");
        self.types.insert(key, Arc::new(info))
    }

    /// Looks up metadata by key.
    pub fn get(&self, key: &DependencyKey) -> Option<Arc<TypeInfo>> {
        self.types.get(key).cloned()
    }

    /// Scope declared by the Rust type behind `type_id`, if catalogued.
    pub fn scope_of_type(&self, type_id: TypeId) -> Option<Scope> {
        self.scopes.get(&type_id).copied()
    }

    /// Returns the number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if no types are registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Returns all registered keys.
    pub fn keys(&self) -> impl Iterator<Item = &DependencyKey> {
        self.types.keys()
    }
}

static DISCOVERED: Lazy<TypeRegistry> = Lazy::new(|| {
    let mut registry = TypeRegistry::new();
    for entry in inventory::iter::<TypeEntry> {
        if let Some(previous) = registry.register(entry.describe()) {
            warn!(
                key = %previous.key(),
                "Two derived types share a key; give one of them #[inject(name = \"...\")]"
            );
        }
    }
    debug!(types = registry.len(), "Discovered derived types");
    registry
});

/// Types submitted by `#[derive(Injectable)]` anywhere in the program.
pub(crate) fn discovered() -> &'static TypeRegistry {
    &DISCOVERED
}
