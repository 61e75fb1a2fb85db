//! Type registry and loader.
//!
//! The registry maps dotted fully-qualified names to [`TypeDescriptor`]s.
//! It is populated by explicit registration at process startup; package
//! scans re-resolve names against it on every call. [`global`] is the
//! toolkit's own default loader, used when the caller does not supply an
//! explicit one.

use std::any::Any;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::builder::TypeBuilder;
use crate::descriptor::TypeDescriptor;

/// Resolves dotted fully-qualified names to type descriptors.
pub trait TypeLoader: Send + Sync {
    /// Resolve `name`, returning `None` when nothing is registered under it.
    fn resolve(&self, name: &str) -> Option<Arc<TypeDescriptor>>;
}

/// A registry of type descriptors indexed by dotted name.
#[derive(Default)]
pub struct TypeRegistry {
    types: RwLock<FxHashMap<String, Arc<TypeDescriptor>>>,
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Finalize a builder and register its descriptor.
    ///
    /// Registering a second type under the same dotted name replaces the
    /// previous descriptor (last write wins, matching loader-resolution
    /// semantics).
    pub fn register<T: Any + Send + Sync>(&self, builder: TypeBuilder<T>) -> Arc<TypeDescriptor> {
        let descriptor = Arc::new(builder.build());
        self.types
            .write()
            .insert(descriptor.name().to_string(), descriptor.clone());
        descriptor
    }

    /// Resolve a dotted name.
    pub fn resolve(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        self.types.read().get(name).cloned()
    }

    /// Whether a type is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.types.read().contains_key(name)
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }
}

impl TypeLoader for TypeRegistry {
    fn resolve(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        TypeRegistry::resolve(self, name)
    }
}

/// The process-global default registry.
pub fn global() -> &'static TypeRegistry {
    static GLOBAL: Lazy<TypeRegistry> = Lazy::new(TypeRegistry::new);
    &GLOBAL
}
