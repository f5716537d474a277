//! # Type Registry
//!
//! Name-indexed table of class and enum descriptors. This is what the schema
//! builder consults instead of runtime reflection: every class or enum a
//! type descriptor references must be registered before the first build.
//!
//! The registry counts class lookups. The counter is how callers (and the
//! cache coherence tests) observe that a cache hit did not touch the
//! descriptors at all.
//!
//! Every registry also carries a content [`fingerprint`](TypeRegistry::fingerprint)
//! that goes into schema cache keys, so engines sharing one cache only share
//! trees built from identical descriptors.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use sha2::{Digest, Sha256};
use vellum_core::SchemaError;

use crate::descriptor::{ClassDescriptor, EnumDescriptor, Enumerated, Serializable};

/// Registered class and enum descriptors.
#[derive(Default)]
pub struct TypeRegistry {
    classes: HashMap<String, Arc<ClassDescriptor>>,
    enums: HashMap<String, Arc<EnumDescriptor>>,
    lookups: AtomicU64,
    fingerprint: OnceLock<String>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a typed struct and, transitively, the types its fields
    /// reference. Registering an already known class is a no-op, which also
    /// terminates registration of self-referential types.
    pub fn register<T: Serializable>(&mut self) -> &mut Self {
        if self.classes.contains_key(T::CLASS) {
            return self;
        }
        self.insert_class(T::describe());
        T::register_dependencies(self);
        self
    }

    /// Register a typed enum.
    pub fn register_enum<E: Enumerated>(&mut self) -> &mut Self {
        if !self.enums.contains_key(E::ENUM) {
            self.insert_enum(E::describe());
        }
        self
    }

    /// Register (or replace) a class descriptor.
    pub fn insert_class(&mut self, class: ClassDescriptor) -> &mut Self {
        if self.classes.contains_key(class.name()) {
            tracing::warn!(class = class.name(), "replacing registered class descriptor");
        }
        self.classes.insert(class.name().to_string(), Arc::new(class));
        self.fingerprint = OnceLock::new();
        self
    }

    /// Register (or replace) an enum descriptor.
    pub fn insert_enum(&mut self, descriptor: EnumDescriptor) -> &mut Self {
        if self.enums.contains_key(descriptor.name()) {
            tracing::warn!(enum_name = descriptor.name(), "replacing registered enum descriptor");
        }
        self.enums
            .insert(descriptor.name().to_string(), Arc::new(descriptor));
        self.fingerprint = OnceLock::new();
        self
    }

    /// Look up a class descriptor.
    pub fn class(&self, name: &str) -> Result<Arc<ClassDescriptor>, SchemaError> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        self.classes
            .get(name)
            .cloned()
            .ok_or_else(|| SchemaError::UnknownClass(name.to_string()))
    }

    /// Look up an enum descriptor.
    pub fn enumeration(&self, name: &str) -> Result<Arc<EnumDescriptor>, SchemaError> {
        self.enums
            .get(name)
            .cloned()
            .ok_or_else(|| SchemaError::UnknownEnum(name.to_string()))
    }

    pub fn contains_class(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn contains_enum(&self, name: &str) -> bool {
        self.enums.contains_key(name)
    }

    /// Registered class names, sorted.
    pub fn class_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.classes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of class descriptor lookups performed so far.
    pub fn lookups(&self) -> u64 {
        self.lookups.load(Ordering::Relaxed)
    }

    /// Content fingerprint of the registered descriptors: the leading 16 hex
    /// digits of a SHA-256 over their debug rendering, in name order. Casts
    /// attached through directives contribute their names. Computed on first
    /// use and reset by every insertion.
    pub fn fingerprint(&self) -> &str {
        self.fingerprint.get_or_init(|| {
            let mut hasher = Sha256::new();

            let mut classes: Vec<_> = self.classes.iter().collect();
            classes.sort_unstable_by(|a, b| a.0.cmp(b.0));
            for (_, class) in classes {
                hasher.update(b"class\0");
                hasher.update(format!("{class:?}").as_bytes());
            }

            let mut enums: Vec<_> = self.enums.iter().collect();
            enums.sort_unstable_by(|a, b| a.0.cmp(b.0));
            for (_, descriptor) in enums {
                hasher.update(b"enum\0");
                hasher.update(format!("{descriptor:?}").as_bytes());
            }

            hasher
                .finalize()
                .iter()
                .take(8)
                .map(|b| format!("{b:02x}"))
                .collect()
        })
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("classes", &self.class_names())
            .field("enum_count", &self.enums.len())
            .field("lookups", &self.lookups())
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}
