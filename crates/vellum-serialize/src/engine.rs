//! # Engine Facade
//!
//! [`Engine`] bundles the registry, the group resolver, the schema cache,
//! both cast chains and the configuration. It is built once and shared.
//!
//! Callers interact through contexts:
//!
//! - [`SerializeContext<T>`] for typed [`Serializable`] structs,
//! - [`DynamicContext`] for registry-only classes resolved to [`Object`]s.
//!
//! ```ignore
//! let engine = Engine::builder().register::<Order>().build();
//! let order: Order = engine.context::<Order>().from(json!({"id": 1}))?;
//! let out = engine.context::<Order>().with_groups(["admin"])?.to_array(&order)?;
//! ```

use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value as Json;
use vellum_core::{GroupSet, Object, ResolveError, SchemaError};

use crate::builder::TypeGraphBuilder;
use crate::cache::{MemoryCache, SchemaCache};
use crate::cast::{InputCast, InputCastChain, OutputCast, OutputCastChain};
use crate::choice::ChoiceContext;
use crate::config::EngineConfig;
use crate::descriptor::{ClassDescriptor, EnumDescriptor, Enumerated, Serializable};
use crate::groups::{DeclaredGroupResolver, GroupResolver};
use crate::registry::TypeRegistry;
use crate::resolve::{InputResolver, OutputResolver, Payload};
use crate::schema::SchemaTree;

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Registry, cache, casts and configuration of one conversion setup.
#[derive(Debug, Clone)]
pub struct Engine {
    registry: Arc<TypeRegistry>,
    groups: Arc<dyn GroupResolver>,
    cache: Arc<dyn SchemaCache>,
    input: InputResolver,
    output: OutputResolver,
    config: EngineConfig,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &Arc<dyn SchemaCache> {
        &self.cache
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn input(&self) -> &InputResolver {
        &self.input
    }

    pub fn output(&self) -> &OutputResolver {
        &self.output
    }

    /// Build (or fetch from the cache) the tree of `class` for `groups`.
    pub fn tree(&self, class: &str, groups: &GroupSet) -> Result<Arc<SchemaTree>, SchemaError> {
        TypeGraphBuilder::new(&self.registry, self.groups.as_ref(), self.cache.as_ref())
            .with_max_depth(self.config.max_depth)
            .with_mappers(self.config.input_mapper, self.config.output_mapper)
            .build(class, groups)
    }

    /// Context for a typed struct, with no groups requested.
    pub fn context<T: Serializable>(&self) -> SerializeContext<'_, T> {
        SerializeContext {
            engine: self,
            groups: GroupSet::new(),
            _marker: PhantomData,
        }
    }

    /// Context for a registry-only class, with no groups requested.
    pub fn dynamic(&self, class: impl Into<String>) -> DynamicContext<'_> {
        DynamicContext {
            engine: self,
            class: class.into(),
            groups: GroupSet::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// EngineBuilder
// ---------------------------------------------------------------------------

/// Collects descriptors, casts and settings for an [`Engine`].
#[derive(Default)]
pub struct EngineBuilder {
    registry: TypeRegistry,
    groups: Option<Arc<dyn GroupResolver>>,
    cache: Option<Arc<dyn SchemaCache>>,
    input_casts: Vec<Arc<dyn InputCast>>,
    output_casts: Vec<Arc<dyn OutputCast>>,
    config: EngineConfig,
}

impl EngineBuilder {
    /// Register a typed struct and the types it references.
    pub fn register<T: Serializable>(mut self) -> Self {
        self.registry.register::<T>();
        self
    }

    /// Register a typed enum.
    pub fn register_enum<E: Enumerated>(mut self) -> Self {
        self.registry.register_enum::<E>();
        self
    }

    /// Register a class descriptor directly.
    pub fn class(mut self, class: ClassDescriptor) -> Self {
        self.registry.insert_class(class);
        self
    }

    /// Register an enum descriptor directly.
    pub fn enumeration(mut self, descriptor: EnumDescriptor) -> Self {
        self.registry.insert_enum(descriptor);
        self
    }

    /// Replace the whole registry.
    pub fn registry(mut self, registry: TypeRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Use a custom group resolver.
    pub fn group_resolver(mut self, resolver: Arc<dyn GroupResolver>) -> Self {
        self.groups = Some(resolver);
        self
    }

    /// Use a specific cache, for example [`MemoryCache::global`]. Without
    /// one, the engine owns a private [`MemoryCache`].
    pub fn cache(mut self, cache: Arc<dyn SchemaCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Append a user input cast. User casts run before the built-ins, in
    /// registration order.
    pub fn input_cast(mut self, cast: Arc<dyn InputCast>) -> Self {
        self.input_casts.push(cast);
        self
    }

    /// Append a user output cast.
    pub fn output_cast(mut self, cast: Arc<dyn OutputCast>) -> Self {
        self.output_casts.push(cast);
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Engine {
        let mut input = InputCastChain::with_builtins();
        for cast in self.input_casts {
            input.register(cast);
        }
        let mut output = OutputCastChain::with_builtins();
        for cast in self.output_casts {
            output.register(cast);
        }

        let groups = self.groups.unwrap_or_else(|| {
            Arc::new(DeclaredGroupResolver::new(self.config.default_group.clone()))
        });
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(MemoryCache::new()) as Arc<dyn SchemaCache>);

        tracing::debug!(
            classes = self.registry.class_names().len(),
            input_casts = input.len(),
            output_casts = output.len(),
            max_depth = self.config.max_depth,
            "engine ready"
        );

        Engine {
            registry: Arc::new(self.registry),
            groups,
            cache,
            input: InputResolver::new(input),
            output: OutputResolver::new(output),
            config: self.config,
        }
    }
}

// ---------------------------------------------------------------------------
// SerializeContext
// ---------------------------------------------------------------------------

/// Conversion entry point for one typed struct under one group set.
pub struct SerializeContext<'e, T> {
    engine: &'e Engine,
    groups: GroupSet,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for SerializeContext<'_, T> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine,
            groups: self.groups.clone(),
            _marker: PhantomData,
        }
    }
}

impl<'e, T: Serializable> SerializeContext<'e, T> {
    /// Request `groups`. Fails immediately if one is not declared by `T`.
    pub fn with_groups(self, groups: impl Into<GroupSet>) -> Result<Self, SchemaError> {
        let groups = groups.into();
        self.engine.tree(T::CLASS, &groups)?;
        Ok(Self { groups, ..self })
    }

    pub fn groups(&self) -> &GroupSet {
        &self.groups
    }

    /// Schema tree of `T` under the current groups.
    pub fn tree(&self) -> Result<Arc<SchemaTree>, SchemaError> {
        self.engine.tree(T::CLASS, &self.groups)
    }

    /// Resolve `payload` into a `T`.
    pub fn from(&self, payload: impl Into<Payload>) -> Result<T, ResolveError> {
        self.from_with_choices(payload).map(|(value, _)| value)
    }

    /// Resolve `payload` into a `T`, returning the choices made on the way.
    pub fn from_with_choices(
        &self,
        payload: impl Into<Payload>,
    ) -> Result<(T, ChoiceContext), ResolveError> {
        let tree = self.tree()?;
        let mut choices = ChoiceContext::new(T::CLASS, self.groups.clone());
        let object = self.engine.input.resolve_with(&tree, payload, &mut choices)?;
        let value = T::from_object(object).map_err(|source| ResolveError::Conversion {
            class: T::CLASS.to_string(),
            source,
        })?;
        Ok((value, choices))
    }

    /// Write `value` as an associative structure.
    pub fn to_array(&self, value: &T) -> Result<Json, ResolveError> {
        let tree = self.tree()?;
        self.engine.output.resolve(&tree, &value.to_object())
    }
}

// ---------------------------------------------------------------------------
// DynamicContext
// ---------------------------------------------------------------------------

/// Conversion entry point for a registry-only class.
#[derive(Clone)]
pub struct DynamicContext<'e> {
    engine: &'e Engine,
    class: String,
    groups: GroupSet,
}

impl<'e> DynamicContext<'e> {
    /// Request `groups`. Fails immediately if one is not declared by the
    /// class.
    pub fn with_groups(self, groups: impl Into<GroupSet>) -> Result<Self, SchemaError> {
        let groups = groups.into();
        self.engine.tree(&self.class, &groups)?;
        Ok(Self { groups, ..self })
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn groups(&self) -> &GroupSet {
        &self.groups
    }

    pub fn tree(&self) -> Result<Arc<SchemaTree>, SchemaError> {
        self.engine.tree(&self.class, &self.groups)
    }

    /// Resolve `payload` into an object.
    pub fn from(&self, payload: impl Into<Payload>) -> Result<Object, ResolveError> {
        self.from_with_choices(payload).map(|(object, _)| object)
    }

    pub fn from_with_choices(
        &self,
        payload: impl Into<Payload>,
    ) -> Result<(Object, ChoiceContext), ResolveError> {
        let tree = self.tree()?;
        let mut choices = ChoiceContext::new(self.class.clone(), self.groups.clone());
        let object = self.engine.input.resolve_with(&tree, payload, &mut choices)?;
        Ok((object, choices))
    }

    /// Write `object` as an associative structure.
    pub fn to_array(&self, object: &Object) -> Result<Json, ResolveError> {
        let tree = self.tree()?;
        self.engine.output.resolve(&tree, object)
    }

    /// Resolve `payload` and write the result back out under the same
    /// groups.
    pub fn convert(&self, payload: impl Into<Payload>) -> Result<Json, ResolveError> {
        let object = self.from(payload)?;
        self.to_array(&object)
    }
}
