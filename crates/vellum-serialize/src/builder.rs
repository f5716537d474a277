//! # Schema Graph Builder
//!
//! Turns a registered class into an immutable [`SchemaTree`], recursing into
//! every structured field type, bounded by a maximum nesting depth and
//! memoized through a [`SchemaCache`].
//!
//! ## Algorithm
//!
//! 1. Compute the [`SchemaKey`] from the class name, the canonical requested
//!    group signature and the builder profile (registry fingerprint, group
//!    resolver and mappers).
//! 2. On a cache hit, check the requested groups against the groups the
//!    cached tree declares, then check that the cached subtree still fits
//!    under the depth ceiling at the depth it is being attached. Return the
//!    cached tree.
//! 3. On a miss, look the class up in the registry, validate the requested
//!    groups (top-level call only) and build one [`FieldNode`] per declared
//!    field. Fields outside the effective groups are flagged `excluded` and
//!    never recursed into; this is what lets a self-referential type build
//!    when the recursive field is out of group.
//! 4. Every class-bearing candidate of an included field is built at
//!    `depth + 1`. A build attempted at `depth > max_depth` fails with
//!    [`SchemaError::RecursionDepthExceeded`].
//! 5. The finished tree is published to the cache before being returned.
//!
//! Nested builds receive the caller's requested groups unchanged. A nested
//! class with an empty request therefore applies its own default groups.

use std::sync::Arc;

use indexmap::IndexMap;
use vellum_core::{GroupSet, MapperKind, SchemaError};

use crate::cache::SchemaCache;
use crate::descriptor::{ClassDescriptor, Directive, EnumDescriptor, FieldDescriptor};
use crate::groups::GroupResolver;
use crate::registry::TypeRegistry;
use crate::schema::{FieldNode, SchemaKey, SchemaTree};

/// Default maximum nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Builds schema trees from registered descriptors.
pub struct TypeGraphBuilder<'a> {
    registry: &'a TypeRegistry,
    groups: &'a dyn GroupResolver,
    cache: &'a dyn SchemaCache,
    max_depth: usize,
    input_mapper: Option<MapperKind>,
    output_mapper: Option<MapperKind>,
}

impl<'a> TypeGraphBuilder<'a> {
    pub fn new(
        registry: &'a TypeRegistry,
        groups: &'a dyn GroupResolver,
        cache: &'a dyn SchemaCache,
    ) -> Self {
        Self {
            registry,
            groups,
            cache,
            max_depth: DEFAULT_MAX_DEPTH,
            input_mapper: None,
            output_mapper: None,
        }
    }

    /// Override the nesting ceiling.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Naming conventions applied to every field that has no mapper
    /// directive of its own.
    pub fn with_mappers(mut self, input: Option<MapperKind>, output: Option<MapperKind>) -> Self {
        self.input_mapper = input;
        self.output_mapper = output;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Build (or fetch) the tree of `class` for `requested` groups.
    pub fn build(&self, class: &str, requested: &GroupSet) -> Result<Arc<SchemaTree>, SchemaError> {
        let key = self.key(class, requested);
        if let Some(tree) = self.cache.get(&key) {
            check_declared(&tree, requested)?;
            self.check_height(&tree, 0)?;
            tracing::trace!(key = %key, "schema cache hit");
            return Ok(tree);
        }

        let descriptor = self.registry.class(class)?;
        self.groups.validate(&descriptor, requested)?;
        self.assemble(&descriptor, requested, 0, key)
    }

    fn build_at(
        &self,
        class: &str,
        requested: &GroupSet,
        depth: usize,
    ) -> Result<Arc<SchemaTree>, SchemaError> {
        if depth > self.max_depth {
            return Err(SchemaError::RecursionDepthExceeded {
                class: class.to_string(),
                max_depth: self.max_depth,
                depth,
            });
        }

        let key = self.key(class, requested);
        if let Some(tree) = self.cache.get(&key) {
            self.check_height(&tree, depth)?;
            tracing::trace!(key = %key, depth, "schema cache hit");
            return Ok(tree);
        }

        let descriptor = self.registry.class(class)?;
        self.assemble(&descriptor, requested, depth, key)
    }

    fn assemble(
        &self,
        descriptor: &ClassDescriptor,
        requested: &GroupSet,
        depth: usize,
        key: SchemaKey,
    ) -> Result<Arc<SchemaTree>, SchemaError> {
        let default_groups = self.groups.default_groups_of(descriptor);
        let effective = if requested.is_empty() {
            default_groups.clone()
        } else {
            requested.clone()
        };

        let mut declared_groups = default_groups.clone();
        let mut fields = IndexMap::with_capacity(descriptor.fields().len());
        let mut height = 0;

        for field in descriptor.fields() {
            let groups = self.groups.groups_of(field, descriptor);
            declared_groups = declared_groups.union(&groups);
            let excluded = !groups.intersects(&effective);

            let directives: Vec<Directive> = descriptor
                .directives()
                .iter()
                .chain(field.directives())
                .cloned()
                .collect();
            let names = self.names(field, &directives);

            let mut children: Vec<Arc<SchemaTree>> = Vec::new();
            let mut enums: Vec<Arc<EnumDescriptor>> = Vec::new();
            if !excluded {
                for ty in field.types() {
                    if let Some(child_class) = ty.class_name() {
                        if children.iter().any(|c| c.class() == child_class) {
                            continue;
                        }
                        let child = self.build_at(child_class, requested, depth + 1)?;
                        height = height.max(child.height() + 1);
                        children.push(child);
                    } else if let Some(enum_name) = ty.enum_name() {
                        if !enums.iter().any(|e| e.name() == enum_name) {
                            enums.push(self.registry.enumeration(enum_name)?);
                        }
                    }
                }
            }

            fields.insert(
                field.name().to_string(),
                FieldNode {
                    name: field.name().to_string(),
                    types: field.types().to_vec(),
                    groups,
                    excluded,
                    nullable: field.is_nullable(),
                    readonly: field.is_readonly(),
                    default: field.default().cloned(),
                    input_keys: names.input_keys,
                    output_key: names.output_key,
                    input_ignored: names.input_ignored,
                    output_ignored: names.output_ignored,
                    directives,
                    children,
                    enums,
                },
            );
        }

        let tree = Arc::new(SchemaTree {
            class: descriptor.name().to_string(),
            default_groups,
            requested: requested.clone(),
            declared_groups,
            fields,
            constructor: descriptor.constructor_params().to_vec(),
            height,
        });

        tracing::debug!(
            key = %key,
            depth,
            fields = tree.len(),
            height,
            "built schema tree"
        );
        self.cache.set(key, tree.clone());
        Ok(tree)
    }

    fn key(&self, class: &str, requested: &GroupSet) -> SchemaKey {
        SchemaKey::new(class, requested).with_profile(self.profile())
    }

    /// Tag for everything besides class and groups that changes tree shape:
    /// the registry contents, the group resolver and the global mappers.
    fn profile(&self) -> String {
        format!(
            "{};{};{};{}",
            self.registry.fingerprint(),
            self.groups.fingerprint(),
            mapper_tag(self.input_mapper),
            mapper_tag(self.output_mapper)
        )
    }

    /// A cached tree reattached at `depth` reaches `depth + height`.
    fn check_height(&self, tree: &SchemaTree, depth: usize) -> Result<(), SchemaError> {
        let deepest = depth + tree.height();
        if deepest > self.max_depth {
            return Err(SchemaError::RecursionDepthExceeded {
                class: tree.class().to_string(),
                max_depth: self.max_depth,
                depth: deepest,
            });
        }
        Ok(())
    }

    fn names(&self, field: &FieldDescriptor, directives: &[Directive]) -> FieldNames {
        let mut input_keys: Vec<String> = Vec::new();
        let mut output_name = None;
        let mut input_mapper = self.input_mapper;
        let mut output_mapper = self.output_mapper;
        let mut input_ignored = false;
        let mut output_ignored = false;

        for directive in directives {
            match directive {
                Directive::InputName(name) => input_keys.push(name.clone()),
                Directive::OutputName(name) => output_name = Some(name.clone()),
                Directive::InputMapper(kind) => input_mapper = Some(*kind),
                Directive::OutputMapper(kind) => output_mapper = Some(*kind),
                Directive::InputIgnore => input_ignored = true,
                Directive::OutputIgnore => output_ignored = true,
                Directive::InputCast(_) | Directive::OutputCast(_) => {}
            }
        }

        if let Some(mapper) = input_mapper {
            input_keys.push(mapper.resolve(field.name()));
        }
        input_keys.push(field.name().to_string());
        let mut seen = std::collections::HashSet::new();
        input_keys.retain(|k| seen.insert(k.clone()));

        let output_key = output_name.unwrap_or_else(|| match output_mapper {
            Some(mapper) => mapper.resolve(field.name()),
            None => field.name().to_string(),
        });

        FieldNames {
            input_keys,
            output_key,
            input_ignored,
            output_ignored,
        }
    }
}

struct FieldNames {
    input_keys: Vec<String>,
    output_key: String,
    input_ignored: bool,
    output_ignored: bool,
}

fn mapper_tag(mapper: Option<MapperKind>) -> &'static str {
    match mapper {
        Some(MapperKind::Snake) => "snake",
        Some(MapperKind::Camel) => "camel",
        Some(MapperKind::Pascal) => "pascal",
        None => "-",
    }
}

fn check_declared(tree: &SchemaTree, requested: &GroupSet) -> Result<(), SchemaError> {
    match requested.iter().find(|g| !tree.declared_groups().contains(g)) {
        Some(group) => Err(SchemaError::UnknownGroup {
            class: tree.class().to_string(),
            group: group.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryCache, NoCache};
    use crate::groups::DeclaredGroupResolver;
    use vellum_core::TypeDescriptor;

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry
            .insert_class(
                ClassDescriptor::new("Order")
                    .default_groups(["public"])
                    .field(FieldDescriptor::of("id", TypeDescriptor::int()))
                    .field(FieldDescriptor::of(
                        "items",
                        TypeDescriptor::collect_object("LineItem"),
                    ))
                    .field(
                        FieldDescriptor::of("audit", TypeDescriptor::object("Audit"))
                            .groups(["admin"]),
                    )
                    .field(FieldDescriptor::of("status", TypeDescriptor::enumeration("Status"))),
            )
            .insert_class(
                ClassDescriptor::new("LineItem")
                    .field(FieldDescriptor::of("sku", TypeDescriptor::string()))
                    .field(FieldDescriptor::of("qty", TypeDescriptor::int())),
            )
            .insert_class(
                ClassDescriptor::new("Audit")
                    .field(FieldDescriptor::of("by", TypeDescriptor::string())),
            )
            .insert_enum(EnumDescriptor::new("Status").case("ACTIVE").case("CLOSED"));
        registry
    }

    #[test]
    fn test_build_marks_excluded_fields() {
        let registry = registry();
        let groups = DeclaredGroupResolver::default();
        let builder = TypeGraphBuilder::new(&registry, &groups, &NoCache);

        let tree = builder.build("Order", &GroupSet::new()).unwrap();
        assert_eq!(tree.effective_groups(), &GroupSet::single("public"));
        let audit = tree.field("audit").unwrap();
        assert!(audit.is_excluded());
        assert!(audit.children().is_empty());
        assert!(!tree.field("id").unwrap().is_excluded());
        assert_eq!(tree.field("items").unwrap().children()[0].class(), "LineItem");
        assert_eq!(tree.field("status").unwrap().enums()[0].name(), "Status");
        assert_eq!(tree.height(), 1);
    }

    #[test]
    fn test_build_includes_requested_groups() {
        let registry = registry();
        let groups = DeclaredGroupResolver::default();
        let builder = TypeGraphBuilder::new(&registry, &groups, &NoCache);

        let tree = builder.build("Order", &GroupSet::single("admin")).unwrap();
        assert!(!tree.field("audit").unwrap().is_excluded());
        assert!(tree.field("id").unwrap().is_excluded());
    }

    #[test]
    fn test_unknown_group_and_class() {
        let registry = registry();
        let groups = DeclaredGroupResolver::default();
        let builder = TypeGraphBuilder::new(&registry, &groups, &NoCache);

        assert!(matches!(
            builder.build("Order", &GroupSet::single("nope")),
            Err(SchemaError::UnknownGroup { .. })
        ));
        assert_eq!(
            builder.build("Ghost", &GroupSet::new()).unwrap_err(),
            SchemaError::UnknownClass("Ghost".into())
        );
    }

    #[test]
    fn test_unknown_group_detected_on_cache_hit() {
        let registry = registry();
        let groups = DeclaredGroupResolver::default();
        let cache = MemoryCache::new();
        let builder = TypeGraphBuilder::new(&registry, &groups, &cache);

        // Builds Audit:admin as a nested tree without validating it.
        builder.build("Order", &GroupSet::single("admin")).unwrap();
        assert!(matches!(
            builder.build("Audit", &GroupSet::single("admin")),
            Err(SchemaError::UnknownGroup { .. })
        ));
    }

    #[test]
    fn test_missing_enum_fails() {
        let mut registry = TypeRegistry::new();
        registry.insert_class(
            ClassDescriptor::new("A")
                .field(FieldDescriptor::of("e", TypeDescriptor::enumeration("Nope"))),
        );
        let groups = DeclaredGroupResolver::default();
        let builder = TypeGraphBuilder::new(&registry, &groups, &NoCache);
        assert_eq!(
            builder.build("A", &GroupSet::new()).unwrap_err(),
            SchemaError::UnknownEnum("Nope".into())
        );
    }

    #[test]
    fn test_cache_hit_returns_same_tree() {
        let registry = registry();
        let groups = DeclaredGroupResolver::default();
        let cache = MemoryCache::new();
        let builder = TypeGraphBuilder::new(&registry, &groups, &cache);

        let first = builder.build("Order", &GroupSet::new()).unwrap();
        let lookups = registry.lookups();
        let second = builder.build("Order", &GroupSet::new()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.lookups(), lookups);
    }

    #[test]
    fn test_names_from_directives_and_mappers() {
        let mut registry = TypeRegistry::new();
        registry.insert_class(
            ClassDescriptor::new("User")
                .directive(Directive::OutputMapper(MapperKind::Camel))
                .field(
                    FieldDescriptor::of("user_name", TypeDescriptor::string())
                        .input_name("login")
                        .directive(Directive::InputMapper(MapperKind::Pascal)),
                )
                .field(
                    FieldDescriptor::of("created_at", TypeDescriptor::string())
                        .output_name("created"),
                ),
        );
        let groups = DeclaredGroupResolver::default();
        let builder = TypeGraphBuilder::new(&registry, &groups, &NoCache);
        let tree = builder.build("User", &GroupSet::new()).unwrap();

        let name = tree.field("user_name").unwrap();
        assert_eq!(name.input_keys(), ["login", "UserName", "user_name"]);
        assert_eq!(name.output_key(), "userName");
        assert_eq!(tree.field("created_at").unwrap().output_key(), "created");
    }

    #[test]
    fn test_global_mappers_change_cache_key() {
        let mut registry = TypeRegistry::new();
        registry.insert_class(
            ClassDescriptor::new("P").field(FieldDescriptor::of("first_name", TypeDescriptor::string())),
        );
        let groups = DeclaredGroupResolver::default();
        let cache = MemoryCache::new();

        let plain = TypeGraphBuilder::new(&registry, &groups, &cache)
            .build("P", &GroupSet::new())
            .unwrap();
        let camel = TypeGraphBuilder::new(&registry, &groups, &cache)
            .with_mappers(Some(MapperKind::Camel), Some(MapperKind::Camel))
            .build("P", &GroupSet::new())
            .unwrap();

        assert_eq!(plain.field("first_name").unwrap().output_key(), "first_name");
        assert_eq!(camel.field("first_name").unwrap().output_key(), "firstName");
        assert_eq!(
            camel.field("first_name").unwrap().input_keys(),
            ["firstName", "first_name"]
        );
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_duplicate_class_candidates_share_one_child() {
        let mut registry = TypeRegistry::new();
        registry
            .insert_class(ClassDescriptor::new("Leaf"))
            .insert_class(ClassDescriptor::new("Root").field(FieldDescriptor::new(
                "leaf",
                [
                    TypeDescriptor::object("Leaf"),
                    TypeDescriptor::collect_object("Leaf"),
                ],
            )));
        let groups = DeclaredGroupResolver::default();
        let builder = TypeGraphBuilder::new(&registry, &groups, &NoCache);
        let tree = builder.build("Root", &GroupSet::new()).unwrap();
        assert_eq!(tree.field("leaf").unwrap().children().len(), 1);
    }
}
