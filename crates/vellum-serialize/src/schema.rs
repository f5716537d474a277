//! # Schema Trees
//!
//! A [`SchemaTree`] is the built, immutable description of one class under
//! one requested group set. Each declared field becomes a [`FieldNode`] that
//! carries everything the resolvers need at run time: candidate types,
//! membership, resolved payload keys, directives and the nested trees of
//! structured candidates.
//!
//! Trees are shared as `Arc<SchemaTree>` between the cache and every caller
//! and are never mutated after construction.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{json, Map, Value as Json};
use vellum_core::{describe_union, GroupSet, TypeDescriptor, TypeKind, Value};

use crate::cast::{InputCast, OutputCast};
use crate::descriptor::{Directive, EnumDescriptor};

// ---------------------------------------------------------------------------
// SchemaKey
// ---------------------------------------------------------------------------

/// Cache key of a schema tree: class, canonical group signature and the
/// builder profile (a tag for the registry contents and the settings that
/// change tree shape).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaKey {
    class: String,
    groups: String,
    profile: String,
}

impl SchemaKey {
    pub fn new(class: impl Into<String>, groups: &GroupSet) -> Self {
        Self {
            class: class.into(),
            groups: groups.signature(),
            profile: String::new(),
        }
    }

    /// Attach a builder profile tag.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    /// Canonical group signature (`a|b`).
    pub fn groups(&self) -> &str {
        &self.groups
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }
}

impl fmt::Display for SchemaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.class, self.groups)?;
        if !self.profile.is_empty() {
            write!(f, "@{}", self.profile)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FieldNode
// ---------------------------------------------------------------------------

/// Built description of one field.
#[derive(Debug)]
pub struct FieldNode {
    pub(crate) name: String,
    pub(crate) types: Vec<TypeDescriptor>,
    pub(crate) groups: GroupSet,
    pub(crate) excluded: bool,
    pub(crate) nullable: bool,
    pub(crate) readonly: bool,
    pub(crate) default: Option<Value>,
    pub(crate) directives: Vec<Directive>,
    pub(crate) input_keys: Vec<String>,
    pub(crate) output_key: String,
    pub(crate) input_ignored: bool,
    pub(crate) output_ignored: bool,
    pub(crate) children: Vec<Arc<SchemaTree>>,
    pub(crate) enums: Vec<Arc<EnumDescriptor>>,
}

impl FieldNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Candidate types in resolution order.
    pub fn types(&self) -> &[TypeDescriptor] {
        &self.types
    }

    /// `a|b` rendering of the candidate types.
    pub fn types_description(&self) -> String {
        describe_union(&self.types)
    }

    /// Groups the field belongs to (declared or inherited).
    pub fn groups(&self) -> &GroupSet {
        &self.groups
    }

    /// True when none of the field's groups is requested. Excluded fields
    /// are neither read nor written and have no nested trees.
    pub fn is_excluded(&self) -> bool {
        self.excluded
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Class-level directives followed by field-level ones.
    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    /// Payload keys tried in order when reading the field.
    pub fn input_keys(&self) -> &[String] {
        &self.input_keys
    }

    /// Key the field is written under.
    pub fn output_key(&self) -> &str {
        &self.output_key
    }

    /// True if the field is not read from payloads.
    pub fn skips_input(&self) -> bool {
        self.excluded || self.input_ignored
    }

    /// True if the field is not written to output.
    pub fn skips_output(&self) -> bool {
        self.excluded || self.output_ignored
    }

    /// Nested trees, one per distinct referenced class, in declared order.
    pub fn children(&self) -> &[Arc<SchemaTree>] {
        &self.children
    }

    /// Nested tree of `class`, if the field references it.
    pub fn child_for_class(&self, class: &str) -> Option<&Arc<SchemaTree>> {
        self.children.iter().find(|c| c.class() == class)
    }

    /// Enum descriptors referenced by the field, in declared order.
    pub fn enums(&self) -> &[Arc<EnumDescriptor>] {
        &self.enums
    }

    /// Class-bearing candidate types (`Object` and `CollectObject`).
    pub fn class_types(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.iter().filter(|t| t.kind().exists_class())
    }

    /// First candidate type of kind `kind` referencing `target`.
    pub(crate) fn type_for(&self, kind: TypeKind, target: &str) -> Option<&TypeDescriptor> {
        self.types.iter().find(|t| {
            t.kind() == kind && (t.class_name() == Some(target) || t.enum_name() == Some(target))
        })
    }

    /// Casts declared through directives, for the input direction.
    pub fn input_casts(&self) -> impl Iterator<Item = &Arc<dyn InputCast>> {
        self.directives.iter().filter_map(|d| match d {
            Directive::InputCast(c) => Some(c),
            _ => None,
        })
    }

    /// Casts declared through directives, for the output direction.
    pub fn output_casts(&self) -> impl Iterator<Item = &Arc<dyn OutputCast>> {
        self.directives.iter().filter_map(|d| match d {
            Directive::OutputCast(c) => Some(c),
            _ => None,
        })
    }
}

// ---------------------------------------------------------------------------
// SchemaTree
// ---------------------------------------------------------------------------

/// Built description of one class under one requested group set.
#[derive(Debug)]
pub struct SchemaTree {
    pub(crate) class: String,
    pub(crate) default_groups: GroupSet,
    pub(crate) requested: GroupSet,
    pub(crate) declared_groups: GroupSet,
    pub(crate) fields: IndexMap<String, FieldNode>,
    pub(crate) constructor: Vec<String>,
    pub(crate) height: usize,
}

impl SchemaTree {
    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn default_groups(&self) -> &GroupSet {
        &self.default_groups
    }

    /// Groups the tree was built for, as requested (possibly empty).
    pub fn requested_groups(&self) -> &GroupSet {
        &self.requested
    }

    /// Groups actually applied: the request, or the default groups when the
    /// request is empty.
    pub fn effective_groups(&self) -> &GroupSet {
        if self.requested.is_empty() {
            &self.default_groups
        } else {
            &self.requested
        }
    }

    /// Every group declared by the class or one of its fields.
    pub fn declared_groups(&self) -> &GroupSet {
        &self.declared_groups
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldNode> {
        self.fields.values()
    }

    /// Fields that take part in resolution under the tree's groups.
    pub fn included_fields(&self) -> impl Iterator<Item = &FieldNode> {
        self.fields.values().filter(|f| !f.excluded)
    }

    pub fn field(&self, name: &str) -> Option<&FieldNode> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Positional constructor parameters.
    pub fn constructor_params(&self) -> &[String] {
        &self.constructor
    }

    /// Number of nesting levels below this tree; zero for a tree without
    /// nested classes.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Every payload key any included field reads, in field order.
    pub(crate) fn input_key_set(&self) -> impl Iterator<Item = &str> {
        self.included_fields()
            .filter(|f| !f.input_ignored)
            .flat_map(|f| f.input_keys.iter().map(String::as_str))
    }

    /// JSON rendering of the tree for diagnostics and the CLI.
    pub fn outline(&self) -> Json {
        let fields: Map<String, Json> = self
            .fields
            .values()
            .map(|f| {
                let mut node = json!({
                    "types": f.types.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "groups": f.groups,
                    "excluded": f.excluded,
                    "nullable": f.nullable,
                    "input_keys": f.input_keys,
                    "output_key": f.output_key,
                });
                if f.readonly {
                    node["readonly"] = Json::Bool(true);
                }
                if let Some(default) = &f.default {
                    node["default"] = default.to_json();
                }
                if !f.children.is_empty() {
                    node["children"] =
                        Json::Array(f.children.iter().map(|c| c.outline()).collect());
                }
                (f.name.clone(), node)
            })
            .collect();

        json!({
            "class": self.class,
            "groups": self.effective_groups(),
            "height": self.height,
            "fields": fields,
        })
    }
}
