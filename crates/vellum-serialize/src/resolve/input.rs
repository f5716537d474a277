//! # Input Resolution
//!
//! Payload → [`Object`]. The payload is first normalized into one keyed map
//! (see [`Payload`]), then each field of the tree is read in declaration
//! order:
//!
//! 1. Excluded and input-ignored fields are not read.
//! 2. The value is looked up under the field's input keys, in order.
//! 3. A missing value takes the field default, else `null` for a nullable
//!    field, else fails with [`ResolveError::MissingRequiredField`].
//! 4. An explicit `null` on a nullable field stays `null`.
//! 5. Anything else goes through the input cast chain.

use serde_json::{Map, Value as Json};
use vellum_core::{json_kind_name, GroupSet, Object, ResolveError, TypeDescriptor, Value};

use crate::cast::{unmatched_input, InputCastChain};
use crate::choice::ChoiceContext;
use crate::schema::{FieldNode, SchemaTree};

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// One argument of a payload.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadPart {
    /// A value addressed by name.
    Named(String, Json),
    /// A value addressed by position. Objects are merged key by key; any
    /// other value is stored under its position index.
    Positional(Json),
}

/// Top-level payload: an ordered list of named and positional parts.
///
/// Parts are merged in order, so a later part overrides an earlier one on a
/// key collision.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    parts: Vec<PayloadPart>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a named part.
    pub fn named(mut self, name: impl Into<String>, value: Json) -> Self {
        self.parts.push(PayloadPart::Named(name.into(), value));
        self
    }

    /// Append a positional part.
    pub fn positional(mut self, value: Json) -> Self {
        self.parts.push(PayloadPart::Positional(value));
        self
    }

    pub fn push(&mut self, part: PayloadPart) {
        self.parts.push(part);
    }

    pub fn parts(&self) -> &[PayloadPart] {
        &self.parts
    }

    /// Merge every part into one keyed map.
    pub fn normalize(&self) -> Map<String, Json> {
        let mut merged = Map::new();
        for (index, part) in self.parts.iter().enumerate() {
            match part {
                PayloadPart::Named(name, value) => {
                    merged.insert(name.clone(), value.clone());
                }
                PayloadPart::Positional(Json::Object(map)) => {
                    for (key, value) in map {
                        merged.insert(key.clone(), value.clone());
                    }
                }
                PayloadPart::Positional(other) => {
                    merged.insert(index.to_string(), other.clone());
                }
            }
        }
        merged
    }
}

/// A JSON array becomes one positional part per element; any other value a
/// single positional part.
impl From<Json> for Payload {
    fn from(json: Json) -> Self {
        match json {
            Json::Array(items) => Self {
                parts: items.into_iter().map(PayloadPart::Positional).collect(),
            },
            other => Self {
                parts: vec![PayloadPart::Positional(other)],
            },
        }
    }
}

impl From<Map<String, Json>> for Payload {
    fn from(map: Map<String, Json>) -> Self {
        Self::from(Json::Object(map))
    }
}

impl<K: Into<String>> FromIterator<(K, Json)> for Payload {
    fn from_iter<I: IntoIterator<Item = (K, Json)>>(iter: I) -> Self {
        Self {
            parts: iter
                .into_iter()
                .map(|(k, v)| PayloadPart::Named(k.into(), v))
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// InputResolver
// ---------------------------------------------------------------------------

/// Resolves payloads against schema trees.
#[derive(Debug, Clone)]
pub struct InputResolver {
    casts: InputCastChain,
}

impl Default for InputResolver {
    fn default() -> Self {
        Self::new(InputCastChain::with_builtins())
    }
}

impl InputResolver {
    pub fn new(casts: InputCastChain) -> Self {
        Self { casts }
    }

    pub fn casts(&self) -> &InputCastChain {
        &self.casts
    }

    /// Resolve `payload` into an instance of the tree's class.
    pub fn resolve(
        &self,
        tree: &SchemaTree,
        payload: impl Into<Payload>,
    ) -> Result<Object, ResolveError> {
        let mut choices = ChoiceContext::new(tree.class(), tree.requested_groups().clone());
        self.resolve_with(tree, payload, &mut choices)
    }

    /// Like [`resolve`](Self::resolve), recording choices into `choices`.
    pub fn resolve_with(
        &self,
        tree: &SchemaTree,
        payload: impl Into<Payload>,
        choices: &mut ChoiceContext,
    ) -> Result<Object, ResolveError> {
        let map = payload.into().normalize();
        self.resolve_map(tree, &map, choices)
    }

    /// Resolve a nested payload, which must be an object or an array.
    pub(crate) fn resolve_json(
        &self,
        tree: &SchemaTree,
        json: &Json,
        choices: &mut ChoiceContext,
    ) -> Result<Object, ResolveError> {
        match json {
            Json::Object(map) => self.resolve_map(tree, map, choices),
            Json::Array(items) => {
                let map: Map<String, Json> = items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (i.to_string(), v.clone()))
                    .collect();
                self.resolve_map(tree, &map, choices)
            }
            other => Err(ResolveError::InvalidPayload {
                class: tree.class().to_string(),
                reason: format!("expected object or array, found {}", json_kind_name(other)),
            }),
        }
    }

    fn resolve_map(
        &self,
        tree: &SchemaTree,
        map: &Map<String, Json>,
        choices: &mut ChoiceContext,
    ) -> Result<Object, ResolveError> {
        let mut object = Object::new(tree.class());
        let mut ctx = InputContext {
            resolver: self,
            tree,
            choices,
        };

        for field in tree.fields() {
            let found = if field.skips_input() {
                None
            } else {
                field.input_keys().iter().find_map(|k| map.get(k))
            };
            let value = match found {
                None => fallback(tree, field)?,
                Some(Json::Null) if field.is_nullable() => Value::Null,
                Some(json) => self.apply(field, json, &mut ctx)?,
            };
            object.insert(field.name(), value);
        }
        Ok(object)
    }

    fn apply(
        &self,
        field: &FieldNode,
        json: &Json,
        ctx: &mut InputContext<'_>,
    ) -> Result<Value, ResolveError> {
        let cast = self
            .casts
            .select(json, field, ctx)
            .ok_or_else(|| unmatched_input(ctx.class(), field, json))?;
        tracing::trace!(
            class = ctx.class(),
            field = field.name(),
            cast = cast.name(),
            "input cast selected"
        );
        cast.resolve(json, field, ctx)
    }
}

fn fallback(tree: &SchemaTree, field: &FieldNode) -> Result<Value, ResolveError> {
    if let Some(default) = field.default() {
        return Ok(default.clone());
    }
    if field.is_nullable() {
        return Ok(Value::Null);
    }
    Err(ResolveError::MissingRequiredField {
        class: tree.class().to_string(),
        field: field.name().to_string(),
    })
}

// ---------------------------------------------------------------------------
// InputContext
// ---------------------------------------------------------------------------

/// State handed to input casts: the tree being resolved and the choice
/// record of the current object.
pub struct InputContext<'r> {
    resolver: &'r InputResolver,
    tree: &'r SchemaTree,
    choices: &'r mut ChoiceContext,
}

impl InputContext<'_> {
    /// Tree of the object being resolved.
    pub fn tree(&self) -> &SchemaTree {
        self.tree
    }

    pub fn class(&self) -> &str {
        self.tree.class()
    }

    /// Groups of the current call.
    pub fn groups(&self) -> &GroupSet {
        self.choices.groups()
    }

    pub fn choices(&self) -> &ChoiceContext {
        &*self.choices
    }

    /// Record the candidate type `field` resolved to.
    pub fn choose(&mut self, field: &FieldNode, ty: &TypeDescriptor) {
        self.choices.property_mut(field.name()).set_chosen(ty.clone());
    }

    /// Resolve `payload` against the nested tree `child` of `field`, under a
    /// fresh child choice context stored under `key`.
    pub fn resolve_child(
        &mut self,
        field: &FieldNode,
        child: &SchemaTree,
        payload: &Json,
        key: Option<String>,
    ) -> Result<Value, ResolveError> {
        let mut nested = ChoiceContext::new(child.class(), self.choices.groups().clone());
        let object = self.resolver.resolve_json(child, payload, &mut nested)?;
        self.choices
            .property_mut(field.name())
            .push_child(key, nested);
        Ok(Value::Object(object))
    }
}
