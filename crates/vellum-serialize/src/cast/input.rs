//! Built-in input casts.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value as Json;
use vellum_core::{ResolveError, ScalarKind, TypeDescriptor, TypeKind, Value};

use super::{unmatched_input, InputCast};
use crate::resolve::InputContext;
use crate::schema::{FieldNode, SchemaTree};

fn is_structured(value: &Json) -> bool {
    matches!(value, Json::Object(_) | Json::Array(_))
}

/// Entries of an object or array, keyed by member name or position.
fn entries(value: &Json) -> Vec<(String, &Json)> {
    match value {
        Json::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
        Json::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        _ => Vec::new(),
    }
}

/// Rebuild a collection with the shape of `source`: arrays stay sequences,
/// objects stay keyed maps with their original keys.
fn collect_like(source: &Json, resolved: Vec<(String, Value)>) -> Value {
    match source {
        Json::Array(_) => Value::Seq(resolved.into_iter().map(|(_, v)| v).collect()),
        _ => Value::Map(resolved.into_iter().collect::<IndexMap<_, _>>()),
    }
}

fn scalar_value(kind: ScalarKind, json: &Json) -> Option<Value> {
    match (kind, json) {
        (ScalarKind::String, Json::String(s)) => Some(Value::String(s.clone())),
        (ScalarKind::Int, Json::Number(n)) => n.as_i64().map(Value::Int),
        (ScalarKind::Float, Json::Number(n)) => n.as_f64().map(Value::Float),
        (ScalarKind::Bool, Json::Bool(b)) => Some(Value::Bool(*b)),
        _ => None,
    }
}

/// Class-bearing candidates paired with their nested trees.
fn candidates(field: &FieldNode) -> Vec<(&TypeDescriptor, &Arc<SchemaTree>)> {
    field
        .class_types()
        .filter_map(|ty| {
            let class = ty.class_name()?;
            field.child_for_class(class).map(|tree| (ty, tree))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// SingleChildCollectionCast
// ---------------------------------------------------------------------------

/// Resolves an object or array against the field's single nested tree.
///
/// For a `CollectObject` candidate every entry is an element and keeps its
/// key; for an `Object` candidate the value is resolved once.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleChildCollectionCast;

impl InputCast for SingleChildCollectionCast {
    fn matches(&self, value: &Json, field: &FieldNode, _ctx: &InputContext<'_>) -> bool {
        is_structured(value) && candidates(field).len() == 1
    }

    fn resolve(
        &self,
        value: &Json,
        field: &FieldNode,
        ctx: &mut InputContext<'_>,
    ) -> Result<Value, ResolveError> {
        let Some((ty, child)) = candidates(field).into_iter().next() else {
            return Err(unmatched_input(ctx.class(), field, value));
        };
        ctx.choose(field, ty);

        if ty.kind() != TypeKind::CollectObject {
            return ctx.resolve_child(field, child, value, None);
        }

        let mut resolved = Vec::new();
        for (key, element) in entries(value) {
            let item = ctx.resolve_child(field, child, element, Some(key.clone()))?;
            resolved.push((key, item));
        }
        Ok(collect_like(value, resolved))
    }
}

// ---------------------------------------------------------------------------
// BestMatchChildCast
// ---------------------------------------------------------------------------

/// Resolves an object or array against a union of nested trees.
///
/// The tree whose input keys overlap the payload keys the most wins; ties go
/// to the first declared candidate. When the union mixes single objects and
/// collections, the value is read as a single object if it shares at least
/// one key with a single-object candidate, and as a collection otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct BestMatchChildCast;

fn overlap(tree: &SchemaTree, value: &Json) -> usize {
    match value {
        Json::Object(map) => tree.input_key_set().filter(|k| map.contains_key(*k)).count(),
        _ => 0,
    }
}

fn best<'f>(
    options: &[(&'f TypeDescriptor, &'f Arc<SchemaTree>)],
    value: &Json,
) -> Option<(&'f TypeDescriptor, &'f Arc<SchemaTree>, usize)> {
    let mut best: Option<(&TypeDescriptor, &Arc<SchemaTree>, usize)> = None;
    for (ty, tree) in options {
        let score = overlap(tree, value);
        if best.map_or(true, |(_, _, top)| score > top) {
            best = Some((*ty, *tree, score));
        }
    }
    best
}

/// Candidate picked for the most elements. Ties, and empty collections, go
/// to the first declared.
fn most_picked<'f>(
    options: &[(&'f TypeDescriptor, &'f Arc<SchemaTree>)],
    picked: &[&TypeDescriptor],
) -> Option<&'f TypeDescriptor> {
    let mut top: Option<(&TypeDescriptor, usize)> = None;
    for (ty, _) in options {
        let count = picked.iter().filter(|p| **p == *ty).count();
        if top.map_or(true, |(_, most)| count > most) {
            top = Some((*ty, count));
        }
    }
    top.map(|(ty, _)| ty)
}

impl InputCast for BestMatchChildCast {
    fn matches(&self, value: &Json, field: &FieldNode, _ctx: &InputContext<'_>) -> bool {
        is_structured(value) && candidates(field).len() > 1
    }

    fn resolve(
        &self,
        value: &Json,
        field: &FieldNode,
        ctx: &mut InputContext<'_>,
    ) -> Result<Value, ResolveError> {
        let (singles, collections): (Vec<_>, Vec<_>) = candidates(field)
            .into_iter()
            .partition(|(ty, _)| ty.kind() == TypeKind::Object);

        let single = best(&singles, value);
        let as_single = match (&single, collections.is_empty()) {
            (_, true) => true,
            (None, false) => false,
            (Some((_, _, score)), false) => *score > 0,
        };

        if as_single {
            let Some((ty, tree, _)) = single else {
                return Err(unmatched_input(ctx.class(), field, value));
            };
            ctx.choose(field, ty);
            return ctx.resolve_child(field, tree, value, None);
        }

        // Each element picks its own tree; the keyed child contexts record
        // the class of every pick.
        let mut picks = Vec::new();
        for (key, element) in entries(value) {
            let Some((ty, tree, _)) = best(&collections, element) else {
                return Err(unmatched_input(ctx.class(), field, value));
            };
            picks.push((key, element, ty, tree));
        }
        let picked: Vec<&TypeDescriptor> = picks.iter().map(|(_, _, ty, _)| *ty).collect();
        if let Some(ty) = most_picked(&collections, &picked) {
            ctx.choose(field, ty);
        }

        let mut resolved = Vec::with_capacity(picks.len());
        for (key, element, _, tree) in picks {
            let item = ctx.resolve_child(field, tree, element, Some(key.clone()))?;
            resolved.push((key, item));
        }
        Ok(collect_like(value, resolved))
    }
}

// ---------------------------------------------------------------------------
// EnumInputCast
// ---------------------------------------------------------------------------

/// Resolves a case name or backing value into an enumerant.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumInputCast;

impl InputCast for EnumInputCast {
    fn matches(&self, value: &Json, field: &FieldNode, _ctx: &InputContext<'_>) -> bool {
        matches!(value, Json::String(_) | Json::Number(_))
            && field.enums().iter().any(|e| e.find(value).is_some())
    }

    fn resolve(
        &self,
        value: &Json,
        field: &FieldNode,
        ctx: &mut InputContext<'_>,
    ) -> Result<Value, ResolveError> {
        for descriptor in field.enums() {
            if let Some(case) = descriptor.find(value) {
                if let Some(ty) = field.type_for(TypeKind::Enum, descriptor.name()) {
                    ctx.choose(field, ty);
                }
                return Ok(Value::Enum(descriptor.value_of(case)));
            }
        }
        Err(unmatched_input(ctx.class(), field, value))
    }
}

// ---------------------------------------------------------------------------
// ScalarInputCast
// ---------------------------------------------------------------------------

/// Resolves a scalar against the field's scalar candidates, in declared
/// order. A `mixed` candidate accepts any value verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarInputCast;

fn scalar_candidate<'f>(field: &'f FieldNode, value: &Json) -> Option<&'f TypeDescriptor> {
    field.types().iter().find(|ty| match ty.kind() {
        TypeKind::Scalar(kind) => kind.accepts(value),
        TypeKind::Mixed => true,
        _ => false,
    })
}

impl InputCast for ScalarInputCast {
    fn matches(&self, value: &Json, field: &FieldNode, _ctx: &InputContext<'_>) -> bool {
        scalar_candidate(field, value).is_some()
    }

    fn resolve(
        &self,
        value: &Json,
        field: &FieldNode,
        ctx: &mut InputContext<'_>,
    ) -> Result<Value, ResolveError> {
        let Some(ty) = scalar_candidate(field, value) else {
            return Err(unmatched_input(ctx.class(), field, value));
        };
        ctx.choose(field, ty);
        let resolved = match ty.kind() {
            TypeKind::Scalar(kind) => scalar_value(kind, value),
            _ => Some(Value::from_json(value)),
        };
        resolved.ok_or_else(|| unmatched_input(ctx.class(), field, value))
    }
}

// ---------------------------------------------------------------------------
// ScalarCollectionCast
// ---------------------------------------------------------------------------

/// Resolves an object or array of scalars against a `CollectScalar`
/// candidate, keeping keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarCollectionCast;

fn collection_candidate<'f>(
    field: &'f FieldNode,
    value: &Json,
) -> Option<(&'f TypeDescriptor, ScalarKind)> {
    let elements = entries(value);
    field.types().iter().find_map(|ty| match ty.kind() {
        TypeKind::CollectScalar(kind) if elements.iter().all(|(_, e)| kind.accepts(e)) => {
            Some((ty, kind))
        }
        _ => None,
    })
}

impl InputCast for ScalarCollectionCast {
    fn matches(&self, value: &Json, field: &FieldNode, _ctx: &InputContext<'_>) -> bool {
        is_structured(value) && collection_candidate(field, value).is_some()
    }

    fn resolve(
        &self,
        value: &Json,
        field: &FieldNode,
        ctx: &mut InputContext<'_>,
    ) -> Result<Value, ResolveError> {
        let Some((ty, kind)) = collection_candidate(field, value) else {
            return Err(unmatched_input(ctx.class(), field, value));
        };
        ctx.choose(field, ty);
        let mut resolved = Vec::new();
        for (key, element) in entries(value) {
            let item = scalar_value(kind, element)
                .ok_or_else(|| unmatched_input(ctx.class(), field, element))?;
            resolved.push((key, item));
        }
        Ok(collect_like(value, resolved))
    }
}
