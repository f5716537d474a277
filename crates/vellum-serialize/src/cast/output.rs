//! Built-in output casts.

use serde_json::{Map, Value as Json};
use vellum_core::{ResolveError, TypeDescriptor, TypeKind, Value};

use super::{unmatched_output, OutputCast};
use crate::resolve::OutputContext;
use crate::schema::FieldNode;

/// Scalar candidate of `field` that can write `value`. Inside a collection
/// only element kinds count.
fn scalar_candidate<'f>(
    field: &'f FieldNode,
    value: &Value,
    element: bool,
) -> Option<&'f TypeDescriptor> {
    field.types().iter().find(|ty| match (ty.kind(), element) {
        (TypeKind::Mixed, _) => true,
        (TypeKind::Scalar(kind), false) | (TypeKind::CollectScalar(kind), true) => {
            kind.admits(value)
        }
        _ => false,
    })
}

/// Candidate a collection value is written under.
fn collection_candidate<'f>(field: &'f FieldNode, element: bool) -> Option<&'f TypeDescriptor> {
    field.types().iter().find(|ty| match ty.kind() {
        TypeKind::Mixed => true,
        kind => !element && kind.is_collection(),
    })
}

/// Class-bearing kind an object is written under.
fn object_kind(element: bool) -> TypeKind {
    if element {
        TypeKind::CollectObject
    } else {
        TypeKind::Object
    }
}

/// Writes an enumerant as its case name. Backing values are never written.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumOutputCast;

impl OutputCast for EnumOutputCast {
    fn matches(&self, value: &Value, field: &FieldNode, ctx: &OutputContext<'_>) -> bool {
        match value {
            Value::Enum(e) => {
                ctx.element_key().is_none()
                    && field.enums().iter().any(|d| d.name() == e.enum_name())
            }
            _ => false,
        }
    }

    fn resolve(
        &self,
        value: &Value,
        field: &FieldNode,
        ctx: &mut OutputContext<'_>,
    ) -> Result<Json, ResolveError> {
        let Value::Enum(e) = value else {
            return Err(unmatched_output(ctx.class(), field, value));
        };
        if let Some(ty) = field.type_for(TypeKind::Enum, e.enum_name()) {
            ctx.choose(field, ty);
        }
        Ok(Json::String(e.case().to_string()))
    }
}

/// Writes a nested object through the field's tree for the object's class.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectOutputCast;

impl OutputCast for ObjectOutputCast {
    fn matches(&self, value: &Value, field: &FieldNode, ctx: &OutputContext<'_>) -> bool {
        let kind = object_kind(ctx.element_key().is_some());
        matches!(
            value,
            Value::Object(o) if field.type_for(kind, o.class()).is_some()
                && field.child_for_class(o.class()).is_some()
        )
    }

    fn resolve(
        &self,
        value: &Value,
        field: &FieldNode,
        ctx: &mut OutputContext<'_>,
    ) -> Result<Json, ResolveError> {
        let Value::Object(object) = value else {
            return Err(unmatched_output(ctx.class(), field, value));
        };
        let Some(child) = field.child_for_class(object.class()) else {
            return Err(unmatched_output(ctx.class(), field, value));
        };
        let kind = object_kind(ctx.element_key().is_some());
        let Some(ty) = field.type_for(kind, object.class()) else {
            return Err(unmatched_output(ctx.class(), field, value));
        };
        ctx.choose(field, ty);
        ctx.resolve_child(field, child, object)
    }
}

/// Writes a sequence or keyed map element by element, keeping keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectionOutputCast;

impl OutputCast for CollectionOutputCast {
    fn matches(&self, value: &Value, field: &FieldNode, ctx: &OutputContext<'_>) -> bool {
        matches!(value, Value::Seq(_) | Value::Map(_))
            && collection_candidate(field, ctx.element_key().is_some()).is_some()
    }

    fn resolve(
        &self,
        value: &Value,
        field: &FieldNode,
        ctx: &mut OutputContext<'_>,
    ) -> Result<Json, ResolveError> {
        if ctx.element_key().is_none() {
            if let Some(ty) = collection_candidate(field, false) {
                ctx.choose(field, ty);
            }
        }

        match value {
            Value::Seq(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    out.push(ctx.resolve_element(field, item, index.to_string())?);
                }
                Ok(Json::Array(out))
            }
            Value::Map(map) => {
                let mut out = Map::new();
                for (key, item) in map {
                    out.insert(key.clone(), ctx.resolve_element(field, item, key.clone())?);
                }
                Ok(Json::Object(out))
            }
            other => Err(unmatched_output(ctx.class(), field, other)),
        }
    }
}

/// Writes null, bool, int, float and string values accepted by a scalar
/// candidate. Null is written for nullable fields and `mixed` candidates.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarOutputCast;

impl OutputCast for ScalarOutputCast {
    fn matches(&self, value: &Value, field: &FieldNode, ctx: &OutputContext<'_>) -> bool {
        let element = ctx.element_key().is_some();
        match value {
            Value::Null if !element && field.is_nullable() => true,
            other if other.is_scalar() => scalar_candidate(field, other, element).is_some(),
            _ => false,
        }
    }

    fn resolve(
        &self,
        value: &Value,
        field: &FieldNode,
        ctx: &mut OutputContext<'_>,
    ) -> Result<Json, ResolveError> {
        let element = ctx.element_key().is_some();
        if !element {
            if let Some(ty) = scalar_candidate(field, value, false) {
                ctx.choose(field, ty);
            }
        }
        Ok(value.to_json())
    }
}
