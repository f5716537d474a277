//! # Output Resolution
//!
//! [`Object`] → associative `serde_json::Value`, symmetric to input
//! resolution. Excluded and output-ignored fields are omitted. Every other
//! field goes through the output cast chain and is written under its output
//! key, in declaration order.

use serde_json::{Map, Value as Json};
use vellum_core::{GroupSet, Object, ResolveError, TypeDescriptor, Value};

use crate::cast::{unmatched_output, OutputCastChain};
use crate::choice::ChoiceContext;
use crate::schema::{FieldNode, SchemaTree};

/// Writes objects through schema trees.
#[derive(Debug, Clone)]
pub struct OutputResolver {
    casts: OutputCastChain,
}

impl Default for OutputResolver {
    fn default() -> Self {
        Self::new(OutputCastChain::with_builtins())
    }
}

impl OutputResolver {
    pub fn new(casts: OutputCastChain) -> Self {
        Self { casts }
    }

    pub fn casts(&self) -> &OutputCastChain {
        &self.casts
    }

    /// Write `object` as an associative structure.
    pub fn resolve(&self, tree: &SchemaTree, object: &Object) -> Result<Json, ResolveError> {
        let mut choices = ChoiceContext::new(tree.class(), tree.requested_groups().clone());
        self.resolve_with(tree, object, &mut choices)
    }

    /// Like [`resolve`](Self::resolve), recording choices into `choices`.
    pub fn resolve_with(
        &self,
        tree: &SchemaTree,
        object: &Object,
        choices: &mut ChoiceContext,
    ) -> Result<Json, ResolveError> {
        if object.class() != tree.class() {
            return Err(ResolveError::InvalidPayload {
                class: tree.class().to_string(),
                reason: format!("got an instance of {}", object.class()),
            });
        }

        let null = Value::Null;
        let mut out = Map::new();
        let mut ctx = OutputContext {
            resolver: self,
            tree,
            choices,
            element_key: None,
        };

        for field in tree.fields() {
            if field.skips_output() {
                continue;
            }
            let value = match object.get(field.name()) {
                Some(value) => value,
                None => {
                    tracing::debug!(
                        class = tree.class(),
                        field = field.name(),
                        "field not assigned, writing null"
                    );
                    &null
                }
            };
            let json = self.apply(field, value, &mut ctx)?;
            out.insert(field.output_key().to_string(), json);
        }
        Ok(Json::Object(out))
    }

    fn apply(
        &self,
        field: &FieldNode,
        value: &Value,
        ctx: &mut OutputContext<'_>,
    ) -> Result<Json, ResolveError> {
        let cast = self
            .casts
            .select(value, field, ctx)
            .ok_or_else(|| unmatched_output(ctx.class(), field, value))?;
        tracing::trace!(
            class = ctx.class(),
            field = field.name(),
            cast = cast.name(),
            "output cast selected"
        );
        cast.resolve(value, field, ctx)
    }
}

/// State handed to output casts.
pub struct OutputContext<'r> {
    resolver: &'r OutputResolver,
    tree: &'r SchemaTree,
    choices: &'r mut ChoiceContext,
    element_key: Option<String>,
}

impl OutputContext<'_> {
    /// Tree of the object being written.
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

    /// Collection key of the element being written, when inside a
    /// collection.
    pub fn element_key(&self) -> Option<&str> {
        self.element_key.as_deref()
    }

    /// Record the candidate type `field` resolved to.
    pub fn choose(&mut self, field: &FieldNode, ty: &TypeDescriptor) {
        self.choices.property_mut(field.name()).set_chosen(ty.clone());
    }

    /// Write `object` through the nested tree `child` of `field`, under a
    /// fresh child choice context keyed by the current element key.
    pub fn resolve_child(
        &mut self,
        field: &FieldNode,
        child: &SchemaTree,
        object: &Object,
    ) -> Result<Json, ResolveError> {
        let mut nested = ChoiceContext::new(child.class(), self.choices.groups().clone());
        let json = self.resolver.resolve_with(child, object, &mut nested)?;
        let key = self.element_key.clone();
        self.choices
            .property_mut(field.name())
            .push_child(key, nested);
        Ok(json)
    }

    /// Run one collection element of `field` through the output chain.
    pub fn resolve_element(
        &mut self,
        field: &FieldNode,
        value: &Value,
        key: String,
    ) -> Result<Json, ResolveError> {
        let previous = self.element_key.replace(key);
        let resolver = self.resolver;
        let result = resolver.apply(field, value, self);
        self.element_key = previous;
        result
    }
}
