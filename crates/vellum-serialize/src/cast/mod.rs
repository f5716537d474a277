//! # Cast Chains
//!
//! A cast converts one field value in one direction. Casts are grouped into
//! ordered chains; for each value the resolver walks
//!
//! 1. the casts declared through [`Directive`](crate::Directive)s on the
//!    field (class-level first),
//! 2. the user casts registered on the engine, in registration order,
//! 3. the built-in casts,
//!
//! and applies the first one whose `matches` returns true. A value no cast
//! matches is an error, never silently dropped.
//!
//! ## Built-in input casts
//!
//! | Order | Cast                          | Matches                                   |
//! |-------|-------------------------------|-------------------------------------------|
//! | 1     | [`SingleChildCollectionCast`] | object/array, one class-bearing candidate |
//! | 2     | [`BestMatchChildCast`]        | object/array, several class candidates    |
//! | 3     | [`EnumInputCast`]             | case name or backing value of an enum     |
//! | 4     | [`ScalarInputCast`]           | scalar accepted by a scalar candidate     |
//! | 5     | [`ScalarCollectionCast`]      | collection of accepted scalars            |
//!
//! ## Built-in output casts
//!
//! | Order | Cast                     | Matches                                       |
//! |-------|--------------------------|-----------------------------------------------|
//! | 1     | [`EnumOutputCast`]       | enumerant of a declared enum (as case name)   |
//! | 2     | [`ObjectOutputCast`]     | object of a declared class with a nested tree |
//! | 3     | [`CollectionOutputCast`] | sequence or map under a collection candidate  |
//! | 4     | [`ScalarOutputCast`]     | scalar a candidate admits, null if nullable   |
//!
//! Inside a collection the output casts check elements against the element
//! kinds (`CollectObject`, `CollectScalar`) instead of the single kinds.

pub mod input;
pub mod output;

use std::fmt;
use std::sync::Arc;

use serde_json::Value as Json;
use vellum_core::{json_kind_name, Direction, ResolveError, Value};

use crate::resolve::{InputContext, OutputContext};
use crate::schema::FieldNode;

pub use input::{
    BestMatchChildCast, EnumInputCast, ScalarCollectionCast, ScalarInputCast,
    SingleChildCollectionCast,
};
pub use output::{CollectionOutputCast, EnumOutputCast, ObjectOutputCast, ScalarOutputCast};

/// Payload value → resolved value.
pub trait InputCast: Send + Sync {
    /// Name used in logs and debug output.
    fn name(&self) -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Returns true if this cast handles `value` for `field`.
    fn matches(&self, value: &Json, field: &FieldNode, ctx: &InputContext<'_>) -> bool;

    /// Convert `value`. Only called after `matches` returned true.
    fn resolve(
        &self,
        value: &Json,
        field: &FieldNode,
        ctx: &mut InputContext<'_>,
    ) -> Result<Value, ResolveError>;
}

/// Instance value → output value.
pub trait OutputCast: Send + Sync {
    /// Name used in logs and debug output.
    fn name(&self) -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Returns true if this cast handles `value` for `field`.
    fn matches(&self, value: &Value, field: &FieldNode, ctx: &OutputContext<'_>) -> bool;

    /// Convert `value`. Only called after `matches` returned true.
    fn resolve(
        &self,
        value: &Value,
        field: &FieldNode,
        ctx: &mut OutputContext<'_>,
    ) -> Result<Json, ResolveError>;
}

fn short_type_name(full: &'static str) -> &'static str {
    let path = full.split('<').next().unwrap_or(full);
    path.rsplit("::").next().unwrap_or(path)
}

// ---------------------------------------------------------------------------
// CastChain
// ---------------------------------------------------------------------------

/// Ordered casts: user casts first, then built-ins.
pub struct CastChain<C: ?Sized> {
    user: Vec<Arc<C>>,
    builtin: Vec<Arc<C>>,
}

/// Chain used by the [`InputResolver`](crate::InputResolver).
pub type InputCastChain = CastChain<dyn InputCast>;

/// Chain used by the [`OutputResolver`](crate::OutputResolver).
pub type OutputCastChain = CastChain<dyn OutputCast>;

impl<C: ?Sized> CastChain<C> {
    /// A chain without any cast.
    pub fn empty() -> Self {
        Self {
            user: Vec::new(),
            builtin: Vec::new(),
        }
    }

    /// Append a user cast. User casts run before the built-ins, in
    /// registration order.
    pub fn register(&mut self, cast: Arc<C>) -> &mut Self {
        self.user.push(cast);
        self
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, cast: Arc<C>) -> Self {
        self.user.push(cast);
        self
    }

    /// All casts in selection order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<C>> {
        self.user.iter().chain(self.builtin.iter())
    }

    pub fn len(&self) -> usize {
        self.user.len() + self.builtin.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<C: ?Sized> Clone for CastChain<C> {
    fn clone(&self) -> Self {
        Self {
            user: self.user.clone(),
            builtin: self.builtin.clone(),
        }
    }
}

impl<C: ?Sized> Default for CastChain<C> {
    fn default() -> Self {
        Self::empty()
    }
}

impl CastChain<dyn InputCast> {
    /// The built-in input casts, without user casts.
    pub fn with_builtins() -> Self {
        Self {
            user: Vec::new(),
            builtin: vec![
                Arc::new(SingleChildCollectionCast),
                Arc::new(BestMatchChildCast),
                Arc::new(EnumInputCast),
                Arc::new(ScalarInputCast),
                Arc::new(ScalarCollectionCast),
            ],
        }
    }

    /// First cast matching `value`: field directive casts, then the chain.
    pub fn select(
        &self,
        value: &Json,
        field: &FieldNode,
        ctx: &InputContext<'_>,
    ) -> Option<Arc<dyn InputCast>> {
        field
            .input_casts()
            .chain(self.iter())
            .find(|cast| cast.matches(value, field, ctx))
            .cloned()
    }
}

impl CastChain<dyn OutputCast> {
    /// The built-in output casts, without user casts.
    pub fn with_builtins() -> Self {
        Self {
            user: Vec::new(),
            builtin: vec![
                Arc::new(EnumOutputCast),
                Arc::new(ObjectOutputCast),
                Arc::new(CollectionOutputCast),
                Arc::new(ScalarOutputCast),
            ],
        }
    }

    /// First cast matching `value`: field directive casts, then the chain.
    pub fn select(
        &self,
        value: &Value,
        field: &FieldNode,
        ctx: &OutputContext<'_>,
    ) -> Option<Arc<dyn OutputCast>> {
        field
            .output_casts()
            .chain(self.iter())
            .find(|cast| cast.matches(value, field, ctx))
            .cloned()
    }
}

impl fmt::Debug for CastChain<dyn InputCast> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter().map(|c| c.name())).finish()
    }
}

impl fmt::Debug for CastChain<dyn OutputCast> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter().map(|c| c.name())).finish()
    }
}

// ---------------------------------------------------------------------------
// Error helpers
// ---------------------------------------------------------------------------

pub(crate) fn unmatched_input(class: &str, field: &FieldNode, value: &Json) -> ResolveError {
    ResolveError::NoMatchingCast {
        direction: Direction::Input,
        class: class.to_string(),
        field: field.name().to_string(),
        types: field.types_description(),
        value: json_kind_name(value).to_string(),
    }
}

pub(crate) fn unmatched_output(class: &str, field: &FieldNode, value: &Value) -> ResolveError {
    ResolveError::NoMatchingCast {
        direction: Direction::Output,
        class: class.to_string(),
        field: field.name().to_string(),
        types: field.types_description(),
        value: value.kind_name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_order() {
        let input = InputCastChain::with_builtins();
        let names: Vec<&str> = input.iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            vec![
                "SingleChildCollectionCast",
                "BestMatchChildCast",
                "EnumInputCast",
                "ScalarInputCast",
                "ScalarCollectionCast"
            ]
        );

        let output = OutputCastChain::with_builtins();
        let names: Vec<&str> = output.iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            vec![
                "EnumOutputCast",
                "ObjectOutputCast",
                "CollectionOutputCast",
                "ScalarOutputCast"
            ]
        );
    }

    #[test]
    fn test_user_casts_precede_builtins() {
        let chain = OutputCastChain::with_builtins().with(Arc::new(ScalarOutputCast));
        assert_eq!(chain.len(), 5);
        assert_eq!(chain.iter().next().map(|c| c.name()), Some("ScalarOutputCast"));
        assert!(OutputCastChain::empty().is_empty());
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name("a::b::Cast"), "Cast");
        assert_eq!(short_type_name("a::Wrap<b::C>"), "Wrap");
        assert_eq!(short_type_name("Plain"), "Plain");
    }
}
