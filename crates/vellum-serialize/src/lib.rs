//! # vellum-serialize — Schema Graph Builder and Cast Pipeline
//!
//! Converts untyped, possibly nested payloads into structured instances and
//! back, under a visibility policy expressed as named groups.
//!
//! ## Pipeline
//!
//! ```text
//! from(payload)  → TypeGraphBuilder::build(class, groups) [cached]
//!                → InputResolver::resolve(tree, payload)   → Object → T
//! to_array(&T)   → TypeGraphBuilder::build(class, groups) [cached]
//!                → OutputResolver::resolve(tree, object)   → serde_json::Value
//! ```
//!
//! ## Key Design Principles
//!
//! 1. **Descriptors instead of reflection.** Classes and enums are declared
//!    once as [`ClassDescriptor`] / [`EnumDescriptor`] tables in a
//!    [`TypeRegistry`]. Typed structs supply theirs through [`Serializable`].
//!
//! 2. **Immutable, shared trees.** A [`SchemaTree`] is built once per
//!    `(class, groups)` and shared as `Arc<SchemaTree>`. Group membership is
//!    decided at build time and frozen into each field's `excluded` flag.
//!
//! 3. **Bounded recursion.** Nesting beyond the configured depth fails with
//!    [`SchemaError::RecursionDepthExceeded`]. Self-referential types build
//!    only when the recursive field is excluded by the requested groups.
//!
//! 4. **Deterministic casts.** Field directive casts, then user casts in
//!    registration order, then built-ins. The first match wins; no match is
//!    an error.
//!
//! 5. **Per-call choices.** What each field resolved to is recorded in a
//!    fresh [`ChoiceContext`], never in the shared tree.
//!
//! ## Crate Policy
//!
//! - Depends only on `vellum-core` internally.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod builder;
pub mod cache;
pub mod cast;
pub mod choice;
pub mod config;
pub mod descriptor;
pub mod engine;
pub mod groups;
pub mod registry;
pub mod resolve;
pub mod schema;

pub use builder::{TypeGraphBuilder, DEFAULT_MAX_DEPTH};
pub use cache::{CacheStats, MemoryCache, NoCache, SchemaCache};
pub use cast::{CastChain, InputCast, InputCastChain, OutputCast, OutputCastChain};
pub use choice::{ChoiceChild, ChoiceContext, ChoiceProperty};
pub use config::{load_document, EngineConfig};
pub use descriptor::{
    ClassDescriptor, Directive, EnumCase, EnumDescriptor, Enumerated, FieldDescriptor,
    Serializable,
};
pub use engine::{DynamicContext, Engine, EngineBuilder, SerializeContext};
pub use groups::{DeclaredGroupResolver, GroupResolver};
pub use registry::TypeRegistry;
pub use resolve::{InputContext, InputResolver, OutputContext, OutputResolver, Payload, PayloadPart};
pub use schema::{FieldNode, SchemaKey, SchemaTree};

// Core types, re-exported so downstream crates (and the conversion macros)
// need a single dependency.
pub use vellum_core::{
    Backing, ConversionError, Direction, EnumValue, FromValue, GroupSet, MapperKind, Object,
    ResolveError, ScalarKind, SchemaError, ToValue, TypeDescriptor, TypeKind, Value, VellumError,
    DEFAULT_GROUP,
};
