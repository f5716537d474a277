//! # vellum-core — Foundational Types for vellum
//!
//! This crate is the leaf of the vellum workspace. It defines the data that
//! flows through the schema builder and the resolvers, and nothing that
//! depends on a particular schema or cast set.
//!
//! ## Key Design Principles
//!
//! 1. **One dynamic value model.** Payloads arrive as `serde_json::Value`;
//!    resolved instances are [`Value`]s holding [`Object`]s and
//!    [`EnumValue`]s. Output is `serde_json::Value` again. No other
//!    intermediate representation exists.
//!
//! 2. **Closed type kinds.** [`TypeKind`] enumerates every shape a field can
//!    declare. Casts dispatch on it exhaustively.
//!
//! 3. **Canonical group sets.** [`GroupSet`] is sorted and de-duplicated by
//!    construction so its signature is stable across calls.
//!
//! 4. **Structured errors.** Every failure names the class and field it
//!    concerns. See [`error`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `vellum-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod convert;
pub mod error;
pub mod group;
pub mod mapper;
pub mod types;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use convert::{FromValue, ToValue};
pub use error::{ConversionError, Direction, ResolveError, SchemaError, VellumError};
pub use group::{GroupSet, DEFAULT_GROUP};
pub use mapper::{CamelCaseMapper, MapperKind, NameMapper, PascalCaseMapper, SnakeCaseMapper};
pub use types::{describe_union, ParseTypeError, ScalarKind, TypeDescriptor, TypeKind};
pub use value::{json_kind_name, Backing, EnumValue, Object, Value};
