//! # Resolvers
//!
//! The two passes driven by a [`SchemaTree`](crate::SchemaTree):
//!
//! - [`InputResolver`]: payload (`serde_json::Value`) → [`Object`](vellum_core::Object)
//! - [`OutputResolver`]: [`Object`](vellum_core::Object) → associative `serde_json::Value`
//!
//! Both walk the tree's fields in declaration order, hand every
//! participating value to their cast chain and record what they chose in a
//! [`ChoiceContext`](crate::ChoiceContext). Neither returns partial results:
//! the first failing field aborts the whole call.

pub mod input;
pub mod output;

pub use input::{InputContext, InputResolver, Payload, PayloadPart};
pub use output::{OutputContext, OutputResolver};
