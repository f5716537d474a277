//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types used throughout vellum. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Schema errors are raised while building a schema tree. They describe
//!   defects in the declared type graph (unknown groups, unbounded recursion,
//!   unregistered classes) and are never retried.
//! - Resolve errors are raised while converting a payload into an object or
//!   an object into an associative structure. They name the class and field
//!   that failed so the caller can locate the offending declaration.
//! - Conversion errors are raised by the typed `FromValue` layer when a
//!   resolved dynamic value does not fit the Rust field it is assigned to.

use std::fmt;

use thiserror::Error;

/// Top-level error type for vellum.
#[derive(Error, Debug)]
pub enum VellumError {
    /// Building the schema tree failed.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Resolving a payload or an object failed.
    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),

    /// Configuration could not be loaded or is inconsistent.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error while building a schema tree from class descriptors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A requested group is not declared by the class or any of its fields.
    #[error("group '{group}' is not declared anywhere in {class}")]
    UnknownGroup {
        /// Class the groups were requested for.
        class: String,
        /// The undeclared group.
        group: String,
    },

    /// The nesting of structured types exceeded the configured ceiling.
    ///
    /// This signals a self-referential or unbounded type graph. It is a
    /// defect in the declarations, not in the input data.
    #[error("maximum nesting level of {max_depth} exceeded while building {class} at depth {depth}")]
    RecursionDepthExceeded {
        /// Class whose build crossed the ceiling.
        class: String,
        /// Configured maximum depth.
        max_depth: usize,
        /// Depth at which the build was attempted.
        depth: usize,
    },

    /// A type descriptor referenced a class that is not registered.
    #[error("class '{0}' is not registered")]
    UnknownClass(String),

    /// A type descriptor referenced an enum that is not registered.
    #[error("enum '{0}' is not registered")]
    UnknownEnum(String),
}

/// Direction of a resolution pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Payload to object.
    Input,
    /// Object to associative structure.
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Input => f.write_str("input"),
            Direction::Output => f.write_str("output"),
        }
    }
}

/// Error while resolving a payload into an object, or an object into output.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    /// No cast in the chain accepted the field's runtime value.
    #[error("no {direction} cast matched {class}.{field} (candidate types: {types}, value: {value})")]
    NoMatchingCast {
        /// Resolution direction.
        direction: Direction,
        /// Class that declares the field.
        class: String,
        /// Field name.
        field: String,
        /// Candidate types of the field, in declared order.
        types: String,
        /// Short description of the offending value.
        value: String,
    },

    /// The field has no value, no default and is not nullable.
    #[error("required field {class}.{field} has no value, no default and is not nullable")]
    MissingRequiredField {
        /// Class that declares the field.
        class: String,
        /// Field name.
        field: String,
    },

    /// A nested payload could not be read as an associative structure.
    #[error("invalid payload for {class}: {reason}")]
    InvalidPayload {
        /// Class the payload was resolved against.
        class: String,
        /// Why the payload was rejected.
        reason: String,
    },

    /// The resolved object could not be turned into its typed form.
    #[error("cannot construct {class}: {source}")]
    Conversion {
        /// Target class.
        class: String,
        /// Underlying conversion failure.
        #[source]
        source: ConversionError,
    },

    /// The schema tree could not be built.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Error converting a dynamic [`Value`](crate::Value) into a Rust type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// The value has a different shape than the target type.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        /// Expected shape.
        expected: &'static str,
        /// Actual shape.
        found: &'static str,
    },

    /// An enumerant name does not belong to the target enum.
    #[error("unknown {enum_name} case '{case}'")]
    UnknownCase {
        /// Target enum.
        enum_name: String,
        /// Offending case name.
        case: String,
    },

    /// An object belongs to another class than the one expected.
    #[error("expected object of class {expected}, found {found}")]
    ClassMismatch {
        /// Expected class.
        expected: String,
        /// Actual class.
        found: String,
    },

    /// A named field failed to convert.
    #[error("field '{field}': {source}")]
    Field {
        /// Field name.
        field: String,
        /// Underlying conversion failure.
        #[source]
        source: Box<ConversionError>,
    },
}

impl ConversionError {
    /// Attach the field name the conversion failed for.
    pub fn in_field(self, field: impl Into<String>) -> Self {
        ConversionError::Field {
            field: field.into(),
            source: Box::new(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_group_display() {
        let err = SchemaError::UnknownGroup {
            class: "User".into(),
            group: "root".into(),
        };
        assert_eq!(err.to_string(), "group 'root' is not declared anywhere in User");
    }

    #[test]
    fn test_recursion_depth_display() {
        let err = SchemaError::RecursionDepthExceeded {
            class: "Node".into(),
            max_depth: 10,
            depth: 11,
        };
        let msg = err.to_string();
        assert!(msg.contains("maximum nesting level of 10"));
        assert!(msg.contains("Node"));
    }

    #[test]
    fn test_no_matching_cast_names_field_and_types() {
        let err = ResolveError::NoMatchingCast {
            direction: Direction::Input,
            class: "Order".into(),
            field: "total".into(),
            types: "int|float".into(),
            value: "string".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("input"));
        assert!(msg.contains("Order.total"));
        assert!(msg.contains("int|float"));
    }

    #[test]
    fn test_schema_error_converts_into_resolve_and_top_level() {
        let schema = SchemaError::UnknownClass("Ghost".into());
        let resolve: ResolveError = schema.clone().into();
        assert_eq!(resolve, ResolveError::Schema(schema.clone()));
        let top: VellumError = schema.into();
        assert!(matches!(top, VellumError::Schema(SchemaError::UnknownClass(_))));
    }

    #[test]
    fn test_conversion_error_in_field_nests() {
        let err = ConversionError::TypeMismatch {
            expected: "int",
            found: "string",
        }
        .in_field("quantity");
        assert_eq!(err.to_string(), "field 'quantity': expected int, found string");
    }
}
