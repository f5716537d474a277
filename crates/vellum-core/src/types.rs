//! # Type Descriptors
//!
//! A field declares one or more ordered [`TypeDescriptor`]s. More than one
//! descriptor makes a union type; resolution tries the candidates in
//! declared order.
//!
//! The set of kinds is closed: every cast dispatches on [`TypeKind`], and
//! adding a kind forces every exhaustive `match` to handle it.
//!
//! ## Textual form
//!
//! Descriptors have a compact textual form used by schema files and
//! diagnostics:
//!
//! | Text            | Kind                          |
//! |-----------------|-------------------------------|
//! | `string`        | `Scalar(String)`              |
//! | `int`           | `Scalar(Int)`                 |
//! | `float`         | `Scalar(Float)`               |
//! | `bool`          | `Scalar(Bool)`                |
//! | `mixed`         | `Mixed`                       |
//! | `enum:Status`   | `Enum` of `Status`            |
//! | `LineItem`      | `Object` of `LineItem`        |
//! | `LineItem[]`    | `CollectObject` of `LineItem` |
//! | `int[]`         | `CollectScalar(Int)`          |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as Json;

use crate::value::Value;

/// Scalar shapes a field can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// UTF-8 string.
    String,
    /// 64-bit signed integer.
    Int,
    /// 64-bit float. Integers are accepted and widened.
    Float,
    /// Boolean.
    Bool,
}

impl ScalarKind {
    /// Lowercase name of the scalar kind.
    pub fn name(&self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Int => "int",
            ScalarKind::Float => "float",
            ScalarKind::Bool => "bool",
        }
    }

    /// Returns true if the JSON value can be assigned to this scalar kind.
    pub fn accepts(&self, json: &Json) -> bool {
        match (self, json) {
            (ScalarKind::String, Json::String(_)) => true,
            (ScalarKind::Int, Json::Number(n)) => n.is_i64(),
            (ScalarKind::Float, Json::Number(_)) => true,
            (ScalarKind::Bool, Json::Bool(_)) => true,
            _ => false,
        }
    }

    /// Returns true if a resolved value can be written as this scalar kind.
    /// Floats take integers too.
    pub fn admits(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (ScalarKind::String, Value::String(_))
                | (ScalarKind::Int, Value::Int(_))
                | (ScalarKind::Float, Value::Float(_) | Value::Int(_))
                | (ScalarKind::Bool, Value::Bool(_))
        )
    }

    fn parse(s: &str) -> Option<ScalarKind> {
        match s {
            "string" => Some(ScalarKind::String),
            "int" => Some(ScalarKind::Int),
            "float" => Some(ScalarKind::Float),
            "bool" => Some(ScalarKind::Bool),
            _ => None,
        }
    }
}

/// Kind tag of a [`TypeDescriptor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// A single scalar.
    Scalar(ScalarKind),
    /// An enumerant of a declared enum.
    Enum,
    /// A single instance of a declared class.
    Object,
    /// A keyed or positional collection of instances of one declared class.
    CollectObject,
    /// A keyed or positional collection of scalars.
    CollectScalar(ScalarKind),
    /// Untyped union member: accepts any payload value verbatim.
    Mixed,
}

impl TypeKind {
    /// Returns true for kinds that reference a class and therefore carry a
    /// nested schema tree.
    pub fn exists_class(&self) -> bool {
        matches!(self, TypeKind::Object | TypeKind::CollectObject)
    }

    /// Returns true for collection kinds.
    pub fn is_collection(&self) -> bool {
        matches!(self, TypeKind::CollectObject | TypeKind::CollectScalar(_))
    }
}

/// One candidate type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    kind: TypeKind,
    /// Class or enum name for `Object`, `CollectObject` and `Enum`.
    target: Option<String>,
}

impl TypeDescriptor {
    /// A scalar of the given kind.
    pub fn scalar(kind: ScalarKind) -> Self {
        Self {
            kind: TypeKind::Scalar(kind),
            target: None,
        }
    }

    /// `string`.
    pub fn string() -> Self {
        Self::scalar(ScalarKind::String)
    }

    /// `int`.
    pub fn int() -> Self {
        Self::scalar(ScalarKind::Int)
    }

    /// `float`.
    pub fn float() -> Self {
        Self::scalar(ScalarKind::Float)
    }

    /// `bool`.
    pub fn bool() -> Self {
        Self::scalar(ScalarKind::Bool)
    }

    /// `mixed`.
    pub fn mixed() -> Self {
        Self {
            kind: TypeKind::Mixed,
            target: None,
        }
    }

    /// An enumerant of `enum_name`.
    pub fn enumeration(enum_name: impl Into<String>) -> Self {
        Self {
            kind: TypeKind::Enum,
            target: Some(enum_name.into()),
        }
    }

    /// A single instance of `class`.
    pub fn object(class: impl Into<String>) -> Self {
        Self {
            kind: TypeKind::Object,
            target: Some(class.into()),
        }
    }

    /// A collection of instances of `class`.
    pub fn collect_object(class: impl Into<String>) -> Self {
        Self {
            kind: TypeKind::CollectObject,
            target: Some(class.into()),
        }
    }

    /// A collection of scalars.
    pub fn collect_scalar(kind: ScalarKind) -> Self {
        Self {
            kind: TypeKind::CollectScalar(kind),
            target: None,
        }
    }

    /// Kind tag.
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Referenced class name, for `Object` and `CollectObject`.
    pub fn class_name(&self) -> Option<&str> {
        if self.kind.exists_class() {
            self.target.as_deref()
        } else {
            None
        }
    }

    /// Referenced enum name, for `Enum`.
    pub fn enum_name(&self) -> Option<&str> {
        if self.kind == TypeKind::Enum {
            self.target.as_deref()
        } else {
            None
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = self.target.as_deref().unwrap_or("?");
        match self.kind {
            TypeKind::Scalar(s) => f.write_str(s.name()),
            TypeKind::Mixed => f.write_str("mixed"),
            TypeKind::Enum => write!(f, "enum:{target}"),
            TypeKind::Object => f.write_str(target),
            TypeKind::CollectObject => write!(f, "{target}[]"),
            TypeKind::CollectScalar(s) => write!(f, "{}[]", s.name()),
        }
    }
}

/// Error parsing the textual form of a [`TypeDescriptor`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid type descriptor '{0}'")]
pub struct ParseTypeError(pub String);

impl FromStr for TypeDescriptor {
    type Err = ParseTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || ParseTypeError(s.to_string());
        if s.is_empty() {
            return Err(invalid());
        }
        if s == "mixed" {
            return Ok(Self::mixed());
        }
        if let Some(name) = s.strip_prefix("enum:") {
            return if is_identifier(name) {
                Ok(Self::enumeration(name))
            } else {
                Err(invalid())
            };
        }
        if let Some(inner) = s.strip_suffix("[]") {
            if let Some(kind) = ScalarKind::parse(inner) {
                return Ok(Self::collect_scalar(kind));
            }
            return if is_identifier(inner) {
                Ok(Self::collect_object(inner))
            } else {
                Err(invalid())
            };
        }
        if let Some(kind) = ScalarKind::parse(s) {
            return Ok(Self::scalar(kind));
        }
        if is_identifier(s) {
            Ok(Self::object(s))
        } else {
            Err(invalid())
        }
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':' || c == '.')
}

impl Serialize for TypeDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TypeDescriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Render a list of candidates as `a|b|c`.
pub fn describe_union(types: &[TypeDescriptor]) -> String {
    if types.is_empty() {
        return "none".to_string();
    }
    types
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_textual_forms() {
        assert_eq!("string".parse::<TypeDescriptor>().unwrap(), TypeDescriptor::string());
        assert_eq!("mixed".parse::<TypeDescriptor>().unwrap(), TypeDescriptor::mixed());
        assert_eq!(
            "enum:Status".parse::<TypeDescriptor>().unwrap(),
            TypeDescriptor::enumeration("Status")
        );
        assert_eq!(
            "LineItem".parse::<TypeDescriptor>().unwrap(),
            TypeDescriptor::object("LineItem")
        );
        assert_eq!(
            "LineItem[]".parse::<TypeDescriptor>().unwrap(),
            TypeDescriptor::collect_object("LineItem")
        );
        assert_eq!(
            "int[]".parse::<TypeDescriptor>().unwrap(),
            TypeDescriptor::collect_scalar(ScalarKind::Int)
        );
    }

    #[test]
    fn test_admits_resolved_values() {
        assert!(ScalarKind::Float.admits(&Value::Int(2)));
        assert!(ScalarKind::Float.admits(&Value::Float(0.5)));
        assert!(!ScalarKind::Int.admits(&Value::Float(0.5)));
        assert!(!ScalarKind::String.admits(&Value::Null));
        assert!(!ScalarKind::Bool.admits(&Value::Seq(vec![])));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<TypeDescriptor>().is_err());
        assert!("enum:".parse::<TypeDescriptor>().is_err());
        assert!("9lives".parse::<TypeDescriptor>().is_err());
        assert!("a b".parse::<TypeDescriptor>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for text in ["string", "float", "mixed", "enum:Status", "Order", "Order[]", "bool[]"] {
            let td: TypeDescriptor = text.parse().unwrap();
            assert_eq!(td.to_string(), text);
        }
    }

    #[test]
    fn test_class_and_enum_names() {
        assert_eq!(TypeDescriptor::object("A").class_name(), Some("A"));
        assert_eq!(TypeDescriptor::collect_object("A").class_name(), Some("A"));
        assert_eq!(TypeDescriptor::enumeration("E").class_name(), None);
        assert_eq!(TypeDescriptor::enumeration("E").enum_name(), Some("E"));
        assert!(TypeDescriptor::string().class_name().is_none());
    }

    #[test]
    fn test_scalar_accepts() {
        assert!(ScalarKind::Int.accepts(&json!(3)));
        assert!(!ScalarKind::Int.accepts(&json!(3.5)));
        assert!(ScalarKind::Float.accepts(&json!(3)));
        assert!(!ScalarKind::String.accepts(&json!(3)));
        assert!(!ScalarKind::Bool.accepts(&json!(null)));
    }

    #[test]
    fn test_describe_union() {
        let types = vec![TypeDescriptor::int(), TypeDescriptor::string()];
        assert_eq!(describe_union(&types), "int|string");
        assert_eq!(describe_union(&[]), "none");
    }

    #[test]
    fn test_serde_uses_textual_form() {
        let td = TypeDescriptor::collect_object("LineItem");
        let json = serde_json::to_value(&td).unwrap();
        assert_eq!(json, json!("LineItem[]"));
        let back: TypeDescriptor = serde_json::from_value(json).unwrap();
        assert_eq!(back, td);
    }
}
