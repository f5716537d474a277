//! # Dynamic Value Model
//!
//! `Value` is the currency passed between the resolvers and the casts. It is
//! a superset of JSON: on top of the JSON shapes it carries structured
//! [`Object`]s (an instance of a declared class) and [`EnumValue`]s (an
//! enumerant of a declared enum).
//!
//! Keyed collections use [`IndexMap`] so that the original key order of a
//! payload survives resolution. Sequences stay sequences; keys are never
//! renumbered.

use indexmap::IndexMap;
use serde_json::{Map, Number, Value as Json};

use crate::convert::FromValue;
use crate::error::ConversionError;

/// A resolved value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absence of a value.
    #[default]
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Integer scalar.
    Int(i64),
    /// Floating point scalar.
    Float(f64),
    /// String scalar.
    String(String),
    /// Positional collection.
    Seq(Vec<Value>),
    /// Keyed collection, in original key order.
    Map(IndexMap<String, Value>),
    /// Instance of a declared class.
    Object(Object),
    /// Enumerant of a declared enum.
    Enum(EnumValue),
}

impl Value {
    /// Short name of the value's shape, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Seq(_) => "sequence",
            Value::Map(_) => "map",
            Value::Object(_) => "object",
            Value::Enum(_) => "enum",
        }
    }

    /// Returns true for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true for null, bool, int, float and string.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::String(_)
        )
    }

    /// Borrow the string slice of a [`Value::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer content of a [`Value::Int`].
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric content of a [`Value::Int`] or [`Value::Float`].
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Boolean content of a [`Value::Bool`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Borrow the object of a [`Value::Object`].
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Borrow the enumerant of a [`Value::Enum`].
    pub fn as_enum(&self) -> Option<&EnumValue> {
        match self {
            Value::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// Convert a JSON scalar into a scalar value. Returns `None` for arrays
    /// and objects.
    pub fn from_json_scalar(json: &Json) -> Option<Value> {
        match json {
            Json::Null => Some(Value::Null),
            Json::Bool(b) => Some(Value::Bool(*b)),
            Json::Number(n) => Some(number_to_value(n)),
            Json::String(s) => Some(Value::String(s.clone())),
            Json::Array(_) | Json::Object(_) => None,
        }
    }

    /// Convert raw JSON without any schema: arrays become sequences and
    /// objects become keyed maps.
    pub fn from_json(json: &Json) -> Value {
        match json {
            Json::Array(items) => Value::Seq(items.iter().map(Value::from_json).collect()),
            Json::Object(map) => Value::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
            scalar => Value::from_json_scalar(scalar).unwrap_or(Value::Null),
        }
    }

    /// Convert to raw JSON without any schema.
    ///
    /// Objects become maps of their fields in insertion order, enumerants
    /// become their case name, and non-finite floats become `null`.
    pub fn to_json(&self) -> Json {
        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(n) => Json::Number(Number::from(*n)),
            Value::Float(f) => Number::from_f64(*f).map(Json::Number).unwrap_or(Json::Null),
            Value::String(s) => Json::String(s.clone()),
            Value::Seq(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<Map<String, Json>>(),
            ),
            Value::Object(o) => Json::Object(
                o.fields()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect::<Map<String, Json>>(),
            ),
            Value::Enum(e) => Json::String(e.case().to_string()),
        }
    }
}

fn number_to_value(n: &Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Int(i)
    } else {
        Value::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

/// Short name of a JSON value's shape, used in diagnostics.
pub fn json_kind_name(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(n) if n.is_i64() || n.is_u64() => "int",
        Json::Number(_) => "float",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Object
// ---------------------------------------------------------------------------

/// An instance of a declared class: the class name plus its field values in
/// declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Object {
    class: String,
    fields: IndexMap<String, Value>,
}

impl Object {
    /// Create an empty instance of `class`.
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            fields: IndexMap::new(),
        }
    }

    /// Builder-style field assignment.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Name of the class this object is an instance of.
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Assign a field, returning the previous value if any.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(name.into(), value)
    }

    /// Borrow a field value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Returns true if the field has been assigned.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Iterate over `(name, value)` pairs in assignment order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of assigned fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no field is assigned.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Remove a field and convert it to `T`.
    ///
    /// A field that was never assigned converts from [`Value::Null`], so
    /// `Option<T>` targets read absent fields as `None`.
    pub fn take<T: FromValue>(&mut self, name: &str) -> Result<T, ConversionError> {
        let value = self.fields.shift_remove(name).unwrap_or(Value::Null);
        T::from_value(value).map_err(|e| e.in_field(name))
    }

    /// Values of `names` in the given order, `Null` for unassigned ones.
    ///
    /// Used to feed positional constructors.
    pub fn positional<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Vec<Value> {
        names
            .into_iter()
            .map(|n| self.fields.get(n).cloned().unwrap_or(Value::Null))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// EnumValue
// ---------------------------------------------------------------------------

/// Backing scalar of an enumerant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Backing {
    /// Integer-backed case.
    Int(i64),
    /// String-backed case.
    String(String),
}

impl Backing {
    /// Returns true if the JSON scalar equals this backing value.
    pub fn matches_json(&self, json: &Json) -> bool {
        match (self, json) {
            (Backing::Int(n), Json::Number(m)) => m.as_i64() == Some(*n),
            (Backing::String(s), Json::String(t)) => s == t,
            _ => false,
        }
    }
}

/// An enumerant: enum name, case name and optional backing value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumValue {
    enum_name: String,
    case: String,
    backing: Option<Backing>,
}

impl EnumValue {
    /// Create an enumerant.
    pub fn new(enum_name: impl Into<String>, case: impl Into<String>, backing: Option<Backing>) -> Self {
        Self {
            enum_name: enum_name.into(),
            case: case.into(),
            backing,
        }
    }

    /// Name of the enum this value belongs to.
    pub fn enum_name(&self) -> &str {
        &self.enum_name
    }

    /// Declared case name.
    pub fn case(&self) -> &str {
        &self.case
    }

    /// Backing scalar, if the enum is backed.
    pub fn backing(&self) -> Option<&Backing> {
        self.backing.as_ref()
    }
}

// ---------------------------------------------------------------------------
// Conversions into Value
// ---------------------------------------------------------------------------

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Object> for Value {
    fn from(o: Object) -> Self {
        Value::Object(o)
    }
}

impl From<EnumValue> for Value {
    fn from(e: EnumValue) -> Self {
        Value::Enum(e)
    }
}
