//! # Class and Enum Descriptors
//!
//! Descriptors are the declared shape of a type: the information the schema
//! builder needs to produce a [`SchemaTree`](crate::SchemaTree). They are
//! plain data, built with a small fluent API and registered once in a
//! [`TypeRegistry`](crate::TypeRegistry).
//!
//! Typed Rust structs describe themselves through [`Serializable`]; typed
//! enums through [`Enumerated`]. Registry-only classes (for example those
//! loaded from a schema file) use the descriptors directly and resolve to
//! dynamic [`Object`]s.
//!
//! ## Directives
//!
//! A [`Directive`] adjusts how one field (or, when attached to the class,
//! every field) is read or written: alternative input names, an output name,
//! naming-convention mappers, dedicated casts and ignore flags. Class-level
//! directives are applied before field-level ones, so a field directive that
//! selects a single outcome (output name, mapper) overrides the class one.

use std::fmt;
use std::sync::Arc;

use serde_json::Value as Json;
use vellum_core::{
    Backing, ConversionError, EnumValue, GroupSet, MapperKind, Object, TypeDescriptor, Value,
};

use crate::cast::{InputCast, OutputCast};
use crate::registry::TypeRegistry;

// ---------------------------------------------------------------------------
// Directives
// ---------------------------------------------------------------------------

/// Per-field (or per-class) resolution directive.
#[derive(Clone)]
pub enum Directive {
    /// Additional payload key accepted for the field. Tried before the
    /// mapped and raw field names, in declaration order.
    InputName(String),
    /// Key the field is written under.
    OutputName(String),
    /// Naming convention applied to the field name when reading.
    InputMapper(MapperKind),
    /// Naming convention applied to the field name when writing.
    OutputMapper(MapperKind),
    /// Cast tried before the engine's input chain.
    InputCast(Arc<dyn InputCast>),
    /// Cast tried before the engine's output chain.
    OutputCast(Arc<dyn OutputCast>),
    /// Never read the field from a payload.
    InputIgnore,
    /// Never write the field to output.
    OutputIgnore,
}

impl fmt::Debug for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::InputName(n) => f.debug_tuple("InputName").field(n).finish(),
            Directive::OutputName(n) => f.debug_tuple("OutputName").field(n).finish(),
            Directive::InputMapper(m) => f.debug_tuple("InputMapper").field(m).finish(),
            Directive::OutputMapper(m) => f.debug_tuple("OutputMapper").field(m).finish(),
            Directive::InputCast(c) => f.debug_tuple("InputCast").field(&c.name()).finish(),
            Directive::OutputCast(c) => f.debug_tuple("OutputCast").field(&c.name()).finish(),
            Directive::InputIgnore => f.write_str("InputIgnore"),
            Directive::OutputIgnore => f.write_str("OutputIgnore"),
        }
    }
}

// ---------------------------------------------------------------------------
// FieldDescriptor
// ---------------------------------------------------------------------------

/// Declared shape of one field.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    name: String,
    types: Vec<TypeDescriptor>,
    groups: GroupSet,
    nullable: bool,
    readonly: bool,
    default: Option<Value>,
    directives: Vec<Directive>,
}

impl FieldDescriptor {
    /// A field with the given candidate types, in resolution order.
    pub fn new(name: impl Into<String>, types: impl IntoIterator<Item = TypeDescriptor>) -> Self {
        Self {
            name: name.into(),
            types: types.into_iter().collect(),
            groups: GroupSet::new(),
            nullable: false,
            readonly: false,
            default: None,
            directives: Vec::new(),
        }
    }

    /// A field with a single candidate type.
    pub fn of(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self::new(name, [ty])
    }

    /// Declare the groups the field belongs to.
    pub fn groups<S: Into<String>>(mut self, groups: impl IntoIterator<Item = S>) -> Self {
        self.groups = groups.into_iter().collect();
        self
    }

    /// Accept `null` and use it when the payload carries no value.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Mark the field readonly.
    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    /// Value used when the payload carries none.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Attach a directive.
    pub fn directive(mut self, directive: Directive) -> Self {
        self.directives.push(directive);
        self
    }

    /// Shorthand for [`Directive::InputName`].
    pub fn input_name(self, name: impl Into<String>) -> Self {
        self.directive(Directive::InputName(name.into()))
    }

    /// Shorthand for [`Directive::OutputName`].
    pub fn output_name(self, name: impl Into<String>) -> Self {
        self.directive(Directive::OutputName(name.into()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn types(&self) -> &[TypeDescriptor] {
        &self.types
    }

    /// Groups declared on the field itself. Empty means "inherit the class
    /// default groups".
    pub fn declared_groups(&self) -> &GroupSet {
        &self.groups
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }
}

// ---------------------------------------------------------------------------
// ClassDescriptor
// ---------------------------------------------------------------------------

/// Declared shape of a structured type.
#[derive(Debug, Clone)]
pub struct ClassDescriptor {
    name: String,
    default_groups: GroupSet,
    directives: Vec<Directive>,
    fields: Vec<FieldDescriptor>,
    constructor: Vec<String>,
}

impl ClassDescriptor {
    /// An empty class.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_groups: GroupSet::new(),
            directives: Vec::new(),
            fields: Vec::new(),
            constructor: Vec::new(),
        }
    }

    /// Groups inherited by every field that declares none.
    pub fn default_groups<S: Into<String>>(mut self, groups: impl IntoIterator<Item = S>) -> Self {
        self.default_groups = groups.into_iter().collect();
        self
    }

    /// Attach a class-level directive, applied to every field.
    pub fn directive(mut self, directive: Directive) -> Self {
        self.directives.push(directive);
        self
    }

    /// Append a field. Declaration order is output order.
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Positional constructor parameters, by field name.
    pub fn constructor<S: Into<String>>(mut self, params: impl IntoIterator<Item = S>) -> Self {
        self.constructor = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Default groups as declared. Empty means "use the resolver's default
    /// group".
    pub fn declared_default_groups(&self) -> &GroupSet {
        &self.default_groups
    }

    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Look up a field by name.
    pub fn field_named(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn constructor_params(&self) -> &[String] {
        &self.constructor
    }
}

// ---------------------------------------------------------------------------
// EnumDescriptor
// ---------------------------------------------------------------------------

/// One case of an enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumCase {
    name: String,
    backing: Option<Backing>,
}

impl EnumCase {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn backing(&self) -> Option<&Backing> {
        self.backing.as_ref()
    }
}

/// Declared cases of an enum, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDescriptor {
    name: String,
    cases: Vec<EnumCase>,
}

impl EnumDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cases: Vec::new(),
        }
    }

    /// Append a pure case.
    pub fn case(mut self, name: impl Into<String>) -> Self {
        self.cases.push(EnumCase {
            name: name.into(),
            backing: None,
        });
        self
    }

    /// Append a case with a backing value.
    pub fn backed_case(mut self, name: impl Into<String>, backing: Backing) -> Self {
        self.cases.push(EnumCase {
            name: name.into(),
            backing: Some(backing),
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cases(&self) -> &[EnumCase] {
        &self.cases
    }

    /// Find the case a payload scalar designates: first by case name, then
    /// by backing value.
    pub fn find(&self, json: &Json) -> Option<&EnumCase> {
        if let Json::String(s) = json {
            if let Some(case) = self.cases.iter().find(|c| &c.name == s) {
                return Some(case);
            }
        }
        self.cases
            .iter()
            .find(|c| c.backing.as_ref().is_some_and(|b| b.matches_json(json)))
    }

    /// The enumerant for `case`.
    pub fn value_of(&self, case: &EnumCase) -> EnumValue {
        EnumValue::new(self.name.clone(), case.name.clone(), case.backing.clone())
    }
}

// ---------------------------------------------------------------------------
// Typed bindings
// ---------------------------------------------------------------------------

/// A Rust struct with a declared schema.
///
/// Implementations pair a [`ClassDescriptor`] with the conversions between
/// the struct and its dynamic [`Object`]. Use [`impl_object_value!`] to make
/// the struct usable as a field type of another `Serializable`.
///
/// [`impl_object_value!`]: crate::impl_object_value
pub trait Serializable: Sized + 'static {
    /// Class name. Must equal `describe().name()`.
    const CLASS: &'static str;

    /// Declared shape of the struct.
    fn describe() -> ClassDescriptor;

    /// Register the classes and enums this struct's fields reference.
    fn register_dependencies(_registry: &mut TypeRegistry) {}

    /// Build the struct from a resolved object.
    fn from_object(object: Object) -> Result<Self, ConversionError>;

    /// Dynamic view of the struct for output resolution.
    fn to_object(&self) -> Object;
}

/// A Rust enum with declared cases.
pub trait Enumerated: Sized + 'static {
    /// Enum name. Must equal `describe().name()`.
    const ENUM: &'static str;

    fn describe() -> EnumDescriptor;

    /// Case name of `self`.
    fn case_name(&self) -> &'static str;

    /// Backing value of `self`, for backed enums.
    fn backing(&self) -> Option<Backing> {
        None
    }

    /// The variant named `case`.
    fn from_case(case: &str) -> Option<Self>;

    fn to_enum_value(&self) -> EnumValue {
        EnumValue::new(Self::ENUM, self.case_name(), self.backing())
    }
}

/// Implement [`FromValue`](vellum_core::FromValue) and
/// [`ToValue`](vellum_core::ToValue) for [`Serializable`] structs, so they
/// can appear as field types (directly, in `Option`, `Vec` or maps).
#[macro_export]
macro_rules! impl_object_value {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::FromValue for $ty {
            fn from_value(value: $crate::Value) -> Result<Self, $crate::ConversionError> {
                let object = <$crate::Object as $crate::FromValue>::from_value(value)?;
                let expected = <$ty as $crate::Serializable>::CLASS;
                if object.class() != expected {
                    return Err($crate::ConversionError::ClassMismatch {
                        expected: expected.to_string(),
                        found: object.class().to_string(),
                    });
                }
                <$ty as $crate::Serializable>::from_object(object)
            }
        }

        impl $crate::ToValue for $ty {
            fn to_value(&self) -> $crate::Value {
                $crate::Value::Object(<$ty as $crate::Serializable>::to_object(self))
            }
        }
    )+};
}

/// Implement [`FromValue`](vellum_core::FromValue) and
/// [`ToValue`](vellum_core::ToValue) for [`Enumerated`] enums.
#[macro_export]
macro_rules! impl_enum_value {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::FromValue for $ty {
            fn from_value(value: $crate::Value) -> Result<Self, $crate::ConversionError> {
                let expected = <$ty as $crate::Enumerated>::ENUM;
                match value {
                    $crate::Value::Enum(e) if e.enum_name() == expected => {
                        <$ty as $crate::Enumerated>::from_case(e.case()).ok_or_else(|| {
                            $crate::ConversionError::UnknownCase {
                                enum_name: expected.to_string(),
                                case: e.case().to_string(),
                            }
                        })
                    }
                    other => Err($crate::ConversionError::TypeMismatch {
                        expected: "enum",
                        found: other.kind_name(),
                    }),
                }
            }
        }

        impl $crate::ToValue for $ty {
            fn to_value(&self) -> $crate::Value {
                $crate::Value::Enum(<$ty as $crate::Enumerated>::to_enum_value(self))
            }
        }
    )+};
}
