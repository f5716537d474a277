//! Shared fixtures: a small order domain with typed structs, and helpers
//! for registry-only classes.

#![allow(dead_code)]

use indexmap::IndexMap;
use vellum_serialize::{
    impl_enum_value, impl_object_value, Backing, ClassDescriptor, ConversionError, EnumDescriptor,
    Enumerated, FieldDescriptor, Object, Serializable, TypeDescriptor, TypeRegistry, Value,
};

#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub sku: String,
    pub qty: i64,
    pub price: f64,
}

impl Serializable for LineItem {
    const CLASS: &'static str = "LineItem";

    fn describe() -> ClassDescriptor {
        ClassDescriptor::new("LineItem")
            .default_groups(["public"])
            .field(FieldDescriptor::of("sku", TypeDescriptor::string()))
            .field(FieldDescriptor::of("qty", TypeDescriptor::int()).default_value(1i64))
            .field(FieldDescriptor::of("price", TypeDescriptor::float()).groups(["public", "admin"]))
    }

    fn from_object(mut object: Object) -> Result<Self, ConversionError> {
        Ok(Self {
            sku: object.take("sku")?,
            qty: object.take("qty")?,
            price: object.take("price")?,
        })
    }

    fn to_object(&self) -> Object {
        Object::new(Self::CLASS)
            .with("sku", self.sku.clone())
            .with("qty", self.qty)
            .with("price", self.price)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Active,
    Closed,
}

impl Enumerated for Status {
    const ENUM: &'static str = "Status";

    fn describe() -> EnumDescriptor {
        EnumDescriptor::new("Status")
            .backed_case("ACTIVE", Backing::Int(1))
            .backed_case("CLOSED", Backing::Int(2))
    }

    fn case_name(&self) -> &'static str {
        match self {
            Status::Active => "ACTIVE",
            Status::Closed => "CLOSED",
        }
    }

    fn backing(&self) -> Option<Backing> {
        match self {
            Status::Active => Some(Backing::Int(1)),
            Status::Closed => Some(Backing::Int(2)),
        }
    }

    fn from_case(case: &str) -> Option<Self> {
        match case {
            "ACTIVE" => Some(Status::Active),
            "CLOSED" => Some(Status::Closed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: i64,
    pub status: Status,
    pub items: IndexMap<String, LineItem>,
    pub note: Option<String>,
    pub internal_ref: Option<String>,
}

impl Serializable for Order {
    const CLASS: &'static str = "Order";

    fn describe() -> ClassDescriptor {
        ClassDescriptor::new("Order")
            .default_groups(["public"])
            .field(FieldDescriptor::of("id", TypeDescriptor::int()).groups(["public", "admin"]))
            .field(
                FieldDescriptor::of("status", TypeDescriptor::enumeration("Status"))
                    .default_value(Status::Active.to_enum_value()),
            )
            .field(
                FieldDescriptor::of("items", TypeDescriptor::collect_object("LineItem"))
                    .default_value(Value::Map(IndexMap::new())),
            )
            .field(FieldDescriptor::of("note", TypeDescriptor::string()).nullable())
            .field(
                FieldDescriptor::of("internal_ref", TypeDescriptor::string())
                    .groups(["admin"])
                    .nullable(),
            )
            .constructor(["id", "status", "items"])
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<LineItem>().register_enum::<Status>();
    }

    fn from_object(mut object: Object) -> Result<Self, ConversionError> {
        Ok(Self {
            id: object.take("id")?,
            status: object.take("status")?,
            items: object.take("items")?,
            note: object.take("note")?,
            internal_ref: object.take("internal_ref")?,
        })
    }

    fn to_object(&self) -> Object {
        use vellum_serialize::ToValue;
        Object::new(Self::CLASS)
            .with("id", self.id)
            .with("status", self.status.to_value())
            .with("items", self.items.to_value())
            .with("note", self.note.to_value())
            .with("internal_ref", self.internal_ref.to_value())
    }
}

impl_object_value!(LineItem);
impl_enum_value!(Status);

pub fn item(sku: &str, qty: i64, price: f64) -> LineItem {
    LineItem {
        sku: sku.to_string(),
        qty,
        price,
    }
}

/// Registry-only chain `L0 → L1 → … → Ln`; the class at level `i` sits at
/// nesting depth `i` when `L0` is built.
pub fn chain(levels: usize) -> Vec<ClassDescriptor> {
    (0..=levels)
        .map(|i| {
            let class = ClassDescriptor::new(format!("L{i}"))
                .field(FieldDescriptor::of("level", TypeDescriptor::int()).default_value(i as i64));
            if i < levels {
                class.field(
                    FieldDescriptor::of("next", TypeDescriptor::object(format!("L{}", i + 1)))
                        .nullable(),
                )
            } else {
                class
            }
        })
        .collect()
}
