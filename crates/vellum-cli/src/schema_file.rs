//! # Schema Files
//!
//! YAML or JSON documents declaring the classes and enums of a registry.
//! They let the CLI build an [`Engine`] without any Rust types.
//!
//! ```yaml
//! enums:
//!   - name: Status
//!     cases: [ACTIVE, { name: CLOSED, value: 2 }]
//! classes:
//!   - name: Order
//!     default_groups: [public]
//!     output_mapper: camel
//!     fields:
//!       - { name: id, type: int, groups: [public, admin] }
//!       - { name: status, type: "enum:Status", default: ACTIVE }
//!       - { name: items, type: "LineItem[]", default: {} }
//!       - { name: note, types: [string, int], nullable: true }
//! ```
//!
//! Field types use the textual form of [`TypeDescriptor`]: `int`, `float`,
//! `string`, `bool`, `mixed`, `enum:Name`, `ClassName`, `ClassName[]` and
//! `scalar[]`.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::Value as Json;
use vellum_core::{Backing, MapperKind, TypeDescriptor, Value};
use vellum_serialize::{
    load_document, ClassDescriptor, Directive, EngineBuilder, EnumDescriptor, FieldDescriptor,
};

/// Top-level schema document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchemaFile {
    pub enums: Vec<EnumSpec>,
    pub classes: Vec<ClassSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnumSpec {
    pub name: String,
    pub cases: Vec<CaseSpec>,
}

/// A case given by name alone, or by name and backing value.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CaseSpec {
    Name(String),
    Backed { name: String, value: Json },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassSpec {
    pub name: String,
    #[serde(default)]
    pub default_groups: Vec<String>,
    #[serde(default)]
    pub input_mapper: Option<MapperKind>,
    #[serde(default)]
    pub output_mapper: Option<MapperKind>,
    #[serde(default)]
    pub constructor: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    pub name: String,
    #[serde(default, rename = "type")]
    pub ty: Option<TypeDescriptor>,
    #[serde(default)]
    pub types: Vec<TypeDescriptor>,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub readonly: bool,
    #[serde(default)]
    pub default: Option<Json>,
    #[serde(default)]
    pub input_name: Vec<String>,
    #[serde(default)]
    pub output_name: Option<String>,
    #[serde(default)]
    pub input_mapper: Option<MapperKind>,
    #[serde(default)]
    pub output_mapper: Option<MapperKind>,
    #[serde(default)]
    pub ignore_input: bool,
    #[serde(default)]
    pub ignore_output: bool,
}

impl SchemaFile {
    /// Load a `.json`, `.yaml` or `.yml` schema file.
    pub fn load(path: &Path) -> Result<Self> {
        let file: Self = load_document(path)
            .with_context(|| format!("failed to load schema file: {}", path.display()))?;
        tracing::debug!(
            path = %path.display(),
            classes = file.classes.len(),
            enums = file.enums.len(),
            "loaded schema file"
        );
        Ok(file)
    }

    pub fn from_yaml_str(source: &str) -> Result<Self> {
        serde_yaml::from_str(source).context("invalid schema document")
    }

    /// Convert every declaration into descriptors.
    pub fn descriptors(&self) -> Result<(Vec<ClassDescriptor>, Vec<EnumDescriptor>)> {
        let enums = self
            .enums
            .iter()
            .map(EnumSpec::descriptor)
            .collect::<Result<Vec<_>>>()?;
        let classes = self
            .classes
            .iter()
            .map(|c| c.descriptor(&enums))
            .collect::<Result<Vec<_>>>()?;
        Ok((classes, enums))
    }

    /// Register every declaration on `builder`.
    pub fn register(&self, mut builder: EngineBuilder) -> Result<EngineBuilder> {
        let (classes, enums) = self.descriptors()?;
        for descriptor in enums {
            builder = builder.enumeration(descriptor);
        }
        for descriptor in classes {
            builder = builder.class(descriptor);
        }
        Ok(builder)
    }
}

impl EnumSpec {
    fn descriptor(&self) -> Result<EnumDescriptor> {
        let mut descriptor = EnumDescriptor::new(&self.name);
        for case in &self.cases {
            descriptor = match case {
                CaseSpec::Name(name) => descriptor.case(name),
                CaseSpec::Backed { name, value } => {
                    descriptor.backed_case(name, backing(value).with_context(|| {
                        format!("enum {} case {name}", self.name)
                    })?)
                }
            };
        }
        Ok(descriptor)
    }
}

fn backing(value: &Json) -> Result<Backing> {
    match value {
        Json::Number(n) => match n.as_i64() {
            Some(i) => Ok(Backing::Int(i)),
            None => bail!("backing value {n} is not an integer"),
        },
        Json::String(s) => Ok(Backing::String(s.clone())),
        other => bail!("backing value must be an integer or a string, found {other}"),
    }
}

impl ClassSpec {
    fn descriptor(&self, enums: &[EnumDescriptor]) -> Result<ClassDescriptor> {
        let mut descriptor = ClassDescriptor::new(&self.name)
            .default_groups(self.default_groups.iter().cloned())
            .constructor(self.constructor.iter().cloned());
        if let Some(mapper) = self.input_mapper {
            descriptor = descriptor.directive(Directive::InputMapper(mapper));
        }
        if let Some(mapper) = self.output_mapper {
            descriptor = descriptor.directive(Directive::OutputMapper(mapper));
        }
        for field in &self.fields {
            let built = field
                .descriptor(enums)
                .with_context(|| format!("class {} field {}", self.name, field.name))?;
            descriptor = descriptor.field(built);
        }
        Ok(descriptor)
    }
}

impl FieldSpec {
    fn descriptor(&self, enums: &[EnumDescriptor]) -> Result<FieldDescriptor> {
        let types: Vec<TypeDescriptor> = self.ty.iter().chain(&self.types).cloned().collect();
        if types.is_empty() {
            bail!("no type declared");
        }

        let mut field = FieldDescriptor::new(&self.name, types.iter().cloned())
            .groups(self.groups.iter().cloned());
        if self.nullable {
            field = field.nullable();
        }
        if self.readonly {
            field = field.readonly();
        }
        if let Some(default) = &self.default {
            field = field.default_value(default_value(default, &types, enums));
        }
        for name in &self.input_name {
            field = field.input_name(name);
        }
        if let Some(name) = &self.output_name {
            field = field.output_name(name);
        }
        if let Some(mapper) = self.input_mapper {
            field = field.directive(Directive::InputMapper(mapper));
        }
        if let Some(mapper) = self.output_mapper {
            field = field.directive(Directive::OutputMapper(mapper));
        }
        if self.ignore_input {
            field = field.directive(Directive::InputIgnore);
        }
        if self.ignore_output {
            field = field.directive(Directive::OutputIgnore);
        }
        Ok(field)
    }
}

/// A default naming a case of one of the field's enums becomes that
/// enumerant; anything else is taken as raw data.
fn default_value(json: &Json, types: &[TypeDescriptor], enums: &[EnumDescriptor]) -> Value {
    let enumerant = types
        .iter()
        .filter_map(TypeDescriptor::enum_name)
        .filter_map(|name| enums.iter().find(|e| e.name() == name))
        .find_map(|e| e.find(json).map(|case| e.value_of(case)));
    match enumerant {
        Some(value) => Value::Enum(value),
        None => Value::from_json(json),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_core::EnumValue;

    const SCHEMA: &str = r#"
enums:
  - name: Status
    cases: [ACTIVE, { name: CLOSED, value: 2 }]
classes:
  - name: Order
    default_groups: [public]
    output_mapper: camel
    constructor: [order_id]
    fields:
      - { name: order_id, type: int, groups: [public, admin] }
      - { name: status, type: "enum:Status", default: CLOSED }
      - { name: items, type: "LineItem[]", default: {} }
      - { name: note, types: [string, int], nullable: true, input_name: [comment] }
      - { name: secret, type: string, ignore_output: true, default: "" }
  - name: LineItem
    fields:
      - { name: sku, type: string }
"#;

    #[test]
    fn test_parse_and_convert() {
        let file = SchemaFile::from_yaml_str(SCHEMA).unwrap();
        let (classes, enums) = file.descriptors().unwrap();
        assert_eq!(enums[0].cases().len(), 2);
        assert_eq!(enums[0].cases()[1].backing(), Some(&Backing::Int(2)));

        let order = &classes[0];
        assert_eq!(order.name(), "Order");
        assert_eq!(order.constructor_params(), ["order_id"]);
        assert_eq!(order.directives().len(), 1);

        let note = order.field_named("note").unwrap();
        assert_eq!(note.types(), [TypeDescriptor::string(), TypeDescriptor::int()]);
        assert!(note.is_nullable());

        let status = order.field_named("status").unwrap();
        assert_eq!(
            status.default(),
            Some(&Value::Enum(EnumValue::new(
                "Status",
                "CLOSED",
                Some(Backing::Int(2))
            )))
        );
    }

    #[test]
    fn test_field_without_type_rejected() {
        let file =
            SchemaFile::from_yaml_str("classes:\n  - name: A\n    fields:\n      - name: x\n")
                .unwrap();
        let err = file.descriptors().unwrap_err();
        assert!(format!("{err:#}").contains("class A field x"));
    }

    #[test]
    fn test_bad_type_rejected_at_parse() {
        assert!(SchemaFile::from_yaml_str(
            "classes:\n  - name: A\n    fields:\n      - { name: x, type: \"not a type\" }\n"
        )
        .is_err());
    }

    #[test]
    fn test_float_backing_rejected() {
        let file = SchemaFile::from_yaml_str(
            "enums:\n  - name: E\n    cases: [{ name: A, value: 1.5 }]\n",
        )
        .unwrap();
        assert!(file.descriptors().is_err());
    }
}
