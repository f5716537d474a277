//! Integration tests: payload and output key naming.

use serde_json::json;
use vellum_serialize::{
    ClassDescriptor, Directive, Engine, EngineConfig, FieldDescriptor, MapperKind, TypeDescriptor,
};

fn profile() -> ClassDescriptor {
    ClassDescriptor::new("Profile")
        .field(FieldDescriptor::of("home_page", TypeDescriptor::string()))
        .field(
            FieldDescriptor::of("display_name", TypeDescriptor::string())
                .directive(Directive::OutputMapper(MapperKind::Pascal)),
        )
        .field(
            FieldDescriptor::of("e_mail", TypeDescriptor::string())
                .input_name("mail")
                .output_name("email"),
        )
}

#[test]
fn test_configured_mappers() {
    let config = EngineConfig::from_yaml_str("input_mapper: snake\noutput_mapper: camel\n").unwrap();
    let engine = Engine::builder().class(profile()).config(config).build();

    let out = engine
        .dynamic("Profile")
        .convert(json!({"home_page": "h", "display_name": "Ada", "mail": "a@b.c"}))
        .unwrap();
    assert_eq!(
        out,
        json!({"homePage": "h", "DisplayName": "Ada", "email": "a@b.c"})
    );
}

#[test]
fn test_input_accepts_mapped_and_raw_names() {
    let config = EngineConfig {
        input_mapper: Some(MapperKind::Camel),
        ..EngineConfig::default()
    };
    let engine = Engine::builder().class(profile()).config(config).build();
    let ctx = engine.dynamic("Profile");

    let camel = ctx
        .convert(json!({"homePage": "h", "displayName": "Ada", "e_mail": "x"}))
        .unwrap();
    let raw = ctx
        .convert(json!({"home_page": "h", "display_name": "Ada", "eMail": "x"}))
        .unwrap();
    assert_eq!(camel, raw);
    assert_eq!(camel["home_page"], json!("h"));
}

#[test]
fn test_explicit_input_name_wins_over_raw_name() {
    let engine = Engine::builder().class(profile()).build();
    let object = engine
        .dynamic("Profile")
        .from(json!({"home_page": "h", "display_name": "Ada", "mail": "first", "e_mail": "second"}))
        .unwrap();
    assert_eq!(object.get("e_mail").and_then(|v| v.as_str()), Some("first"));
}
