//! Integration tests: subcommand handlers against schema files on disk.

use std::path::{Path, PathBuf};

use serde_json::{json, Value as Json};
use tempfile::TempDir;
use vellum_cli::convert::{convert, ConvertArgs};
use vellum_cli::inspect::{inspect, InspectArgs};
use vellum_cli::TargetArgs;

const SHOP: &str = r#"
enums:
  - name: Status
    cases:
      - { name: ACTIVE, value: 1 }
      - { name: CLOSED, value: 2 }
classes:
  - name: Order
    default_groups: [public]
    fields:
      - { name: order_id, type: int, groups: [public, admin] }
      - { name: status, type: "enum:Status", default: ACTIVE }
      - { name: items, type: "LineItem[]", default: {} }
      - { name: internal_ref, type: string, groups: [admin], nullable: true }
  - name: LineItem
    fields:
      - { name: sku, type: string }
      - { name: qty, type: int, default: 1 }
"#;

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn target(schema: &Path, groups: &[&str]) -> TargetArgs {
    TargetArgs {
        schema: schema.to_path_buf(),
        class: "Order".to_string(),
        groups: groups.iter().map(|g| g.to_string()).collect(),
    }
}

fn convert_args(schema: &Path, groups: &[&str]) -> ConvertArgs {
    ConvertArgs {
        target: target(schema, groups),
        input: None,
        compact: true,
    }
}

#[test]
fn test_inspect_prints_outline() {
    let dir = TempDir::new().unwrap();
    let schema = write(&dir, "shop.yaml", SHOP);
    let args = InspectArgs {
        target: target(&schema, &[]),
        compact: true,
    };
    let outline: Json = serde_json::from_str(&inspect(&args, None).unwrap()).unwrap();
    assert_eq!(outline["class"], json!("Order"));
    assert_eq!(outline["height"], json!(1));
    assert_eq!(outline["fields"]["internal_ref"]["excluded"], json!(true));
    assert_eq!(outline["fields"]["items"]["excluded"], json!(false));
}

#[test]
fn test_convert_default_groups() {
    let dir = TempDir::new().unwrap();
    let schema = write(&dir, "shop.yaml", SHOP);
    let out = convert(
        &convert_args(&schema, &[]),
        None,
        r#"{"order_id": 5, "status": 2, "items": {"a": {"sku": "A"}}, "internal_ref": "x"}"#,
    )
    .unwrap();
    let out: Json = serde_json::from_str(&out).unwrap();
    assert_eq!(
        out,
        json!({"order_id": 5, "status": "CLOSED", "items": {"a": {"sku": "A", "qty": 1}}})
    );
}

#[test]
fn test_convert_admin_groups_from_yaml_payload() {
    let dir = TempDir::new().unwrap();
    let schema = write(&dir, "shop.yaml", SHOP);
    let out = convert(
        &convert_args(&schema, &["admin"]),
        None,
        "order_id: 9\ninternal_ref: R-9\nstatus: CLOSED\n",
    )
    .unwrap();
    let out: Json = serde_json::from_str(&out).unwrap();
    assert_eq!(out, json!({"order_id": 9, "internal_ref": "R-9"}));
}

#[test]
fn test_config_file_applies_mappers() {
    let dir = TempDir::new().unwrap();
    let schema = write(&dir, "shop.yaml", SHOP);
    let config = write(&dir, "engine.json", r#"{"output_mapper": "camel"}"#);
    let out = convert(
        &convert_args(&schema, &[]),
        Some(&config),
        r#"{"order_id": 1}"#,
    )
    .unwrap();
    let out: Json = serde_json::from_str(&out).unwrap();
    assert_eq!(out["orderId"], json!(1));
    assert!(out.get("order_id").is_none());
}

#[test]
fn test_unknown_group_is_reported() {
    let dir = TempDir::new().unwrap();
    let schema = write(&dir, "shop.yaml", SHOP);
    let err = convert(&convert_args(&schema, &["ops"]), None, "{}").unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("invalid groups for Order"));
    assert!(message.contains("ops"));
}

#[test]
fn test_missing_field_is_reported() {
    let dir = TempDir::new().unwrap();
    let schema = write(&dir, "shop.json", &json_schema());
    let err = convert(&convert_args(&schema, &[]), None, r#"{"status": 1}"#).unwrap_err();
    assert!(format!("{err:#}").contains("order_id"));
}

#[test]
fn test_missing_schema_file() {
    let dir = TempDir::new().unwrap();
    let args = InspectArgs {
        target: target(&dir.path().join("absent.yaml"), &[]),
        compact: false,
    };
    let err = inspect(&args, None).unwrap_err();
    assert!(format!("{err:#}").contains("failed to load schema file"));
}

/// The YAML schema re-encoded as JSON.
fn json_schema() -> String {
    let value: Json = serde_yaml::from_str(SHOP).unwrap();
    serde_json::to_string(&value).unwrap()
}
