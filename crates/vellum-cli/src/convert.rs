//! # Convert — resolve a payload and write it back out.
//!
//! Reads a JSON or YAML payload from a file (or stdin), resolves it into an
//! object of the target class, then writes the object under the same groups.
//! Fields outside the groups are dropped on both passes.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value as Json;

use crate::{load_engine, render, TargetArgs};

/// Convert subcommand arguments.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Payload file. Reads stdin when absent or `-`.
    pub input: Option<PathBuf>,

    /// Print on one line.
    #[arg(long)]
    pub compact: bool,
}

/// Parse a payload document: JSON first, YAML as fallback.
pub fn parse_payload(source: &str) -> Result<Json> {
    match serde_json::from_str(source) {
        Ok(json) => Ok(json),
        Err(json_err) => serde_yaml::from_str(source).with_context(|| {
            format!("payload is neither JSON ({json_err}) nor YAML")
        }),
    }
}

fn read_payload(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read payload: {}", path.display())),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read payload from stdin")?;
            Ok(buf)
        }
    }
}

/// Convert `payload` and render the result.
pub fn convert(args: &ConvertArgs, config: Option<&Path>, payload: &str) -> Result<String> {
    let engine = load_engine(&args.target.schema, config)?;
    let payload = parse_payload(payload)?;
    let ctx = engine
        .dynamic(args.target.class.as_str())
        .with_groups(args.target.group_set())
        .with_context(|| format!("invalid groups for {}", args.target.class))?;
    let out = ctx
        .convert(payload)
        .with_context(|| format!("failed to convert payload into {}", args.target.class))?;
    tracing::info!(class = %args.target.class, groups = %ctx.groups(), "converted payload");
    render(&out, args.compact)
}

/// Execute the convert subcommand.
pub fn run_convert(args: &ConvertArgs, config: Option<&Path>) -> Result<u8> {
    let payload = read_payload(args.input.as_deref())?;
    println!("{}", convert(args, config, &payload)?);
    Ok(0)
}
