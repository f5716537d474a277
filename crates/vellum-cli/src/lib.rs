//! # vellum-cli — Command-Line Interface for vellum
//!
//! Loads class and enum declarations from a schema file and drives the
//! engine without any Rust types.
//!
//! ## Subcommands
//!
//! - `vellum inspect`: Print the schema tree built for a class and groups.
//! - `vellum convert`: Resolve a payload and write it back out under the
//!   chosen groups.
//!
//! ```bash
//! vellum inspect --schema shop.yaml --class Order --groups admin
//! vellum convert --schema shop.yaml --class Order payload.json
//! cat payload.json | vellum -v convert --schema shop.yaml --class Order
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; handlers here return their output
//!   so tests can call them directly.
//! - Handler functions delegate to `vellum-serialize`; no conversion logic
//!   here.

pub mod convert;
pub mod inspect;
pub mod schema_file;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use vellum_core::GroupSet;
use vellum_serialize::{Engine, EngineConfig};

use crate::schema_file::SchemaFile;

/// Arguments shared by every subcommand that targets one class.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Schema file declaring classes and enums (YAML or JSON).
    #[arg(long, short)]
    pub schema: PathBuf,

    /// Class to build.
    #[arg(long, short)]
    pub class: String,

    /// Groups to request, comma separated. Empty means the class defaults.
    #[arg(long, short, value_delimiter = ',')]
    pub groups: Vec<String>,
}

impl TargetArgs {
    pub fn group_set(&self) -> GroupSet {
        self.groups
            .iter()
            .map(|g| g.trim())
            .filter(|g| !g.is_empty())
            .collect()
    }
}

/// Build an engine from a schema file and an optional engine config file.
pub fn load_engine(schema: &Path, config: Option<&Path>) -> Result<Engine> {
    let config = match config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load config: {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let file = SchemaFile::load(schema)?;
    let builder = file.register(Engine::builder().config(config))?;
    Ok(builder.build())
}

/// Render JSON for the terminal.
pub fn render(json: &serde_json::Value, compact: bool) -> Result<String> {
    let text = if compact {
        serde_json::to_string(json)
    } else {
        serde_json::to_string_pretty(json)
    };
    text.context("failed to render JSON")
}
