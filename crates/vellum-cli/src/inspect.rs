//! # Inspect — print the schema tree of a class.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use crate::{load_engine, render, TargetArgs};

/// Inspect subcommand arguments.
#[derive(Args, Debug)]
pub struct InspectArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Print on one line.
    #[arg(long)]
    pub compact: bool,
}

/// Build the tree and render its outline.
pub fn inspect(args: &InspectArgs, config: Option<&Path>) -> Result<String> {
    let engine = load_engine(&args.target.schema, config)?;
    let groups = args.target.group_set();
    let tree = engine
        .tree(&args.target.class, &groups)
        .with_context(|| format!("failed to build schema tree for {}", args.target.class))?;
    render(&tree.outline(), args.compact)
}

/// Execute the inspect subcommand.
pub fn run_inspect(args: &InspectArgs, config: Option<&Path>) -> Result<u8> {
    println!("{}", inspect(args, config)?);
    Ok(0)
}
