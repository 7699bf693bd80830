//! Revert command - undo a previous render

use anyhow::{Context, Result};
use clap::Args;
use hl_core::{Config, Document, Transformer};
use std::path::PathBuf;
use tracing::info;

/// Revert command arguments
#[derive(Args, Debug)]
pub struct RevertArgs {
    /// Rendered HTML file (`-` for stdin)
    pub input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Also remove the injected style element
    #[arg(long)]
    pub strip_style: bool,
}

/// Execute revert command
pub fn execute(args: RevertArgs, config: &Config) -> Result<()> {
    let source = super::read_input(&args.input)?;
    let mut doc = Document::parse_html(&source);
    let transformer = Transformer::new(config.transform.clone());

    let reverted = transformer
        .revert(&mut doc)
        .context("Failed to revert processed regions")?;

    if args.strip_style {
        if let Some(style) = doc.get_element_by_id(&config.transform.style_id) {
            doc.remove(style).context("Failed to remove style element")?;
        }
    }

    info!(reverted, "Reverted page");
    super::write_output(args.output.as_deref(), &doc.to_html())
}
