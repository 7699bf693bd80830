//! Render command - one-shot transformation of a saved page

use anyhow::Result;
use clap::Args;
use hl_core::{Config, Document, Permission, Pipeline, PolicyStore};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::PageHost;

/// Render command arguments
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// HTML file to render (`-` for stdin)
    pub input: PathBuf,

    #[command(flatten)]
    pub page: PageHost,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Execute render command
pub fn execute(args: RenderArgs, config: &Config, store: Option<&Path>) -> Result<()> {
    let host = args.page.resolve()?;
    let source = super::read_input(&args.input)?;
    let policy = super::open_store(store, config)?.load()?;

    let mut pipeline = Pipeline::new(Document::parse_html(&source), &host, policy, config);
    if pipeline.enable(0) {
        let stats = pipeline.stats();
        info!(
            host = %host,
            leaves = stats.leaves_transformed,
            "Rendered page"
        );
    } else {
        match pipeline.permission() {
            Permission::Blocked => warn!(host = %host, "Host is blocklisted; page left unchanged"),
            _ => warn!(host = %host, "Host is not allowlisted; page left unchanged"),
        }
    }

    super::write_output(args.output.as_deref(), &pipeline.document().to_html())
}
