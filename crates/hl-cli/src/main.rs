//! HL First Letters CLI
//!
//! Renders pages with the leading letters of each word in bold and manages
//! the allow/block lists that decide where that happens.

mod args;
mod commands;
mod logging;

use anyhow::Result;
use clap::Parser;
use tracing::error;

use args::Args;
use commands::Command;

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    let config = commands::load_config(args.config.as_deref())?;

    // Initialize logging
    logging::init(&args, &config.logging)?;

    let result = run(args, &config);

    if let Err(ref e) = result {
        error!("Fatal error: {:#}", e);
    }

    result
}

fn run(args: Args, config: &hl_core::Config) -> Result<()> {
    let store = args.store.as_deref();

    match args.command {
        Command::Render(render_args) => commands::render::execute(render_args, config, store),
        Command::Revert(revert_args) => commands::revert::execute(revert_args, config),
        Command::Session(session_args) => commands::session::execute(session_args, config, store),
        Command::Policy(policy_args) => commands::policy::execute(policy_args, config, store),
        Command::Config(config_args) => commands::config::execute(config_args, config),
        Command::Completions(comp_args) => commands::completions::execute(comp_args),
    }
}
