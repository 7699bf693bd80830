//! Configuration command

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use directories::ProjectDirs;
use hl_core::Config;
use std::path::PathBuf;
use tracing::info;

/// Config command arguments
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show {
        /// Configuration file to show
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Generate a configuration file with default values
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "hl.toml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Configuration file to validate
        file: PathBuf,
    },

    /// Show configuration and store paths
    Paths,
}

/// Execute config command
pub fn execute(args: ConfigArgs, config: &Config) -> Result<()> {
    match args.command {
        ConfigCommands::Show { file } => show_config(file, config),
        ConfigCommands::Generate { output, force } => generate_config(output, force),
        ConfigCommands::Validate { file } => validate_config(file),
        ConfigCommands::Paths => show_paths(config),
    }
}

/// Per-user application directories
pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "hl-first-letters")
}

/// First existing config file among the search paths
pub fn find_config_file() -> Option<PathBuf> {
    let candidates = [PathBuf::from("hl.toml"), PathBuf::from("config.toml")];

    for path in candidates {
        if path.exists() {
            return Some(path);
        }
    }

    // Check user config directory
    if let Some(dirs) = project_dirs() {
        let path = dirs.config_dir().join("config.toml");
        if path.exists() {
            return Some(path);
        }
    }

    None
}

fn show_config(file: Option<PathBuf>, loaded: &Config) -> Result<()> {
    let config = match file {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => loaded.clone(),
    };

    let toml_str = config.to_toml().context("Failed to serialize config")?;
    println!("{}", toml_str);
    Ok(())
}

fn generate_config(output: PathBuf, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            output.display()
        );
    }

    let toml_str = Config::default()
        .to_toml()
        .context("Failed to serialize config")?;

    let content = format!(
        "# HL First Letters Configuration\n\
         # Every key is optional; missing keys take the values below\n\n\
         {}",
        toml_str
    );

    std::fs::write(&output, content)
        .with_context(|| format!("Failed to write config to {}", output.display()))?;

    info!("Generated config file: {}", output.display());
    println!("Configuration file generated: {}", output.display());

    Ok(())
}

fn validate_config(file: PathBuf) -> Result<()> {
    let config = Config::load(&file)
        .with_context(|| format!("Failed to load config from {}", file.display()))?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("✓ Configuration is valid");
    println!("  Debounce: {} ms", config.pipeline.debounce_ms);
    println!("  Minimum interval: {} ms", config.pipeline.min_interval_ms);
    println!("  Enable on load: {}", config.pipeline.enable_on_load);
    println!(
        "  Default lists: {} allowed, {} blocked",
        config.policy.default_allowlist.len(),
        config.policy.default_blocklist.len()
    );

    Ok(())
}

fn show_paths(config: &Config) -> Result<()> {
    println!("Configuration file search paths:");
    println!();
    println!("  1. ./hl.toml");
    println!("  2. ./config.toml");
    if let Some(dirs) = project_dirs() {
        println!("  3. {}/config.toml", dirs.config_dir().display());
    }

    println!();
    println!("Policy store:");
    println!();
    println!("  {}", super::store_path(None, config).display());

    Ok(())
}
