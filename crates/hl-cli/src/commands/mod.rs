//! CLI commands

pub mod completions;
pub mod config;
pub mod policy;
pub mod render;
pub mod revert;
pub mod session;

use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Subcommand};
use hl_core::policy::{host, host_from_url};
use hl_core::Config;
use hl_platform::JsonFileStore;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a page with word heads in bold
    Render(render::RenderArgs),

    /// Turn processed regions in a saved page back into plain text
    Revert(revert::RevertArgs),

    /// Drive a live page from JSON-lines messages on stdin
    Session(session::SessionArgs),

    /// Allowlist / blocklist management
    Policy(policy::PolicyArgs),

    /// Configuration management
    Config(config::ConfigArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Which page a command works on
#[derive(ClapArgs, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct PageHost {
    /// Hostname the page was served from
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// URL the page was served from
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,
}

impl PageHost {
    /// Normalized hostname
    pub fn resolve(&self) -> Result<String> {
        match (&self.host, &self.url) {
            (Some(host), _) => Ok(host::normalize_host(host)),
            (None, Some(url)) => {
                host_from_url(url).with_context(|| format!("No hostname in URL: {}", url))
            }
            (None, None) => bail!("Either --host or --url is required"),
        }
    }
}

/// Load the configuration from an explicit path or the search paths
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let config = match explicit {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => match config::find_config_file() {
            Some(path) => {
                debug!(path = %path.display(), "Using config file");
                Config::load(&path)
                    .with_context(|| format!("Failed to load config from {}", path.display()))?
            }
            None => Config::default(),
        },
    };
    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

/// Policy store location: flag, then config, then the user data dir
pub fn store_path(explicit: Option<&Path>, config: &Config) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Some(ref path) = config.policy.store_path {
        return PathBuf::from(path);
    }
    match config::project_dirs() {
        Some(dirs) => dirs.data_dir().join("lists.json"),
        None => PathBuf::from("hl-lists.json"),
    }
}

/// Open the JSON policy store
pub fn open_store(explicit: Option<&Path>, config: &Config) -> Result<JsonFileStore> {
    let path = store_path(explicit, config);
    JsonFileStore::open(&path, config.policy.default_snapshot())
        .with_context(|| format!("Failed to open policy store {}", path.display()))
}

/// Read a whole input file (`-` reads stdin)
pub fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Write output to a file, or stdout when no path is given
pub fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}
