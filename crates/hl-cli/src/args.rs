//! Command-line argument parsing

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::commands::Command;

/// HL First Letters - bold the leading letters of every word
///
/// Renders allowlisted pages with the first letters of each word in bold,
/// keeps sensitive sites (banks by default) untouched, and manages the
/// allow/block lists.
#[derive(Parser, Debug)]
#[command(name = "hl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file path
    #[arg(short = 'c', long, global = true, value_name = "FILE", env = "HL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Policy store file (overrides the configured one)
    #[arg(short = 's', long, global = true, value_name = "FILE", env = "HL_STORE")]
    pub store: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output format for logs
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormat>,

    /// Log file path
    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<String>,

    /// Run in quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text
    Text,
    /// JSON format
    Json,
    /// Compact format
    Compact,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose() {
        let args = Args::parse_from(["hl", "-v", "config", "paths"]);
        assert_eq!(args.verbose, 1);

        let args = Args::parse_from(["hl", "config", "paths", "-vvv"]);
        assert_eq!(args.verbose, 3);
    }

    #[test]
    fn test_global_store() {
        let args = Args::parse_from(["hl", "policy", "list", "--store", "lists.json"]);
        assert_eq!(args.store, Some(PathBuf::from("lists.json")));
        assert!(args.log_format.is_none());
    }

    #[test]
    fn test_render_requires_host_or_url() {
        assert!(Args::try_parse_from(["hl", "render", "page.html"]).is_err());
        assert!(Args::try_parse_from(["hl", "render", "page.html", "--host", "a.com"]).is_ok());
        assert!(Args::try_parse_from(["hl", "render", "page.html", "--url", "https://a.com/"]).is_ok());
    }
}
