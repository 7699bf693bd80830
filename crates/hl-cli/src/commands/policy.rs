//! Policy list management commands
//!
//! Every edit goes through the same reconciliation as the options page: newly
//! blocked sites leave the allowlist, and moving a blocked site to the
//! allowlist needs confirmation.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use hl_core::policy::{host, host_from_url, Resolution, SaveOutcome};
use hl_core::{Config, Permission, PolicyEditor, PolicyList, PolicyStore};
use hl_platform::JsonFileStore;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Policy management arguments
#[derive(Args, Debug)]
pub struct PolicyArgs {
    #[command(subcommand)]
    pub command: PolicyCommands,
}

/// Policy subcommands
#[derive(Subcommand, Debug)]
pub enum PolicyCommands {
    /// Show both lists
    List {
        /// Print the lists as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a site to the allowlist
    Allow {
        /// Hostname or URL
        site: String,

        /// Move the site off the blocklist without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Add a site to the blocklist
    Block {
        /// Hostname or URL
        site: String,
    },

    /// Remove a site from both lists
    Remove {
        /// Hostname or URL
        site: String,
    },

    /// Show whether a site would be transformed
    Check {
        /// Hostname or URL
        site: String,
    },

    /// Replace both lists from text files (one domain per line)
    Edit {
        /// Allowlist file
        #[arg(long, value_name = "FILE")]
        allow_file: PathBuf,

        /// Blocklist file
        #[arg(long, value_name = "FILE")]
        block_file: PathBuf,

        /// Confirm every move to the allowlist without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Write both lists to text files
    Export {
        /// Allowlist file
        #[arg(long, value_name = "FILE")]
        allow_file: PathBuf,

        /// Blocklist file
        #[arg(long, value_name = "FILE")]
        block_file: PathBuf,
    },
}

/// Execute policy command
pub fn execute(args: PolicyArgs, config: &Config, store: Option<&Path>) -> Result<()> {
    let store = super::open_store(store, config)?;

    match args.command {
        PolicyCommands::List { json } => list_policy(&store, json),
        PolicyCommands::Allow { site, yes } => allow_site(store, &site, yes),
        PolicyCommands::Block { site } => block_site(store, &site),
        PolicyCommands::Remove { site } => remove_site(store, &site),
        PolicyCommands::Check { site } => check_site(&store, &site),
        PolicyCommands::Edit {
            allow_file,
            block_file,
            yes,
        } => edit_lists(store, &allow_file, &block_file, yes),
        PolicyCommands::Export {
            allow_file,
            block_file,
        } => export_lists(&store, &allow_file, &block_file),
    }
}

/// Accept either a bare hostname or a full URL
fn site_host(site: &str) -> String {
    if site.contains("://") {
        if let Some(host) = host_from_url(site) {
            return host;
        }
    }
    host::normalize_host(site)
}

/// Ask on the terminal whether a blocked site should move to the allowlist
fn confirm_move(site: &str, assume_yes: bool) -> bool {
    if assume_yes {
        return true;
    }
    if !atty::is(atty::Stream::Stdin) {
        warn!(site, "Not a terminal; keeping site on the blocklist");
        return false;
    }

    print!(
        "{} {} is on the blocklist. Move it to the allowlist? [y/N] ",
        "?".yellow(),
        site.cyan()
    );
    let _ = std::io::stdout().flush();

    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn list_policy(store: &JsonFileStore, json: bool) -> Result<()> {
    let snapshot = store.load()?;

    if json {
        let out = serde_json::to_string_pretty(&snapshot).context("Failed to serialize lists")?;
        println!("{}", out);
        return Ok(());
    }

    println!("{}", "═".repeat(50).bright_blue());
    println!("{}", " Policy Lists".bright_white().bold());
    println!("{}", "═".repeat(50).bright_blue());
    println!("Store: {}", store.path().display().to_string().cyan());

    print_list("Allowlist", &snapshot.allowlist, "●".green().to_string());
    print_list("Blocklist", &snapshot.blocklist, "●".red().to_string());

    if let Some(notice) = store.notice()? {
        println!("{}", "─".repeat(50).bright_black());
        println!("{} {}", "!".yellow(), notice.message);
    }
    println!("{}", "═".repeat(50).bright_blue());

    Ok(())
}

fn print_list(title: &str, list: &PolicyList, bullet: String) {
    println!("{}", "─".repeat(50).bright_black());
    println!("{} ({})", title.bold(), list.len().to_string().green());
    if list.is_empty() {
        println!("{}", "  (empty)".dimmed());
    }
    for entry in list.iter() {
        println!("  {} {}", bullet, entry);
    }
}

fn allow_site(store: JsonFileStore, site: &str, yes: bool) -> Result<()> {
    let site = site_host(site);
    let mut editor = PolicyEditor::open(store)?;
    let outcome = editor.allow_site(&site, |entry| confirm_move(entry, yes))?;

    if outcome.snapshot.allowlist.contains(&site) {
        println!("{} Added {} to the allowlist", "✓".green(), site.cyan());
    } else {
        println!("{} {} stays on the blocklist", "✗".red(), site.cyan());
    }
    print_outcome(&outcome);
    Ok(())
}

fn block_site(store: JsonFileStore, site: &str) -> Result<()> {
    let site = site_host(site);
    let mut editor = PolicyEditor::open(store)?;
    let outcome = editor.block_site(&site)?;

    println!("{} Added {} to the blocklist", "✓".green(), site.cyan());
    print_outcome(&outcome);
    Ok(())
}

fn remove_site(store: JsonFileStore, site: &str) -> Result<()> {
    let site = site_host(site);
    let mut editor = PolicyEditor::open(store)?;
    let listed = editor.current().allowlist.contains(&site) || editor.current().blocklist.contains(&site);
    if !listed {
        println!("{} {} is not on either list", "✗".red(), site.cyan());
        return Ok(());
    }

    editor.remove_site(&site)?;
    println!("{} Removed {}", "✓".green(), site.cyan());
    Ok(())
}

fn check_site(store: &JsonFileStore, site: &str) -> Result<()> {
    let site = site_host(site);
    let snapshot = store.load()?;

    match snapshot.evaluate(&site) {
        Permission::Allowed => println!("{} {} is allowed", "●".green(), site.cyan()),
        Permission::Blocked => println!("{} {} is blocked", "●".red(), site.cyan()),
        Permission::NotAllowlisted => {
            println!("{} {} is not on the allowlist", "○".yellow(), site.cyan())
        }
    }
    Ok(())
}

fn edit_lists(store: JsonFileStore, allow_file: &Path, block_file: &Path, yes: bool) -> Result<()> {
    let allowlist = PolicyList::load_file(allow_file)
        .with_context(|| format!("Failed to read {}", allow_file.display()))?;
    let blocklist = PolicyList::load_file(block_file)
        .with_context(|| format!("Failed to read {}", block_file.display()))?;

    let mut editor = PolicyEditor::open(store)?;
    let outcome = editor.save(
        hl_core::PolicySnapshot::new(allowlist, blocklist),
        |entry| confirm_move(entry, yes),
    )?;

    println!(
        "{} Saved {} allowed, {} blocked",
        "✓".green(),
        outcome.snapshot.allowlist.len().to_string().green(),
        outcome.snapshot.blocklist.len().to_string().red()
    );
    print_outcome(&outcome);
    Ok(())
}

fn export_lists(store: &JsonFileStore, allow_file: &Path, block_file: &Path) -> Result<()> {
    let snapshot = store.load()?;
    snapshot
        .allowlist
        .save_file(allow_file, "Allowlist")
        .with_context(|| format!("Failed to write {}", allow_file.display()))?;
    snapshot
        .blocklist
        .save_file(block_file, "Blocklist")
        .with_context(|| format!("Failed to write {}", block_file.display()))?;

    println!("{} Exported lists", "✓".green());
    println!("  Allowlist: {}", allow_file.display());
    println!("  Blocklist: {}", block_file.display());
    Ok(())
}

fn print_outcome(outcome: &SaveOutcome) {
    for resolution in &outcome.reconciled.resolutions {
        match resolution {
            Resolution::MovedToAllow(e) => println!("  moved {} off the blocklist", e.cyan()),
            Resolution::MoveDeclined(e) => println!("  kept {} on the blocklist", e.cyan()),
            Resolution::BlockedOverAllow(_) | Resolution::ConflictKeptBlocked(_) => {}
        }
    }
    if let Some(ref notice) = outcome.notice {
        println!("{} {}", "!".yellow(), notice.message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_host_accepts_url_or_hostname() {
        assert_eq!(site_host("https://www.Example.com/path"), "www.example.com");
        assert_eq!(site_host("Example.COM"), "example.com");
    }

    #[test]
    fn test_confirm_assume_yes() {
        assert!(confirm_move("bank.com", true));
    }
}
