//! Policy list implementation
//!
//! A sorted, deduplicated set of lowercase domain entries. Sorting and
//! uniqueness hold by construction, so a `PolicyList` can be persisted as-is.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

use super::host;

/// A set of policy entries (lowercase, trimmed domains)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct PolicyList {
    entries: BTreeSet<String>,
}

impl PolicyList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from raw lines
    ///
    /// Each line is trimmed and lowercased; empty lines and lines starting
    /// with `#` are dropped.
    pub fn normalize<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::new();
        for line in lines {
            list.insert(line.as_ref());
        }
        list
    }

    /// Parse a multi-line text block (one domain per line)
    pub fn parse(text: &str) -> Self {
        Self::normalize(text.lines())
    }

    /// Interpret an arbitrary stored value as a list
    ///
    /// Returns `None` when the value is not an array. Non-string items are
    /// skipped.
    pub fn from_json_value(value: &serde_json::Value) -> Option<Self> {
        let items = value.as_array()?;
        Some(Self::normalize(items.iter().filter_map(|v| v.as_str())))
    }

    /// Insert an entry, returning true if it was not already present
    pub fn insert(&mut self, entry: &str) -> bool {
        let entry = host::normalize_host(entry);
        if entry.is_empty() || entry.starts_with('#') {
            return false;
        }
        self.entries.insert(entry)
    }

    /// Remove an entry, returning true if it was present
    pub fn remove(&mut self, entry: &str) -> bool {
        self.entries.remove(&host::normalize_host(entry))
    }

    /// Exact membership (no subdomain matching)
    pub fn contains(&self, entry: &str) -> bool {
        self.entries.contains(entry)
    }

    /// Whether `hostname` equals or is a subdomain of any entry
    pub fn matches(&self, hostname: &str) -> bool {
        host::matches(hostname, &self.entries)
    }

    /// Iterate entries in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the list is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries as a sorted vector
    pub fn to_vec(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    /// Entries present in `self` but not in `other`, in sorted order
    pub fn difference<'a>(&'a self, other: &'a PolicyList) -> impl Iterator<Item = &'a str> {
        self.entries.difference(&other.entries).map(String::as_str)
    }

    /// Render as a text block, one entry per line
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for entry in &self.entries {
            text.push_str(entry);
            text.push('\n');
        }
        text
    }

    /// Load entries from a text file
    ///
    /// File format:
    /// - One domain per line
    /// - Lines starting with # are comments
    /// - Empty lines are ignored
    pub fn load_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let list = Self::parse(&content);
        info!("Loaded {} domains from {}", list.len(), path.display());
        Ok(list)
    }

    /// Save entries to a text file with a short header
    pub fn save_file<P: AsRef<Path>>(&self, path: P, title: &str) -> std::io::Result<()> {
        let path = path.as_ref();
        let mut content = String::new();

        content.push_str(&format!("# HL First Letters - {title}\n"));
        content.push_str("# One domain per line; subdomains are covered automatically\n");
        content.push_str("# Lines starting with # are comments\n\n");
        content.push_str(&self.to_text());

        std::fs::write(path, content)?;
        debug!("Saved {} domains to {}", self.len(), path.display());
        Ok(())
    }
}

impl From<Vec<String>> for PolicyList {
    fn from(lines: Vec<String>) -> Self {
        Self::normalize(lines)
    }
}

impl From<PolicyList> for Vec<String> {
    fn from(list: PolicyList) -> Self {
        list.entries.into_iter().collect()
    }
}

impl<'a> FromIterator<&'a str> for PolicyList {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        Self::normalize(iter)
    }
}

impl fmt::Display for PolicyList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<&str> = self.iter().collect();
        write!(f, "[{}]", entries.join(", "))
    }
}
