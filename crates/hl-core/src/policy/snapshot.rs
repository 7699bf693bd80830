//! Allow/block snapshot and permission evaluation

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::PolicyList;

/// Outcome of evaluating a hostname against a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Host is allowlisted and not blocked
    Allowed,
    /// Host is not on the allowlist
    NotAllowlisted,
    /// Host is on the blocklist (overrides the allowlist)
    Blocked,
}

impl Permission {
    /// Whether transformation may run
    pub fn is_allowed(self) -> bool {
        self == Self::Allowed
    }
}

/// Both policy lists captured at one point in time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySnapshot {
    /// Domains where transformation is permitted
    pub allowlist: PolicyList,
    /// Domains where transformation is forbidden
    pub blocklist: PolicyList,
}

impl PolicySnapshot {
    /// Create a snapshot from two lists
    pub fn new(allowlist: PolicyList, blocklist: PolicyList) -> Self {
        Self {
            allowlist,
            blocklist,
        }
    }

    /// Evaluate a hostname
    pub fn evaluate(&self, hostname: &str) -> Permission {
        if self.blocklist.matches(hostname) {
            debug!("Host {} is blocklisted", hostname);
            Permission::Blocked
        } else if self.allowlist.matches(hostname) {
            Permission::Allowed
        } else {
            Permission::NotAllowlisted
        }
    }

    /// Entries present in both lists
    pub fn conflicts(&self) -> Vec<String> {
        self.allowlist
            .iter()
            .filter(|entry| self.blocklist.contains(entry))
            .map(str::to_string)
            .collect()
    }

    /// Enforce disjointness: any entry in both lists stays only in the blocklist
    ///
    /// Applied to every snapshot read from storage, since storage can be
    /// edited without going through reconciliation.
    pub fn sanitized(mut self) -> Self {
        let conflicts = self.conflicts();
        if !conflicts.is_empty() {
            warn!(
                entries = ?conflicts,
                "Stored lists overlap; keeping overlapping entries blocked"
            );
            for entry in &conflicts {
                self.allowlist.remove(entry);
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(allow: &[&str], block: &[&str]) -> PolicySnapshot {
        PolicySnapshot::new(PolicyList::normalize(allow), PolicyList::normalize(block))
    }

    #[test]
    fn test_evaluate() {
        let snap = snapshot(&["reddit.com", "bank.com"], &["bank.com"]);

        assert_eq!(snap.evaluate("old.reddit.com"), Permission::Allowed);
        assert_eq!(snap.evaluate("bank.com"), Permission::Blocked);
        assert_eq!(snap.evaluate("login.bank.com"), Permission::Blocked);
        assert_eq!(snap.evaluate("youtube.com"), Permission::NotAllowlisted);
        assert_eq!(snap.evaluate(""), Permission::NotAllowlisted);
    }

    #[test]
    fn test_block_wins_for_subdomains() {
        // Allowing a subdomain does not escape a blocked parent
        let snap = snapshot(&["news.bank.com"], &["bank.com"]);
        assert_eq!(snap.evaluate("news.bank.com"), Permission::Blocked);
    }

    #[test]
    fn test_sanitized() {
        let snap = snapshot(&["a.com", "b.com"], &["a.com"]).sanitized();
        assert_eq!(snap.allowlist.to_vec(), vec!["b.com"]);
        assert_eq!(snap.blocklist.to_vec(), vec!["a.com"]);
        assert!(snap.conflicts().is_empty());
    }
}
