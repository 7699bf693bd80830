//! Allow/block list reconciliation
//!
//! Merges an edited pair of lists against the last persisted pair so the
//! result is disjoint. Precedence:
//!
//! 1. Entries newly added to the blocklist are evicted from the allowlist.
//! 2. Entries newly added to the allowlist that were blocked before need
//!    confirmation; declining keeps them blocked.
//! 3. Anything still in both lists stays blocked.

use tracing::{debug, info};

use super::{PolicyList, PolicySnapshot};

/// How a single entry was resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Newly blocked entry removed from the allowlist
    BlockedOverAllow(String),
    /// Previously blocked entry moved to the allowlist after confirmation
    MovedToAllow(String),
    /// Move to the allowlist was declined; entry stays blocked
    MoveDeclined(String),
    /// Entry found in both lists without a recorded edit; kept blocked
    ConflictKeptBlocked(String),
}

impl Resolution {
    /// The entry this resolution is about
    pub fn entry(&self) -> &str {
        match self {
            Self::BlockedOverAllow(e)
            | Self::MovedToAllow(e)
            | Self::MoveDeclined(e)
            | Self::ConflictKeptBlocked(e) => e,
        }
    }

    /// Whether the engine resolved this without asking the user
    pub fn is_automatic(&self) -> bool {
        matches!(self, Self::BlockedOverAllow(_) | Self::ConflictKeptBlocked(_))
    }
}

/// Result of a reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    /// Conflict-free lists
    pub snapshot: PolicySnapshot,
    /// What happened to each contested entry, in processing order
    pub resolutions: Vec<Resolution>,
}

impl Reconciled {
    /// User-facing notice describing automatic resolutions, if any
    pub fn notice_message(&self) -> Option<String> {
        let automatic: Vec<&str> = self
            .resolutions
            .iter()
            .filter(|r| r.is_automatic())
            .map(Resolution::entry)
            .collect();

        if automatic.is_empty() {
            None
        } else {
            Some(format!(
                "Lists updated: {} kept on the blocklist only.",
                automatic.join(", ")
            ))
        }
    }
}

/// Reconcile edited lists against the last known lists
///
/// `confirm_move_to_allow` is called once for each entry that is being moved
/// from the blocklist to the allowlist, and for no other entry.
pub fn reconcile<F>(
    allowlist: &PolicyList,
    blocklist: &PolicyList,
    last_allowlist: &PolicyList,
    last_blocklist: &PolicyList,
    mut confirm_move_to_allow: F,
) -> Reconciled
where
    F: FnMut(&str) -> bool,
{
    let mut allow = allowlist.clone();
    let mut block = blocklist.clone();
    let mut resolutions = Vec::new();

    for entry in blocklist.difference(last_blocklist) {
        if allow.remove(entry) {
            debug!(entry, "Newly blocked entry evicted from allowlist");
            resolutions.push(Resolution::BlockedOverAllow(entry.to_string()));
        }
    }

    for entry in allowlist.difference(last_allowlist) {
        if !allow.contains(entry) || !last_blocklist.contains(entry) {
            continue;
        }
        if confirm_move_to_allow(entry) {
            block.remove(entry);
            resolutions.push(Resolution::MovedToAllow(entry.to_string()));
        } else {
            allow.remove(entry);
            block.insert(entry);
            resolutions.push(Resolution::MoveDeclined(entry.to_string()));
        }
    }

    let leftover: Vec<String> = allow
        .iter()
        .filter(|entry| block.contains(entry))
        .map(str::to_string)
        .collect();
    for entry in leftover {
        allow.remove(&entry);
        resolutions.push(Resolution::ConflictKeptBlocked(entry));
    }

    if !resolutions.is_empty() {
        info!(count = resolutions.len(), "Reconciled list conflicts");
    }

    Reconciled {
        snapshot: PolicySnapshot::new(allow, block),
        resolutions,
    }
}

/// Reconcile snapshot pairs; see [`reconcile`]
pub fn reconcile_snapshots<F>(current: &PolicySnapshot, last: &PolicySnapshot, confirm: F) -> Reconciled
where
    F: FnMut(&str) -> bool,
{
    reconcile(
        &current.allowlist,
        &current.blocklist,
        &last.allowlist,
        &last.blocklist,
        confirm,
    )
}
