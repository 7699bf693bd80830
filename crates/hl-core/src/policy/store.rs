//! Persistent storage interface for the policy lists
//!
//! Storage is the single source of truth for both lists. Backends live in
//! `hl-platform`; this module defines the contract and the record layout.

use crossbeam_channel::Receiver;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{defaults, PolicyList, PolicySnapshot};
use crate::error::Result;

/// Storage key of the allowlist
pub const ALLOWLIST_KEY: &str = "allowlist";
/// Storage key of the blocklist
pub const BLOCKLIST_KEY: &str = "blocklist";
/// Storage key of the transient conflict notice
pub const NOTICE_KEY: &str = "listConflictNotice";

/// Transient user-visible notice about an automatic list resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Human readable message
    pub message: String,
}

impl Notice {
    /// Create a notice
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A change observed in storage
///
/// Only the keys that changed are populated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageChange {
    /// New allowlist value
    pub allowlist: Option<PolicyList>,
    /// New blocklist value
    pub blocklist: Option<PolicyList>,
    /// New notice value
    pub notice: Option<Notice>,
}

impl StorageChange {
    /// Change carrying both lists of a snapshot
    pub fn lists(snapshot: &PolicySnapshot) -> Self {
        Self {
            allowlist: Some(snapshot.allowlist.clone()),
            blocklist: Some(snapshot.blocklist.clone()),
            notice: None,
        }
    }

    /// Change carrying only the lists that differ between two snapshots
    pub fn between(old: &PolicySnapshot, new: &PolicySnapshot) -> Self {
        Self {
            allowlist: (old.allowlist != new.allowlist).then(|| new.allowlist.clone()),
            blocklist: (old.blocklist != new.blocklist).then(|| new.blocklist.clone()),
            notice: None,
        }
    }

    /// Whether nothing changed
    pub fn is_empty(&self) -> bool {
        !self.touches_lists() && self.notice.is_none()
    }

    /// Whether either list changed
    pub fn touches_lists(&self) -> bool {
        self.allowlist.is_some() || self.blocklist.is_some()
    }

    /// Apply the list part of this change on top of `snapshot`
    pub fn apply_to(&self, snapshot: &PolicySnapshot) -> PolicySnapshot {
        PolicySnapshot::new(
            self.allowlist
                .clone()
                .unwrap_or_else(|| snapshot.allowlist.clone()),
            self.blocklist
                .clone()
                .unwrap_or_else(|| snapshot.blocklist.clone()),
        )
    }
}

/// Key-value storage for the policy lists
#[cfg_attr(test, mockall::automock)]
pub trait PolicyStore {
    /// Read both lists, falling back to defaults for missing or malformed values
    fn load(&self) -> Result<PolicySnapshot>;

    /// Durably write both lists; returns once committed
    fn save(&self, snapshot: &PolicySnapshot) -> Result<()>;

    /// Publish a transient notice
    fn post_notice(&self, notice: &Notice) -> Result<()>;

    /// Subscribe to change notifications
    fn subscribe(&self) -> Receiver<StorageChange>;
}

/// Default lists used when storage holds nothing usable
pub fn default_snapshot() -> PolicySnapshot {
    PolicySnapshot::new(
        PolicyList::normalize(defaults::DEFAULT_ALLOWLIST),
        PolicyList::normalize(defaults::DEFAULT_BLOCKLIST),
    )
}

/// Decode a stored record into a sanitized snapshot
///
/// Missing or non-list values fall back to the corresponding list in
/// `fallback`.
pub fn snapshot_from_record(record: &serde_json::Value, fallback: &PolicySnapshot) -> PolicySnapshot {
    let read = |key: &str, default: &PolicyList| match record.get(key) {
        None => default.clone(),
        Some(value) => PolicyList::from_json_value(value).unwrap_or_else(|| {
            warn!(key, "Stored value is not a list, using defaults");
            default.clone()
        }),
    };

    PolicySnapshot::new(
        read(ALLOWLIST_KEY, &fallback.allowlist),
        read(BLOCKLIST_KEY, &fallback.blocklist),
    )
    .sanitized()
}

/// Decode the notice record, ignoring malformed values
pub fn notice_from_record(record: &serde_json::Value) -> Option<Notice> {
    record
        .get(NOTICE_KEY)
        .and_then(|value| serde_json::from_value(value.clone()).ok())
}
