//! Site policy: allowlist/blocklist management
//!
//! This module provides:
//! - Host matching (exact and subdomain)
//! - Normalized, sorted policy lists with text-file support
//! - Permission evaluation where the blocklist always wins
//! - Reconciliation of concurrent list edits
//! - The storage contract and the list editing flow

pub mod defaults;
mod editor;
pub mod host;
mod list;
pub mod reconcile;
mod snapshot;
pub mod store;

pub use editor::{PolicyEditor, SaveOutcome};
pub use host::{host_from_url, matches};
pub use list::PolicyList;
pub use reconcile::{reconcile, reconcile_snapshots, Reconciled, Resolution};
pub use snapshot::{Permission, PolicySnapshot};
pub use store::{Notice, PolicyStore, StorageChange};
