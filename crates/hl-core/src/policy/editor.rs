//! List editing flow
//!
//! Every edit (a full save of both text areas, or a single-site action) is
//! reconciled against the last persisted lists before it is written back.

use tracing::{info, instrument, warn};

use super::reconcile::{reconcile_snapshots, Reconciled};
use super::store::{Notice, PolicyStore};
use super::{host, PolicyList, PolicySnapshot};
use crate::error::Result;

/// Outcome of a save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    /// Lists as persisted
    pub snapshot: PolicySnapshot,
    /// Notice published for automatic resolutions, if any
    ///
    /// `None` also when posting the notice failed; the lists are saved either way.
    pub notice: Option<Notice>,
    /// Full reconciliation result
    pub reconciled: Reconciled,
}

/// Edits the policy lists held by a store
pub struct PolicyEditor<S: PolicyStore> {
    store: S,
    last: PolicySnapshot,
}

impl<S: PolicyStore> PolicyEditor<S> {
    /// Load the current lists and remember them as the last known state
    pub fn open(store: S) -> Result<Self> {
        let last = store.load()?;
        Ok(Self { store, last })
    }

    /// Last persisted lists
    pub fn current(&self) -> &PolicySnapshot {
        &self.last
    }

    /// Underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Save both lists from free-form text (one domain per line)
    pub fn save_text<F>(&mut self, allow_text: &str, block_text: &str, confirm: F) -> Result<SaveOutcome>
    where
        F: FnMut(&str) -> bool,
    {
        let desired = PolicySnapshot::new(PolicyList::parse(allow_text), PolicyList::parse(block_text));
        self.save(desired, confirm)
    }

    /// Reconcile `desired` against the last lists and persist the result
    #[instrument(skip_all, fields(allow = desired.allowlist.len(), block = desired.blocklist.len()))]
    pub fn save<F>(&mut self, desired: PolicySnapshot, confirm: F) -> Result<SaveOutcome>
    where
        F: FnMut(&str) -> bool,
    {
        let reconciled = reconcile_snapshots(&desired, &self.last, confirm);
        self.store.save(&reconciled.snapshot)?;
        self.last = reconciled.snapshot.clone();

        // The lists are committed at this point; a lost notice only costs the message.
        let notice = reconciled
            .notice_message()
            .map(Notice::new)
            .filter(|notice| match self.store.post_notice(notice) {
                Ok(()) => true,
                Err(e) => {
                    warn!("Failed to post list notice: {}", e);
                    false
                }
            });

        info!(
            allow = self.last.allowlist.len(),
            block = self.last.blocklist.len(),
            "Saved policy lists"
        );

        Ok(SaveOutcome {
            snapshot: self.last.clone(),
            notice,
            reconciled,
        })
    }

    /// Add a site to the allowlist
    pub fn allow_site<F>(&mut self, site: &str, confirm: F) -> Result<SaveOutcome>
    where
        F: FnMut(&str) -> bool,
    {
        let mut desired = self.last.clone();
        desired.allowlist.insert(&host::normalize_host(site));
        self.save(desired, confirm)
    }

    /// Add a site to the blocklist
    pub fn block_site(&mut self, site: &str) -> Result<SaveOutcome> {
        let mut desired = self.last.clone();
        desired.blocklist.insert(&host::normalize_host(site));
        self.save(desired, |_| false)
    }

    /// Remove a site from both lists
    pub fn remove_site(&mut self, site: &str) -> Result<SaveOutcome> {
        let mut desired = self.last.clone();
        desired.allowlist.remove(site);
        desired.blocklist.remove(site);
        self.save(desired, |_| false)
    }

    /// Re-read the store, replacing the last known lists
    pub fn refresh(&mut self) -> Result<&PolicySnapshot> {
        self.last = self.store.load()?;
        Ok(&self.last)
    }
}
