//! In-memory policy store
//!
//! Keeps the same record layout as [`JsonFileStore`](crate::JsonFileStore)
//! in a JSON value, so raw (possibly malformed) writes can be simulated.

use crossbeam_channel::Receiver;
use hl_core::policy::store::{
    notice_from_record, snapshot_from_record, ALLOWLIST_KEY, BLOCKLIST_KEY, NOTICE_KEY,
};
use hl_core::policy::{Notice, PolicySnapshot, PolicyStore, StorageChange};
use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::subscribers::Subscribers;

/// Policy store living in process memory
#[derive(Debug)]
pub struct MemoryStore {
    defaults: PolicySnapshot,
    record: RwLock<Map<String, Value>>,
    subscribers: Subscribers,
}

impl MemoryStore {
    /// Empty store that reads as `defaults`
    pub fn new(defaults: PolicySnapshot) -> Self {
        Self {
            defaults: defaults.sanitized(),
            record: RwLock::new(Map::new()),
            subscribers: Subscribers::default(),
        }
    }

    /// Store pre-filled with `snapshot`
    pub fn with_snapshot(snapshot: &PolicySnapshot) -> Self {
        let store = Self::new(PolicySnapshot::default());
        store.write_lists(snapshot);
        store
    }

    /// Write a raw value under `key`, as another writer would
    ///
    /// Subscribers see the decoded effect of the write.
    pub fn set_raw(&self, key: &str, value: Value) {
        let (before, after, notice) = {
            let mut record = self.record.write();
            let before = snapshot_from_record(&Value::Object(record.clone()), &self.defaults);
            record.insert(key.to_string(), value);
            let current = Value::Object(record.clone());
            (
                before,
                snapshot_from_record(&current, &self.defaults),
                notice_from_record(&current),
            )
        };

        let mut change = StorageChange::between(&before, &after);
        if key == NOTICE_KEY {
            change.notice = notice;
        }
        self.subscribers.publish(&change);
    }

    /// Current notice, if any
    pub fn notice(&self) -> Option<Notice> {
        notice_from_record(&Value::Object(self.record.read().clone()))
    }

    fn write_lists(&self, snapshot: &PolicySnapshot) -> PolicySnapshot {
        let mut record = self.record.write();
        let before = snapshot_from_record(&Value::Object(record.clone()), &self.defaults);
        record.insert(ALLOWLIST_KEY.to_string(), Value::from(snapshot.allowlist.to_vec()));
        record.insert(BLOCKLIST_KEY.to_string(), Value::from(snapshot.blocklist.to_vec()));
        before
    }
}

impl PolicyStore for MemoryStore {
    fn load(&self) -> hl_core::Result<PolicySnapshot> {
        let record = Value::Object(self.record.read().clone());
        Ok(snapshot_from_record(&record, &self.defaults))
    }

    fn save(&self, snapshot: &PolicySnapshot) -> hl_core::Result<()> {
        let before = self.write_lists(snapshot);
        self.subscribers
            .publish(&StorageChange::between(&before, snapshot));
        Ok(())
    }

    fn post_notice(&self, notice: &Notice) -> hl_core::Result<()> {
        self.record
            .write()
            .insert(NOTICE_KEY.to_string(), serde_json::to_value(notice)?);
        self.subscribers.publish(&StorageChange {
            notice: Some(notice.clone()),
            ..StorageChange::default()
        });
        Ok(())
    }

    fn subscribe(&self) -> Receiver<StorageChange> {
        self.subscribers.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hl_core::PolicyList;
    use serde_json::json;

    fn snap(allow: &[&str], block: &[&str]) -> PolicySnapshot {
        PolicySnapshot::new(PolicyList::normalize(allow), PolicyList::normalize(block))
    }

    #[test]
    fn test_defaults_until_saved() {
        let store = MemoryStore::new(snap(&["a.com"], &[]));
        assert_eq!(store.load().unwrap(), snap(&["a.com"], &[]));
        store.save(&snap(&["b.com"], &["c.com"])).unwrap();
        assert_eq!(store.load().unwrap(), snap(&["b.com"], &["c.com"]));
    }

    #[test]
    fn test_raw_non_list_falls_back() {
        let store = MemoryStore::new(snap(&["a.com"], &["z.com"]));
        store.set_raw("blocklist", json!({"oops": true}));
        assert_eq!(store.load().unwrap().blocklist.to_vec(), vec!["z.com"]);
    }

    #[test]
    fn test_raw_overlap_is_sanitized_and_published() {
        let store = MemoryStore::with_snapshot(&snap(&["a.com", "b.com"], &[]));
        let rx = store.subscribe();
        store.set_raw("blocklist", json!(["A.com"]));

        let change = rx.try_recv().unwrap();
        assert_eq!(change.allowlist, Some(PolicyList::normalize(["b.com"])));
        assert_eq!(change.blocklist, Some(PolicyList::normalize(["a.com"])));
        assert_eq!(store.load().unwrap(), snap(&["b.com"], &["a.com"]));
    }

    #[test]
    fn test_notice_roundtrip() {
        let store = MemoryStore::new(PolicySnapshot::default());
        let rx = store.subscribe();
        store.post_notice(&Notice::new("moved")).unwrap();
        assert_eq!(store.notice(), Some(Notice::new("moved")));
        assert_eq!(rx.try_recv().unwrap().notice, Some(Notice::new("moved")));
    }
}
