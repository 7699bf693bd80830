//! JSON file policy store
//!
//! Persists both lists and the conflict notice as one JSON object:
//!
//! ```json
//! {
//!   "allowlist": ["medium.com"],
//!   "blocklist": ["monzo.com"],
//!   "listConflictNotice": { "message": "..." }
//! }
//! ```
//!
//! External edits are picked up by [`JsonFileStore::check_reload`], which
//! compares the file's modification time and notifies subscribers.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crossbeam_channel::Receiver;
use hl_core::policy::store::{
    notice_from_record, snapshot_from_record, ALLOWLIST_KEY, BLOCKLIST_KEY, NOTICE_KEY,
};
use hl_core::policy::{Notice, PolicySnapshot, PolicyStore, StorageChange};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

use crate::error::{PlatformError, Result};
use crate::subscribers::Subscribers;

#[derive(Debug, Clone, Default)]
struct Cached {
    snapshot: PolicySnapshot,
    notice: Option<Notice>,
    modified: Option<SystemTime>,
}

/// Policy store backed by a JSON file
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    defaults: PolicySnapshot,
    cached: RwLock<Cached>,
    subscribers: Subscribers,
}

impl JsonFileStore {
    /// Open the store at `path`
    ///
    /// A missing file is not an error: reads return `defaults` until the
    /// first save creates it.
    pub fn open<P: AsRef<Path>>(path: P, defaults: PolicySnapshot) -> Result<Self> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
            defaults: defaults.sanitized(),
            cached: RwLock::new(Cached::default()),
            subscribers: Subscribers::default(),
        };

        let record = store.read_record()?;
        *store.cached.write() = Cached {
            snapshot: snapshot_from_record(&record, &store.defaults),
            notice: notice_from_record(&record),
            modified: store.modified(),
        };
        debug!(path = %store.path.display(), "Opened policy store");
        Ok(store)
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lists used when the file holds none
    pub fn defaults(&self) -> &PolicySnapshot {
        &self.defaults
    }

    /// Current notice, if any
    pub fn notice(&self) -> Result<Option<Notice>> {
        Ok(notice_from_record(&self.read_record()?))
    }

    /// Remove the notice; returns whether one was present
    pub fn clear_notice(&self) -> Result<bool> {
        let mut record = self.read_record()?;
        let removed = record
            .as_object_mut()
            .and_then(|map| map.remove(NOTICE_KEY))
            .is_some();
        if removed {
            self.write_record(&record)?;
            self.cached.write().notice = None;
        }
        Ok(removed)
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Re-read the file if it changed on disk and notify subscribers
    ///
    /// Returns whether anything was published.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn check_reload(&self) -> Result<bool> {
        let modified = self.modified();
        if modified == self.cached.read().modified {
            return Ok(false);
        }

        info!("Policy store changed on disk, reloading");
        let record = self.read_record()?;
        let snapshot = snapshot_from_record(&record, &self.defaults);
        let notice = notice_from_record(&record);

        let change = {
            let mut cached = self.cached.write();
            let mut change = StorageChange::between(&cached.snapshot, &snapshot);
            if notice.is_some() && notice != cached.notice {
                change.notice.clone_from(&notice);
            }
            *cached = Cached {
                snapshot,
                notice,
                modified,
            };
            change
        };

        let changed = !change.is_empty();
        self.subscribers.publish(&change);
        Ok(changed)
    }

    fn modified(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).and_then(|m| m.modified()).ok()
    }

    fn read_record(&self) -> Result<Value> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Value::Object(Map::new()));
            }
            Err(e) => return Err(PlatformError::file(&self.path, e)),
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(record @ Value::Object(_)) => Ok(record),
            Ok(_) | Err(_) => {
                warn!(path = %self.path.display(), "Store file is not a JSON object, using defaults");
                Ok(Value::Object(Map::new()))
            }
        }
    }

    fn write_record(&self, record: &Value) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| PlatformError::file(parent, e))?;
        }

        let content = serde_json::to_string_pretty(record)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).map_err(|e| PlatformError::file(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| PlatformError::file(&self.path, e))?;

        self.cached.write().modified = self.modified();
        Ok(())
    }

    fn set_key(&self, key: &str, value: Value) -> Result<()> {
        let mut record = self.read_record()?;
        if let Some(map) = record.as_object_mut() {
            map.insert(key.to_string(), value);
        }
        self.write_record(&record)
    }
}

impl PolicyStore for JsonFileStore {
    fn load(&self) -> hl_core::Result<PolicySnapshot> {
        let record = self.read_record()?;
        Ok(snapshot_from_record(&record, &self.defaults))
    }

    fn save(&self, snapshot: &PolicySnapshot) -> hl_core::Result<()> {
        let mut record = self.read_record()?;
        if let Some(map) = record.as_object_mut() {
            map.insert(ALLOWLIST_KEY.to_string(), serde_json::to_value(&snapshot.allowlist)?);
            map.insert(BLOCKLIST_KEY.to_string(), serde_json::to_value(&snapshot.blocklist)?);
        }
        self.write_record(&record)?;

        let change = {
            let mut cached = self.cached.write();
            let change = StorageChange::between(&cached.snapshot, snapshot);
            cached.snapshot = snapshot.clone();
            change
        };
        self.subscribers.publish(&change);
        info!(
            path = %self.path.display(),
            allow = snapshot.allowlist.len(),
            block = snapshot.blocklist.len(),
            "Saved policy lists"
        );
        Ok(())
    }

    fn post_notice(&self, notice: &Notice) -> hl_core::Result<()> {
        self.set_key(NOTICE_KEY, serde_json::to_value(notice)?)?;
        self.cached.write().notice = Some(notice.clone());
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
    use tempfile::tempdir;

    fn snap(allow: &[&str], block: &[&str]) -> PolicySnapshot {
        PolicySnapshot::new(PolicyList::normalize(allow), PolicyList::normalize(block))
    }

    #[test]
    fn test_missing_file_reads_defaults() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("lists.json"), snap(&["a.com"], &["b.com"])).unwrap();
        assert_eq!(store.load().unwrap(), snap(&["a.com"], &["b.com"]));
        assert!(store.notice().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("lists.json");
        let store = JsonFileStore::open(&path, PolicySnapshot::default()).unwrap();

        store.save(&snap(&["x.com"], &["y.com"])).unwrap();
        assert_eq!(store.load().unwrap(), snap(&["x.com"], &["y.com"]));

        let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["allowlist"], serde_json::json!(["x.com"]));
        assert_eq!(raw["blocklist"], serde_json::json!(["y.com"]));
    }

    #[test]
    fn test_save_keeps_notice() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("lists.json"), PolicySnapshot::default()).unwrap();
        store.post_notice(&Notice::new("heads up")).unwrap();
        store.save(&snap(&["x.com"], &[])).unwrap();
        assert_eq!(store.notice().unwrap(), Some(Notice::new("heads up")));

        assert!(store.clear_notice().unwrap());
        assert!(!store.clear_notice().unwrap());
    }

    #[test]
    fn test_save_publishes_changed_lists() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("lists.json"), snap(&["a.com"], &[])).unwrap();
        let rx = store.subscribe();

        store.save(&snap(&["a.com"], &["b.com"])).unwrap();
        let change = rx.try_recv().unwrap();
        assert!(change.allowlist.is_none());
        assert_eq!(change.blocklist, Some(PolicyList::normalize(["b.com"])));
    }

    #[test]
    fn test_malformed_file_degrades_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lists.json");
        fs::write(&path, "not json").unwrap();
        let store = JsonFileStore::open(&path, snap(&["a.com"], &[])).unwrap();
        assert_eq!(store.load().unwrap(), snap(&["a.com"], &[]));
    }

    #[test]
    fn test_unchanged_file_does_not_reload() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("lists.json"), PolicySnapshot::default()).unwrap();
        store.save(&snap(&["a.com"], &[])).unwrap();
        assert!(!store.check_reload().unwrap());
    }
}
