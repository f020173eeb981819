use std::sync::{Arc, Condvar, Mutex, RwLock};
use std::time::Duration;

use indexmap::IndexMap;
use tracing::debug;

use crate::data::AcronymRecord;
use crate::types::AcronymKey;

/// Thread-safe in-memory reflection of one store collection.
///
/// The mirror only changes through `replace`, which installs the latest
/// complete-collection snapshot delivered by a store subscription. State is
/// never patched incrementally, so duplicate or out-of-order snapshot
/// delivery cannot leave stale entries behind.
#[derive(Clone)]
pub struct RecordMirror {
    inner: Arc<RwLock<MirrorInner>>,
    notifier: Arc<(Mutex<MirrorStats>, Condvar)>,
}

/// Internal mirrored storage behind `RecordMirror` locks.
struct MirrorInner {
    records: IndexMap<AcronymKey, AcronymRecord>,
}

/// Internal snapshot-delivery counters.
#[derive(Default)]
struct MirrorStats {
    updates: u64,
}

impl RecordMirror {
    /// Create an empty mirror.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MirrorInner {
                records: IndexMap::new(),
            })),
            notifier: Arc::new((Mutex::new(MirrorStats::default()), Condvar::new())),
        }
    }

    /// Install `records` as the complete mirrored set.
    ///
    /// When one snapshot carries duplicate keys, the later entry wins.
    pub fn replace(&self, records: Vec<AcronymRecord>) {
        let count = {
            let mut inner = self.inner.write().expect("record mirror poisoned");
            inner.records.clear();
            for record in records {
                inner.records.insert(record.key.clone(), record);
            }
            inner.records.len()
        };
        debug!(records = count, "mirror replaced");
        let (lock, cvar) = &*self.notifier;
        let mut stats = lock.lock().expect("record mirror stats poisoned");
        stats.updates = stats.updates.saturating_add(1);
        cvar.notify_all();
    }

    /// Return a cloned snapshot of current mirrored records in store order.
    pub fn snapshot(&self) -> Vec<AcronymRecord> {
        let inner = self.inner.read().expect("record mirror poisoned");
        inner.records.values().cloned().collect()
    }

    /// Look up a single record by its canonical key.
    pub fn get(&self, key: &str) -> Option<AcronymRecord> {
        let inner = self.inner.read().expect("record mirror poisoned");
        inner.records.get(key).cloned()
    }

    /// Return the number of snapshot deliveries observed so far.
    pub fn update_count(&self) -> u64 {
        let (lock, _) = &*self.notifier;
        lock.lock().expect("record mirror stats poisoned").updates
    }

    /// Wait until the update count exceeds `last_seen`, or until timeout.
    pub fn wait_for_update(&self, last_seen: u64, timeout: Duration) -> u64 {
        let (lock, cvar) = &*self.notifier;
        let mut stats = lock.lock().expect("record mirror stats poisoned");
        while stats.updates <= last_seen {
            let result = cvar
                .wait_timeout(stats, timeout)
                .expect("record mirror stats poisoned");
            stats = result.0;
            if result.1.timed_out() {
                break;
            }
        }
        stats.updates
    }

    /// Wait indefinitely until the update count exceeds `last_seen`.
    pub fn wait_for_update_blocking(&self, last_seen: u64) -> u64 {
        let (lock, cvar) = &*self.notifier;
        let mut stats = lock.lock().expect("record mirror stats poisoned");
        while stats.updates <= last_seen {
            stats = cvar.wait(stats).expect("record mirror stats poisoned");
        }
        stats.updates
    }

    /// Returns `true` when the mirror holds no records.
    pub fn is_empty(&self) -> bool {
        let inner = self.inner.read().expect("record mirror poisoned");
        inner.records.is_empty()
    }

    /// Return the number of mirrored records.
    pub fn len(&self) -> usize {
        let inner = self.inner.read().expect("record mirror poisoned");
        inner.records.len()
    }
}

impl Default for RecordMirror {
    fn default() -> Self {
        Self::new()
    }
}
