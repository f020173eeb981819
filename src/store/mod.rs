//! Record store interfaces and the in-memory backend.
//!
//! Ownership model:
//! - `RecordStore` is the client-facing contract of the external document
//!   store: snapshot reads, keyed upserts, and live snapshot subscriptions.
//! - `SubscriptionHandle` is the owned live-feed resource; releasing or
//!   dropping it stops delivery.
//! - `MemoryRecordStore` is the reference backend used by tests and demos.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use chrono::Utc;
use indexmap::IndexMap;
use tracing::debug;

use crate::data::{AcronymRecord, EntryFields};
use crate::errors::LookupError;
use crate::types::{AcronymKey, CollectionName};

/// File-backed record store.
pub mod file;

pub use file::FileRecordStore;

/// Callback receiving complete-collection snapshots on every change.
pub type SnapshotListener = Arc<dyn Fn(Vec<AcronymRecord>) + Send + Sync>;

/// Client contract of the external document store.
///
/// Implementations deliver complete-collection snapshots to listeners: one
/// initial snapshot at subscribe time and one after every accepted upsert.
/// Delivery is at-least-once; consumers must treat each snapshot as a full
/// replacement of prior state.
pub trait RecordStore: Send + Sync {
    /// Read the full collection in document insertion order.
    fn read_all(&self, collection: &str) -> Result<Vec<AcronymRecord>, LookupError>;

    /// Create-or-overwrite the document at `key`, assigning `created_at`.
    ///
    /// An overwrite replaces every stored field, timestamp included.
    fn upsert(
        &self,
        collection: &str,
        key: &str,
        fields: EntryFields,
    ) -> Result<(), LookupError>;

    /// Register a live snapshot listener.
    ///
    /// The returned handle stops delivery when released or dropped.
    fn subscribe(
        &self,
        collection: &str,
        listener: SnapshotListener,
    ) -> Result<SubscriptionHandle, LookupError>;
}

/// Owned live-subscription resource.
///
/// Dropping the handle releases the subscription; `release` does so
/// explicitly. Release is idempotent.
pub struct SubscriptionHandle {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl SubscriptionHandle {
    /// Wrap a cancel action invoked exactly once on release or drop.
    pub fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Stop snapshot delivery for this subscription.
    pub fn release(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

/// Validate a collection name before touching backend state.
pub(crate) fn ensure_collection(collection: &str) -> Result<(), LookupError> {
    if collection.trim().is_empty() {
        return Err(LookupError::Configuration(
            "collection name must not be blank".to_string(),
        ));
    }
    Ok(())
}

/// Registry of live listeners shared by the in-process backends.
#[derive(Default)]
pub(crate) struct SubscriberRegistry {
    inner: Mutex<RegistryInner>,
}

#[derive(Default)]
struct RegistryInner {
    next_id: u64,
    entries: Vec<SubscriberEntry>,
}

struct SubscriberEntry {
    id: u64,
    collection: CollectionName,
    listener: SnapshotListener,
}

impl SubscriberRegistry {
    pub(crate) fn add(&self, collection: &str, listener: SnapshotListener) -> u64 {
        let mut inner = self.inner.lock().expect("subscriber registry poisoned");
        let id = inner.next_id;
        inner.next_id += 1;
        inner.entries.push(SubscriberEntry {
            id,
            collection: collection.to_string(),
            listener,
        });
        id
    }

    pub(crate) fn remove(&self, id: u64) {
        let mut inner = self.inner.lock().expect("subscriber registry poisoned");
        inner.entries.retain(|entry| entry.id != id);
    }

    /// Deliver `snapshot` to every listener on `collection`.
    ///
    /// Listeners run outside the registry lock so they may subscribe or
    /// release reentrantly.
    pub(crate) fn notify(&self, collection: &str, snapshot: &[AcronymRecord]) {
        let listeners: Vec<SnapshotListener> = {
            let inner = self.inner.lock().expect("subscriber registry poisoned");
            inner
                .entries
                .iter()
                .filter(|entry| entry.collection == collection)
                .map(|entry| Arc::clone(&entry.listener))
                .collect()
        };
        if listeners.is_empty() {
            return;
        }
        debug!(
            collection,
            listeners = listeners.len(),
            records = snapshot.len(),
            "delivering collection snapshot"
        );
        for listener in listeners {
            listener(snapshot.to_vec());
        }
    }
}

/// In-memory record store for tests and demos.
///
/// Collections are insertion-ordered maps; an overwrite keeps the original
/// document position. Snapshot fan-out happens synchronously on the
/// writer's thread.
#[derive(Clone, Default)]
pub struct MemoryRecordStore {
    collections: Arc<RwLock<HashMap<CollectionName, IndexMap<AcronymKey, AcronymRecord>>>>,
    subscribers: Arc<SubscriberRegistry>,
}

impl MemoryRecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert prebuilt records verbatim (timestamps preserved) and notify
    /// listeners. Intended for seeding demos and tests.
    pub fn seed(
        &self,
        collection: &str,
        records: Vec<AcronymRecord>,
    ) -> Result<(), LookupError> {
        ensure_collection(collection)?;
        let snapshot = {
            let mut collections = self.collections.write().expect("memory store poisoned");
            let documents = collections.entry(collection.to_string()).or_default();
            for record in records {
                documents.insert(record.key.clone(), record);
            }
            documents.values().cloned().collect::<Vec<_>>()
        };
        self.subscribers.notify(collection, &snapshot);
        Ok(())
    }

    fn snapshot_of(&self, collection: &str) -> Vec<AcronymRecord> {
        let collections = self.collections.read().expect("memory store poisoned");
        collections
            .get(collection)
            .map(|documents| documents.values().cloned().collect())
            .unwrap_or_default()
    }
}

impl RecordStore for MemoryRecordStore {
    fn read_all(&self, collection: &str) -> Result<Vec<AcronymRecord>, LookupError> {
        ensure_collection(collection)?;
        Ok(self.snapshot_of(collection))
    }

    fn upsert(
        &self,
        collection: &str,
        key: &str,
        fields: EntryFields,
    ) -> Result<(), LookupError> {
        ensure_collection(collection)?;
        let snapshot = {
            let mut collections = self.collections.write().expect("memory store poisoned");
            let documents = collections.entry(collection.to_string()).or_default();
            let record = AcronymRecord {
                key: key.to_string(),
                definition: fields.definition,
                team: fields.team,
                created_at: Some(Utc::now()),
            };
            documents.insert(key.to_string(), record);
            documents.values().cloned().collect::<Vec<_>>()
        };
        debug!(collection, key, "upserted record");
        self.subscribers.notify(collection, &snapshot);
        Ok(())
    }

    fn subscribe(
        &self,
        collection: &str,
        listener: SnapshotListener,
    ) -> Result<SubscriptionHandle, LookupError> {
        ensure_collection(collection)?;
        let id = self.subscribers.add(collection, Arc::clone(&listener));
        debug!(collection, subscription = id, "subscription opened");
        listener(self.snapshot_of(collection));
        let subscribers = Arc::clone(&self.subscribers);
        Ok(SubscriptionHandle::new(move || {
            debug!(subscription = id, "subscription released");
            subscribers.remove(id);
        }))
    }
}
