//! Durable single-file record store.
//!
//! Layout: a `meta` table holding a versioned store header, a `directory`
//! table mapping each collection to its insertion-ordered key list, and a
//! `records` table keyed `collection/KEY` holding version-tagged bitcode
//! payloads. Timestamps persist as epoch microseconds.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use redb::{Database, ReadableTable, TableDefinition};
use tracing::debug;

use crate::constants::file_store::{
    DEFAULT_STORE_DIR, DEFAULT_STORE_FILENAME, DIRECTORY_VERSION, KEY_SEPARATOR, META_KEY,
    RECORD_VERSION, STORE_VERSION,
};
use crate::data::{AcronymRecord, EntryFields};
use crate::errors::LookupError;
use crate::store::{
    ensure_collection, RecordStore, SnapshotListener, SubscriberRegistry, SubscriptionHandle,
};
use crate::types::AcronymKey;

const META: TableDefinition<&str, &[u8]> = TableDefinition::new("meta");
const DIRECTORY: TableDefinition<&str, &[u8]> = TableDefinition::new("directory");
const RECORDS: TableDefinition<&str, &[u8]> = TableDefinition::new("records");

/// Store-wide header verified on every open.
#[derive(bitcode::Encode, bitcode::Decode)]
struct StoreMeta {
    version: u8,
}

/// On-disk record payload; the key lives in the table key and directory.
#[derive(bitcode::Encode, bitcode::Decode)]
struct PersistedRecord {
    definition: String,
    team: Option<String>,
    created_at_micros: Option<i64>,
}

/// Insertion-ordered key list persisted per collection.
#[derive(bitcode::Encode, bitcode::Decode)]
struct PersistedDirectory {
    keys: Vec<String>,
}

/// File-backed record store with the same live-snapshot contract as
/// `MemoryRecordStore`.
///
/// Reopening the file restores all records in first-insertion order.
/// Subscriptions are process-local: writes from another process are only
/// observed by reopening.
pub struct FileRecordStore {
    db: Database,
    // Serializes upserts so directory read-modify-write stays consistent.
    write_lock: Mutex<()>,
    subscribers: Arc<SubscriberRegistry>,
}

impl fmt::Debug for FileRecordStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileRecordStore").finish_non_exhaustive()
    }
}

impl FileRecordStore {
    /// Open (or create) a store file at `path`.
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self, LookupError> {
        let path = coerce_store_path(path.into());
        ensure_parent_dir(&path)?;
        let db = Database::create(&path).map_err(map_store_err)?;

        // Create tables eagerly so later read transactions never miss them.
        let txn = db.begin_write().map_err(map_store_err)?;
        {
            let _ = txn.open_table(META).map_err(map_store_err)?;
            let _ = txn.open_table(DIRECTORY).map_err(map_store_err)?;
            let _ = txn.open_table(RECORDS).map_err(map_store_err)?;
        }
        txn.commit().map_err(map_store_err)?;

        let store = Self {
            db,
            write_lock: Mutex::new(()),
            subscribers: Arc::new(SubscriberRegistry::default()),
        };
        store.verify_metadata()?;
        debug!(path = %path.display(), "file store opened");
        Ok(store)
    }

    /// Default store file path under the crate's default store directory.
    pub fn default_path() -> PathBuf {
        Self::default_path_in_dir(DEFAULT_STORE_DIR)
    }

    /// Default store file path inside a custom directory.
    pub fn default_path_in_dir<P: AsRef<Path>>(dir: P) -> PathBuf {
        dir.as_ref().join(DEFAULT_STORE_FILENAME)
    }

    fn verify_metadata(&self) -> Result<(), LookupError> {
        match self.read_bytes(META, META_KEY)? {
            Some(bytes) => {
                let meta: StoreMeta = bitcode::decode(&bytes).map_err(|err| LookupError::Store {
                    reason: format!("corrupt store metadata: {err}"),
                })?;
                if meta.version != STORE_VERSION {
                    return Err(LookupError::Store {
                        reason: format!(
                            "store version mismatch (expected {STORE_VERSION}, found {})",
                            meta.version
                        ),
                    });
                }
                Ok(())
            }
            None => {
                let payload = bitcode::encode(&StoreMeta {
                    version: STORE_VERSION,
                });
                self.write_bytes(META, META_KEY, &payload)
            }
        }
    }

    fn read_bytes(
        &self,
        table: TableDefinition<&str, &[u8]>,
        key: &str,
    ) -> Result<Option<Vec<u8>>, LookupError> {
        let txn = self.db.begin_read().map_err(map_store_err)?;
        let table = txn.open_table(table).map_err(map_store_err)?;
        let value = table.get(key).map_err(map_store_err)?;
        Ok(value.map(|guard| guard.value().to_vec()))
    }

    fn write_bytes(
        &self,
        table: TableDefinition<&str, &[u8]>,
        key: &str,
        payload: &[u8],
    ) -> Result<(), LookupError> {
        let txn = self.db.begin_write().map_err(map_store_err)?;
        {
            let mut table = txn.open_table(table).map_err(map_store_err)?;
            table.insert(key, payload).map_err(map_store_err)?;
        }
        txn.commit().map_err(map_store_err)?;
        Ok(())
    }

    fn read_collection(&self, collection: &str) -> Result<Vec<AcronymRecord>, LookupError> {
        let txn = self.db.begin_read().map_err(map_store_err)?;
        let directory = txn.open_table(DIRECTORY).map_err(map_store_err)?;
        let keys = match directory.get(collection).map_err(map_store_err)? {
            Some(guard) => decode_directory(collection, guard.value())?,
            None => return Ok(Vec::new()),
        };
        let records_table = txn.open_table(RECORDS).map_err(map_store_err)?;
        let mut records = Vec::with_capacity(keys.len());
        for key in keys {
            let table_key = record_key(collection, &key);
            match records_table.get(table_key.as_str()).map_err(map_store_err)? {
                Some(guard) => records.push(decode_record(&key, guard.value())?),
                None => {
                    return Err(LookupError::Store {
                        reason: format!("directory references missing record '{key}'"),
                    });
                }
            }
        }
        Ok(records)
    }
}

impl RecordStore for FileRecordStore {
    fn read_all(&self, collection: &str) -> Result<Vec<AcronymRecord>, LookupError> {
        ensure_file_collection(collection)?;
        self.read_collection(collection)
    }

    fn upsert(
        &self,
        collection: &str,
        key: &str,
        fields: EntryFields,
    ) -> Result<(), LookupError> {
        ensure_file_collection(collection)?;
        let snapshot = {
            let _guard = self.write_lock.lock().expect("file store write lock poisoned");
            let record = PersistedRecord {
                definition: fields.definition,
                team: fields.team,
                created_at_micros: Some(Utc::now().timestamp_micros()),
            };
            let txn = self.db.begin_write().map_err(map_store_err)?;
            {
                let mut records = txn.open_table(RECORDS).map_err(map_store_err)?;
                let table_key = record_key(collection, key);
                records
                    .insert(table_key.as_str(), encode_record(&record).as_slice())
                    .map_err(map_store_err)?;

                let mut directory = txn.open_table(DIRECTORY).map_err(map_store_err)?;
                let mut keys = {
                    let existing = directory.get(collection).map_err(map_store_err)?;
                    match existing {
                        Some(guard) => decode_directory(collection, guard.value())?,
                        None => Vec::new(),
                    }
                };
                if !keys.iter().any(|entry| entry == key) {
                    keys.push(key.to_string());
                    directory
                        .insert(collection, encode_directory(&keys).as_slice())
                        .map_err(map_store_err)?;
                }
            }
            txn.commit().map_err(map_store_err)?;
            debug!(collection, key, "persisted record");
            self.read_collection(collection)?
        };
        self.subscribers.notify(collection, &snapshot);
        Ok(())
    }

    fn subscribe(
        &self,
        collection: &str,
        listener: SnapshotListener,
    ) -> Result<SubscriptionHandle, LookupError> {
        ensure_file_collection(collection)?;
        let initial = self.read_collection(collection)?;
        let id = self.subscribers.add(collection, Arc::clone(&listener));
        debug!(collection, subscription = id, "subscription opened");
        listener(initial);
        let subscribers = Arc::clone(&self.subscribers);
        Ok(SubscriptionHandle::new(move || {
            debug!(subscription = id, "subscription released");
            subscribers.remove(id);
        }))
    }
}

/// Collection names become table-key prefixes, so the separator is reserved.
fn ensure_file_collection(collection: &str) -> Result<(), LookupError> {
    ensure_collection(collection)?;
    if collection.contains(KEY_SEPARATOR) {
        return Err(LookupError::Configuration(format!(
            "collection name must not contain '{KEY_SEPARATOR}'"
        )));
    }
    Ok(())
}

fn coerce_store_path(path: PathBuf) -> PathBuf {
    if path.is_dir() {
        path.join(DEFAULT_STORE_FILENAME)
    } else {
        path
    }
}

fn ensure_parent_dir(path: &Path) -> Result<(), LookupError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn map_store_err(err: impl fmt::Display) -> LookupError {
    LookupError::Store {
        reason: err.to_string(),
    }
}

fn record_key(collection: &str, key: &str) -> String {
    let mut table_key = String::with_capacity(collection.len() + 1 + key.len());
    table_key.push_str(collection);
    table_key.push(KEY_SEPARATOR);
    table_key.push_str(key);
    table_key
}

fn encode_record(record: &PersistedRecord) -> Vec<u8> {
    let payload = bitcode::encode(record);
    let mut buf = Vec::with_capacity(1 + payload.len());
    buf.push(RECORD_VERSION);
    buf.extend_from_slice(&payload);
    buf
}

fn decode_record(key: &str, bytes: &[u8]) -> Result<AcronymRecord, LookupError> {
    if bytes.is_empty() || bytes[0] != RECORD_VERSION {
        return Err(LookupError::Store {
            reason: format!("record version mismatch for '{key}'"),
        });
    }
    let raw: PersistedRecord = bitcode::decode(&bytes[1..]).map_err(|err| LookupError::Store {
        reason: format!("corrupt record '{key}': {err}"),
    })?;
    Ok(AcronymRecord {
        key: key.to_string(),
        definition: raw.definition,
        team: raw.team,
        created_at: raw.created_at_micros.and_then(DateTime::from_timestamp_micros),
    })
}

fn encode_directory(keys: &[AcronymKey]) -> Vec<u8> {
    let payload = bitcode::encode(&PersistedDirectory {
        keys: keys.to_vec(),
    });
    let mut buf = Vec::with_capacity(1 + payload.len());
    buf.push(DIRECTORY_VERSION);
    buf.extend_from_slice(&payload);
    buf
}

fn decode_directory(collection: &str, bytes: &[u8]) -> Result<Vec<AcronymKey>, LookupError> {
    if bytes.is_empty() || bytes[0] != DIRECTORY_VERSION {
        return Err(LookupError::Store {
            reason: format!("directory version mismatch for collection '{collection}'"),
        });
    }
    let directory: PersistedDirectory =
        bitcode::decode(&bytes[1..]).map_err(|err| LookupError::Store {
            reason: format!("corrupt directory for collection '{collection}': {err}"),
        })?;
    Ok(directory.keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_payloads_round_trip_with_version_tag() {
        let record = PersistedRecord {
            definition: "Application Programming Interface".to_string(),
            team: Some("Platform".to_string()),
            created_at_micros: Some(1_700_000_000_000_000),
        };
        let encoded = encode_record(&record);
        assert_eq!(encoded[0], RECORD_VERSION);

        let decoded = decode_record("API", &encoded).unwrap();
        assert_eq!(decoded.key, "API");
        assert_eq!(decoded.definition, "Application Programming Interface");
        assert_eq!(decoded.team.as_deref(), Some("Platform"));
        assert_eq!(
            decoded.created_at.map(|at| at.timestamp_micros()),
            Some(1_700_000_000_000_000)
        );
    }

    #[test]
    fn version_mismatches_are_rejected() {
        let record = PersistedRecord {
            definition: "definition".to_string(),
            team: None,
            created_at_micros: None,
        };
        let mut encoded = encode_record(&record);
        encoded[0] = RECORD_VERSION.wrapping_add(1);
        assert!(decode_record("API", &encoded).is_err());
        assert!(decode_record("API", &[]).is_err());

        let mut dir = encode_directory(&["API".to_string()]);
        dir[0] = DIRECTORY_VERSION.wrapping_add(1);
        assert!(decode_directory("acronyms", &dir).is_err());
    }

    #[test]
    fn directory_preserves_key_order() {
        let keys = vec!["SLA".to_string(), "API".to_string(), "DNS".to_string()];
        let decoded = decode_directory("acronyms", &encode_directory(&keys)).unwrap();
        assert_eq!(decoded, keys);
    }

    #[test]
    fn table_keys_scope_records_to_their_collection() {
        assert_eq!(record_key("acronyms", "API"), "acronyms/API");
        // Keys may carry the separator themselves (e.g. TCP/IP); uniqueness
        // holds because collection names cannot.
        assert_eq!(record_key("acronyms", "TCP/IP"), "acronyms/TCP/IP");
    }

    #[test]
    fn collection_names_with_separator_are_rejected() {
        assert!(matches!(
            ensure_file_collection("a/b"),
            Err(LookupError::Configuration(_))
        ));
        assert!(ensure_file_collection("acronyms").is_ok());
    }
}
