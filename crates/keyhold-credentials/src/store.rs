//! Storage for credential hash records.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::hasher::HashRecord;

/// Backend holding one [`HashRecord`] per identifier.
///
/// Implementations own their synchronization. A record written by a
/// completed `put` is observed whole or not at all; no caller ever holds a
/// reference into the backing map.
pub trait CredentialStore: Send + Sync {
    /// Insert or overwrite the record for `identifier`. Last write wins.
    fn put(&self, identifier: &str, record: HashRecord);

    /// The current record for `identifier`, or `None` if never enrolled.
    fn get(&self, identifier: &str) -> Option<HashRecord>;

    /// Number of enrolled identifiers.
    fn len(&self) -> usize;

    /// Returns true if nothing is enrolled.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: CredentialStore + ?Sized> CredentialStore for Arc<T> {
    fn put(&self, identifier: &str, record: HashRecord) {
        (**self).put(identifier, record)
    }

    fn get(&self, identifier: &str) -> Option<HashRecord> {
        (**self).get(identifier)
    }

    fn len(&self) -> usize {
        (**self).len()
    }
}

/// Volatile in-memory credential store.
///
/// Identifiers are compared byte-for-byte: `A@x.com` and `a@x.com` are
/// different entries.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, HashRecord>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn put(&self, identifier: &str, record: HashRecord) {
        self.records.write().insert(identifier.to_string(), record);
    }

    fn get(&self, identifier: &str) -> Option<HashRecord> {
        self.records.read().get(identifier).cloned()
    }

    fn len(&self) -> usize {
        self.records.read().len()
    }
}
