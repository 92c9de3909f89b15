//! MemoryStagingStore - in-process staging store
//!
//! Sets and hashes live in ordered maps, so enumeration order is sorted and
//! stable. This is the backend used by tests and by embedders that run
//! ingestion and dispatch in the same process.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use contracts::{ContractError, StagingStore};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::pattern::glob_match;

#[derive(Debug, Clone)]
enum Entry {
    Set(BTreeSet<String>),
    Hash(BTreeMap<String, String>),
}

#[derive(Debug, Default)]
struct Inner {
    entries: BTreeMap<String, Entry>,
    closed: bool,
}

/// In-process staging store
#[derive(Debug)]
pub struct MemoryStagingStore {
    name: String,
    inner: Mutex<Inner>,
}

impl Default for MemoryStagingStore {
    fn default() -> Self {
        Self::new("memory")
    }
}

impl MemoryStagingStore {
    /// Create an empty store
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Number of keys currently held
    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    /// Whether the store holds no keys
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn wrong_type(&self, key: &str) -> ContractError {
        ContractError::store(
            &self.name,
            format!("WRONGTYPE operation against key '{key}' holding the wrong kind of value"),
        )
    }

    fn ensure_open(&self, inner: &Inner) -> Result<(), ContractError> {
        if inner.closed {
            return Err(ContractError::store(&self.name, "store is closed"));
        }
        Ok(())
    }
}

impl StagingStore for MemoryStagingStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn delete(&self, key: &str) -> Result<(), ContractError> {
        let mut inner = self.inner.lock().await;
        self.ensure_open(&inner)?;
        inner.entries.remove(key);
        Ok(())
    }

    async fn add_member(&self, key: &str, member: &str) -> Result<(), ContractError> {
        let mut inner = self.inner.lock().await;
        self.ensure_open(&inner)?;
        let entry = inner
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::Set(BTreeSet::new()));
        match entry {
            Entry::Set(members) => {
                members.insert(member.to_string());
                Ok(())
            }
            Entry::Hash(_) => Err(self.wrong_type(key)),
        }
    }

    async fn members(&self, key: &str) -> Result<Vec<String>, ContractError> {
        let inner = self.inner.lock().await;
        self.ensure_open(&inner)?;
        match inner.entries.get(key) {
            None => Ok(Vec::new()),
            Some(Entry::Set(members)) => Ok(members.iter().cloned().collect()),
            Some(Entry::Hash(_)) => Err(self.wrong_type(key)),
        }
    }

    async fn field_map(&self, key: &str) -> Result<HashMap<String, String>, ContractError> {
        let inner = self.inner.lock().await;
        self.ensure_open(&inner)?;
        match inner.entries.get(key) {
            None => Ok(HashMap::new()),
            Some(Entry::Hash(fields)) => Ok(fields
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()),
            Some(Entry::Set(_)) => Err(self.wrong_type(key)),
        }
    }

    async fn set_field_map(
        &self,
        key: &str,
        fields: &HashMap<String, String>,
    ) -> Result<(), ContractError> {
        let mut inner = self.inner.lock().await;
        self.ensure_open(&inner)?;
        let entry = inner
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::Hash(BTreeMap::new()));
        match entry {
            Entry::Hash(existing) => {
                existing.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
                Ok(())
            }
            Entry::Set(_) => Err(self.wrong_type(key)),
        }
    }

    async fn keys_matching(&self, pattern: &str) -> Result<Vec<String>, ContractError> {
        let inner = self.inner.lock().await;
        self.ensure_open(&inner)?;
        Ok(inner
            .entries
            .keys()
            .filter(|key| glob_match(pattern, key))
            .cloned()
            .collect())
    }

    #[instrument(name = "memory_staging_close", skip(self), fields(store = %self.name))]
    async fn close(&self) -> Result<(), ContractError> {
        let mut inner = self.inner.lock().await;
        inner.closed = true;
        debug!(keys = inner.entries.len(), "MemoryStagingStore closed");
        Ok(())
    }
}
