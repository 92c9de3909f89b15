//! DurableStore trait - persistent bucketed key-value records

use crate::ContractError;

/// Bucket holding relay configuration records (credential)
pub const CONFIG_BUCKET: &str = "Config";

/// Bucket holding archived sensor records
pub const SENSORS_BUCKET: &str = "Sensors";

/// Bucket holding archived grid records
pub const GRIDS_BUCKET: &str = "Grids";

/// Key of the credential record inside [`CONFIG_BUCKET`]
pub const CREDENTIAL_KEY: &str = "identifier";

/// Buckets created when a durable store is opened
pub const DEFAULT_BUCKETS: [&str; 3] = [CONFIG_BUCKET, SENSORS_BUCKET, GRIDS_BUCKET];

/// Visitor invoked once per entry by [`DurableStore::iterate`]
pub type EntryVisitor<'a> = dyn FnMut(&str, &str) -> Result<(), ContractError> + 'a;

/// Persistent local storage surviving process restarts
pub trait DurableStore: Send + Sync {
    /// Store name (used for logging/errors)
    fn name(&self) -> &str;

    /// Insert or replace `key` in `bucket`
    fn put(&self, bucket: &str, key: &str, value: &str) -> Result<(), ContractError>;

    /// Read `key` from `bucket`
    fn get(&self, bucket: &str, key: &str) -> Result<Option<String>, ContractError>;

    /// Remove `key` from `bucket`; removing a missing key succeeds
    fn delete(&self, bucket: &str, key: &str) -> Result<(), ContractError>;

    /// Visit every entry of `bucket` in key order
    ///
    /// Entries are snapshotted before the first visit, so the visitor may
    /// mutate the same bucket. The first visitor error stops the iteration
    /// and is returned.
    fn iterate(&self, bucket: &str, visitor: &mut EntryVisitor<'_>) -> Result<(), ContractError>;

    /// Keys currently in `bucket`
    fn keys(&self, bucket: &str) -> Result<Vec<String>, ContractError> {
        let mut keys = Vec::new();
        self.iterate(bucket, &mut |key, _| {
            keys.push(key.to_string());
            Ok(())
        })?;
        Ok(keys)
    }
}
