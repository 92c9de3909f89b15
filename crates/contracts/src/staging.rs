//! StagingStore trait - fast set/hash store between ingestion and dispatch
//!
//! Each call is a single, independently failable operation; no atomicity is
//! offered across calls.

use std::collections::HashMap;

use crate::ContractError;

/// Set/hash store keyed by namespaced strings
#[trait_variant::make(StagingStore: Send)]
pub trait LocalStagingStore {
    /// Store name (used for logging/errors)
    fn name(&self) -> &str;

    /// Delete a key of any type; deleting a missing key succeeds
    async fn delete(&self, key: &str) -> Result<(), ContractError>;

    /// Add a member to the set stored at `key`
    async fn add_member(&self, key: &str, member: &str) -> Result<(), ContractError>;

    /// Members of the set stored at `key` (empty when missing)
    async fn members(&self, key: &str) -> Result<Vec<String>, ContractError>;

    /// Field map stored at `key` (empty when missing)
    async fn field_map(&self, key: &str) -> Result<HashMap<String, String>, ContractError>;

    /// Write/overwrite the given fields of the map stored at `key`
    async fn set_field_map(
        &self,
        key: &str,
        fields: &HashMap<String, String>,
    ) -> Result<(), ContractError>;

    /// Keys matching a glob pattern (`*`, `?`)
    async fn keys_matching(&self, pattern: &str) -> Result<Vec<String>, ContractError>;

    /// Release the underlying handle
    ///
    /// # Errors
    /// Any later call on a closed store fails with a store error.
    async fn close(&self) -> Result<(), ContractError>;
}
