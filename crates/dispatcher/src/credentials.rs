//! CredentialCache - bearer credential persisted in the durable store

use contracts::{
    ContractError, Credential, DurableStore, RemoteEndpoint, CONFIG_BUCKET, CREDENTIAL_KEY,
};
use observability::metrics::record_credential_refresh;
use tracing::{debug, info, instrument, warn};

use crate::error::Result;

/// Fetches the credential from the remote service and keeps it in
/// `Config/identifier` so it survives restarts
///
/// Refresh is explicit; reading never triggers a fetch.
pub struct CredentialCache<'a, D> {
    store: &'a D,
}

impl<D> Clone for CredentialCache<'_, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D> Copy for CredentialCache<'_, D> {}

impl<'a, D> CredentialCache<'a, D>
where
    D: DurableStore,
{
    pub fn new(store: &'a D) -> Self {
        Self { store }
    }

    /// Ask the remote service for a new credential and persist it
    ///
    /// # Errors
    /// Unauthorized when the reply carries no key; transport/store errors
    /// otherwise. The previously stored credential is kept on failure.
    #[instrument(
        name = "credential_cache_refresh",
        skip(self, remote),
        fields(endpoint = %remote.endpoint(), store = %self.store.name())
    )]
    pub async fn refresh<R>(&self, remote: &R) -> Result<Credential>
    where
        R: RemoteEndpoint + Sync,
    {
        let result = self.fetch_and_store(remote).await;
        record_credential_refresh(result.is_ok());
        match &result {
            Ok(_) => info!("Credential refreshed"),
            Err(e) => warn!(error = %e, "Credential refresh failed"),
        }
        result
    }

    async fn fetch_and_store<R>(&self, remote: &R) -> Result<Credential>
    where
        R: RemoteEndpoint + Sync,
    {
        let envelope = remote.fetch_credentials().await?;
        let key = envelope.key().ok_or_else(|| {
            ContractError::unauthorized(format!(
                "{} returned no credential key",
                remote.endpoint()
            ))
        })?;

        self.store.put(CONFIG_BUCKET, CREDENTIAL_KEY, key)?;
        Ok(Credential::new(key))
    }

    /// Read the persisted credential
    ///
    /// # Errors
    /// [`ContractError::CredentialMissing`] if no refresh ever succeeded.
    pub fn get(&self) -> Result<Credential> {
        let token = self
            .store
            .get(CONFIG_BUCKET, CREDENTIAL_KEY)?
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ContractError::CredentialMissing {
                bucket: CONFIG_BUCKET.to_string(),
                key: CREDENTIAL_KEY.to_string(),
            })?;
        debug!("Credential loaded");
        Ok(Credential::new(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DispatcherError;
    use crate::mock::MockRemote;
    use durable_store::RedbStore;

    fn open_temp() -> (tempfile::TempDir, RedbStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbStore::open(dir.path().join("relay.redb")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_get_before_refresh() {
        let (_dir, store) = open_temp();
        let err = CredentialCache::new(&store).get().unwrap_err();
        assert!(matches!(
            err,
            DispatcherError::Contract(ContractError::CredentialMissing { .. })
        ));
        assert!(err.is_authorization());
    }

    #[tokio::test]
    async fn test_refresh_persists_key() {
        let (_dir, store) = open_temp();
        let remote = MockRemote::new().with_credential_key("k-123");
        let cache = CredentialCache::new(&store);

        let credential = cache.refresh(&remote).await.unwrap();
        assert_eq!(credential.token, "k-123");
        assert_eq!(cache.get().unwrap().token, "k-123");
        assert_eq!(
            store.get(CONFIG_BUCKET, CREDENTIAL_KEY).unwrap().as_deref(),
            Some("k-123")
        );
        assert_eq!(remote.credential_calls(), 1);
    }

    #[tokio::test]
    async fn test_refresh_without_key_is_unauthorized() {
        let (_dir, store) = open_temp();
        store.put(CONFIG_BUCKET, CREDENTIAL_KEY, "old").unwrap();
        let remote = MockRemote::new().without_credential();
        let cache = CredentialCache::new(&store);

        let err = cache.refresh(&remote).await.unwrap_err();
        assert!(matches!(
            err,
            DispatcherError::Contract(ContractError::Unauthorized { .. })
        ));
        // previous credential untouched
        assert_eq!(cache.get().unwrap().token, "old");
    }

    #[tokio::test]
    async fn test_refresh_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.redb");
        {
            let store = RedbStore::open(&path).unwrap();
            let remote = MockRemote::new().with_credential_key("persisted");
            CredentialCache::new(&store).refresh(&remote).await.unwrap();
            store.close();
        }
        let store = RedbStore::open(&path).unwrap();
        assert_eq!(CredentialCache::new(&store).get().unwrap().token, "persisted");
    }
}
