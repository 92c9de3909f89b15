//! TransientPurge - clears grid and sensor keys from the staging store

use contracts::{ContractError, KeyScheme, PurgePolicy, StagingStore};
use observability::metrics::record_purge;
use tracing::{debug, error, info, instrument};

use crate::report::PurgeReport;
use crate::Reconciler;

/// Deletes every `sensor:*` key, then every `grid:*` key
pub struct TransientPurge<'a, S> {
    store: &'a S,
    keys: KeyScheme,
}

impl<'a, S> TransientPurge<'a, S>
where
    S: StagingStore + Sync,
{
    pub fn new(store: &'a S, keys: KeyScheme) -> Self {
        Self { store, keys }
    }

    async fn purge_all(&self, report: &mut PurgeReport) -> Result<(), ContractError> {
        // both groups are enumerated before anything is deleted
        let sensor_keys = self.store.keys_matching(&self.keys.sensor_pattern()).await?;
        let grid_keys = self.store.keys_matching(&self.keys.grid_pattern()).await?;

        let sensors = self.delete_group("sensors", &sensor_keys, report).await;
        let grids = self.delete_group("grids", &grid_keys, report).await;
        sensors.and(grids)
    }

    async fn delete_group(
        &self,
        group: &str,
        keys: &[String],
        report: &mut PurgeReport,
    ) -> Result<(), ContractError> {
        for key in keys {
            if let Err(e) = self.store.delete(key).await {
                error!(group, key = %key, error = %e, "Delete failed, group aborted");
                return Err(e);
            }
            report.deleted += 1;
        }
        debug!(group, deleted = keys.len(), "Group purged");
        Ok(())
    }
}

impl<S> Reconciler for TransientPurge<'_, S>
where
    S: StagingStore + Sync,
{
    fn policy(&self) -> PurgePolicy {
        PurgePolicy::Transient
    }

    #[instrument(name = "transient_purge", skip(self), fields(store = %self.store.name()))]
    async fn purge(&self) -> Result<PurgeReport, ContractError> {
        let mut report = PurgeReport::new(self.policy());
        let result = self.purge_all(&mut report).await;
        record_purge(report.policy, report.deleted, result.is_ok());

        match result {
            Ok(()) => {
                info!(deleted = report.deleted, "Staging store purged");
                Ok(report)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Reading;
    use staging::MemoryStagingStore;

    async fn staged() -> MemoryStagingStore {
        let store = MemoryStagingStore::default();
        let keys = KeyScheme::default();
        for (grid, node) in [("g1", "A"), ("g1", "B"), ("g2", "C")] {
            store.add_member(&keys.grid_key(grid), node).await.unwrap();
            let reading = Reading::new(node, "1", "2024-05-01T12:00:00.000Z");
            store
                .set_field_map(&keys.sensor_key(node), &reading.to_fields())
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_purge_removes_grid_and_sensor_keys() {
        let store = staged().await;
        store.add_member("unrelated:x", "keep").await.unwrap();

        let report = TransientPurge::new(&store, KeyScheme::default())
            .purge()
            .await
            .unwrap();
        assert_eq!(report.deleted, 5);
        assert_eq!(report.policy, PurgePolicy::Transient);
        assert!(store.keys_matching("grid:*").await.unwrap().is_empty());
        assert!(store.keys_matching("sensor:*").await.unwrap().is_empty());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_second_purge_is_a_no_op() {
        let store = staged().await;
        let purge = TransientPurge::new(&store, KeyScheme::default());

        purge.purge().await.unwrap();
        let report = purge.purge().await.unwrap();
        assert_eq!(report.deleted, 0);
    }

    #[tokio::test]
    async fn test_enumerates_fresh_on_each_call() {
        let store = staged().await;
        let purge = TransientPurge::new(&store, KeyScheme::default());
        purge.purge().await.unwrap();

        store.add_member("grid:g9", "Z").await.unwrap();
        let report = purge.purge().await.unwrap();
        assert_eq!(report.deleted, 1);
    }

    #[tokio::test]
    async fn test_custom_prefixes() {
        let store = MemoryStagingStore::default();
        store.add_member("site:g1", "A").await.unwrap();
        store.add_member("grid:g1", "A").await.unwrap();

        let report = TransientPurge::new(&store, KeyScheme::new("site", "node"))
            .purge()
            .await
            .unwrap();
        assert_eq!(report.deleted, 1);
        assert_eq!(store.members("grid:g1").await.unwrap(), vec!["A"]);
    }

    #[tokio::test]
    async fn test_closed_store_fails() {
        let store = staged().await;
        store.close().await.unwrap();
        let err = TransientPurge::new(&store, KeyScheme::default())
            .purge()
            .await
            .unwrap_err();
        assert!(matches!(err, ContractError::Store { .. }));
    }
}
