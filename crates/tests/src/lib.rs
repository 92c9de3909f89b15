//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 配置 → 写入 → 分发 → 清理 的完整链路
//! - 批量分块、凭证与部分失败场景
//! - 故障注入下的部分状态

#[cfg(test)]
mod faults;

#[cfg(test)]
mod support {
    use contracts::{GridPayload, KeyScheme, NodeReport};
    use dispatcher::{BatchDispatcher, CredentialCache, MockRemote};
    use durable_store::RedbStore;
    use ingestion::Ingestor;
    use staging::MemoryStagingStore;

    pub fn payload(pairs: &[(&str, &str)]) -> GridPayload {
        GridPayload {
            data: pairs
                .iter()
                .map(|(node_id, value)| NodeReport {
                    node_id: node_id.to_string(),
                    value: value.to_string(),
                })
                .collect(),
        }
    }

    pub fn open_durable() -> (tempfile::TempDir, RedbStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbStore::open(dir.path().join("relay.redb")).unwrap();
        (dir, store)
    }

    pub async fn stage_grids(store: &MemoryStagingStore, grids: &[&str]) {
        let ingestor = Ingestor::new(store, KeyScheme::default());
        for (i, grid_id) in grids.iter().enumerate() {
            let node = format!("{grid_id}-n{i}");
            ingestor
                .ingest(grid_id, &payload(&[(node.as_str(), "1")]))
                .await
                .unwrap();
        }
    }

    pub async fn refresh(durable: &RedbStore, remote: &MockRemote) {
        CredentialCache::new(durable).refresh(remote).await.unwrap();
    }

    pub fn dispatcher<'a>(
        staging: &'a MemoryStagingStore,
        durable: &'a RedbStore,
        remote: &'a MockRemote,
        frequency: i64,
    ) -> BatchDispatcher<'a, MemoryStagingStore, RedbStore, MockRemote> {
        BatchDispatcher::new(
            staging,
            CredentialCache::new(durable),
            remote,
            KeyScheme::default(),
        )
        .with_frequency(frequency)
    }
}

#[cfg(test)]
mod e2e_tests {
    use super::support::*;
    use contracts::{ContractError, KeyScheme, StagingStore};
    use dispatcher::{DispatcherError, MockRemote};
    use ingestion::Ingestor;
    use reconciler::{Reconciler, TransientPurge};
    use staging::MemoryStagingStore;

    #[tokio::test]
    async fn test_ingest_then_dispatch_single_grid() {
        let staging = MemoryStagingStore::default();
        let (_dir, durable) = open_durable();
        let remote = MockRemote::new().with_credential_key("k1");
        refresh(&durable, &remote).await;

        Ingestor::new(&staging, KeyScheme::default())
            .ingest("site-1", &payload(&[("A", "10"), ("B", "20")]))
            .await
            .unwrap();

        let report = dispatcher(&staging, &durable, &remote, 5)
            .run()
            .await
            .unwrap();
        assert_eq!(report.requests, 1);

        let pushes = remote.pushes();
        assert_eq!(pushes.len(), 1);
        assert_eq!(pushes[0].token, "k1");
        assert_eq!(pushes[0].batches.len(), 1);

        let batch = &pushes[0].batches[0];
        assert_eq!(batch.client_id, "site-1");
        assert_eq!(batch.readings.len(), 2);
        assert_eq!(batch.readings[0].node_id, "A");
        assert_eq!(batch.readings[0].value, "10");
        assert_eq!(batch.readings[1].node_id, "B");
        assert_eq!(batch.readings[1].value, "20");
        assert!(batch.readings.iter().all(|r| !r.observed_at.is_empty()));
    }

    #[tokio::test]
    async fn test_three_grids_in_chunks_of_two() {
        let staging = MemoryStagingStore::default();
        let (_dir, durable) = open_durable();
        let remote = MockRemote::new();
        refresh(&durable, &remote).await;
        stage_grids(&staging, &["g1", "g2", "g3"]).await;

        let report = dispatcher(&staging, &durable, &remote, 2)
            .run()
            .await
            .unwrap();

        let sizes: Vec<_> = remote.pushes().iter().map(|p| p.batches.len()).collect();
        assert_eq!(sizes, vec![2, 1]);
        assert_eq!(report.grids_sent, 3);
        assert!(sizes.iter().all(|n| *n <= 2));
    }

    #[tokio::test]
    async fn test_first_flush_failure_leaves_third_grid_unsent() {
        let staging = MemoryStagingStore::default();
        let (_dir, durable) = open_durable();
        let remote = MockRemote::new().failing_on_push(1);
        refresh(&durable, &remote).await;
        stage_grids(&staging, &["g1", "g2", "g3"]).await;

        let err = dispatcher(&staging, &durable, &remote, 2)
            .run()
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DispatcherError::Contract(ContractError::Transport { .. })
        ));
        assert_eq!(remote.push_attempts(), 1);
        assert!(remote.pushes().is_empty());
        assert_eq!(staging.members("grid:g3").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_zero_and_negative_frequency_single_call() {
        for frequency in [0, -1] {
            let staging = MemoryStagingStore::default();
            let (_dir, durable) = open_durable();
            let remote = MockRemote::new();
            refresh(&durable, &remote).await;
            stage_grids(&staging, &["g1", "g2", "g3", "g4"]).await;

            dispatcher(&staging, &durable, &remote, frequency)
                .run()
                .await
                .unwrap();
            let pushes = remote.pushes();
            assert_eq!(pushes.len(), 1);
            assert_eq!(pushes[0].batches.len(), 4);
        }
    }

    #[tokio::test]
    async fn test_dispatch_without_refresh_is_unauthorized() {
        let staging = MemoryStagingStore::default();
        let (_dir, durable) = open_durable();
        let remote = MockRemote::new();
        stage_grids(&staging, &["g1"]).await;

        let err = dispatcher(&staging, &durable, &remote, 5)
            .run()
            .await
            .unwrap_err();
        assert!(err.is_authorization());
        assert_eq!(remote.push_attempts(), 0);

        // an explicit refresh makes the next run succeed
        refresh(&durable, &remote).await;
        dispatcher(&staging, &durable, &remote, 5)
            .run()
            .await
            .unwrap();
        assert_eq!(remote.pushes()[0].token, "mock-key");
    }

    #[tokio::test]
    async fn test_resubmission_membership_matches_payload() {
        let staging = MemoryStagingStore::default();
        let ingestor = Ingestor::new(&staging, KeyScheme::default());

        ingestor
            .ingest("site-1", &payload(&[("A", "1"), ("B", "2"), ("C", "3")]))
            .await
            .unwrap();
        ingestor
            .ingest("site-1", &payload(&[("C", "4"), ("D", "5")]))
            .await
            .unwrap();

        assert_eq!(
            staging.members("grid:site-1").await.unwrap(),
            vec!["C", "D"]
        );
    }

    #[tokio::test]
    async fn test_reading_round_trip() {
        let staging = MemoryStagingStore::default();
        Ingestor::new(&staging, KeyScheme::default())
            .ingest_json("site-1", r#"{"data":[{"node_id":"T1","value":"21.5"}]}"#)
            .await
            .unwrap();

        let fields = staging.field_map("sensor:T1").await.unwrap();
        assert_eq!(fields["value"], "21.5");
        assert!(!fields["date"].is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_then_clean_then_nothing_left() {
        let staging = MemoryStagingStore::default();
        let (_dir, durable) = open_durable();
        let remote = MockRemote::new();
        refresh(&durable, &remote).await;
        stage_grids(&staging, &["g1", "g2"]).await;

        dispatcher(&staging, &durable, &remote, 10)
            .run()
            .await
            .unwrap();
        // dispatch does not purge
        assert_eq!(staging.keys_matching("grid:*").await.unwrap().len(), 2);

        let purge = TransientPurge::new(&staging, KeyScheme::default());
        assert_eq!(purge.purge().await.unwrap().deleted, 4);
        assert_eq!(purge.purge().await.unwrap().deleted, 0);

        let report = dispatcher(&staging, &durable, &remote, 10)
            .run()
            .await
            .unwrap();
        assert_eq!(report.requests, 0);
        assert_eq!(remote.push_attempts(), 1);
    }
}

#[cfg(test)]
mod fault_tests {
    use super::faults::{FaultyStaging, Op};
    use super::support::*;
    use contracts::{ContractError, KeyScheme, Reading, StagingStore};
    use dispatcher::{BatchDispatcher, CredentialCache, DispatcherError, MockRemote};
    use ingestion::{IngestionError, Ingestor};
    use reconciler::{Reconciler, TransientPurge};

    #[tokio::test]
    async fn test_ingest_failure_leaves_partial_grid() {
        let staging = FaultyStaging::new(Op::SetFieldMap, 2);
        let ingestor = Ingestor::new(&staging, KeyScheme::default());

        let err = ingestor
            .ingest("site-1", &payload(&[("A", "1"), ("B", "2"), ("C", "3")]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            IngestionError::Contract(ContractError::Store { .. })
        ));

        // membership cleared, A fully written, B member without reading
        assert_eq!(
            staging.inner.members("grid:site-1").await.unwrap(),
            vec!["A", "B"]
        );
        assert!(staging.inner.field_map("sensor:B").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_partial_grid_dispatch_sends_orphan_blank() {
        let staging = FaultyStaging::new(Op::SetFieldMap, 2);
        let _ = Ingestor::new(&staging, KeyScheme::default())
            .ingest("site-1", &payload(&[("A", "1"), ("B", "2")]))
            .await;

        let (_dir, durable) = open_durable();
        let remote = MockRemote::new();
        refresh(&durable, &remote).await;

        let report = BatchDispatcher::new(
            &staging,
            CredentialCache::new(&durable),
            &remote,
            KeyScheme::default(),
        )
        .run()
        .await
        .unwrap();
        assert_eq!(report.orphan_members, 1);
        assert_eq!(report.readings_sent, 2);
        assert!(remote.pushes()[0].batches[0]
            .readings
            .contains(&Reading::new("B", "", "")));
    }

    #[tokio::test]
    async fn test_read_failure_after_first_flush() {
        let staging = FaultyStaging::new(Op::FieldMap, 2);
        let ingestor = Ingestor::new(&staging, KeyScheme::default());
        for grid in ["g1", "g2", "g3"] {
            ingestor
                .ingest(grid, &payload(&[(grid, "1")]))
                .await
                .unwrap();
        }

        let (_dir, durable) = open_durable();
        let remote = MockRemote::new();
        refresh(&durable, &remote).await;

        let err = BatchDispatcher::new(
            &staging,
            CredentialCache::new(&durable),
            &remote,
            KeyScheme::default(),
        )
        .with_frequency(1)
        .run()
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            DispatcherError::Contract(ContractError::Store { .. })
        ));
        // g1 went out before the failure and is not rolled back
        let pushes = remote.pushes();
        assert_eq!(pushes.len(), 1);
        assert_eq!(pushes[0].batches[0].client_id, "g1");
    }

    #[tokio::test]
    async fn test_purge_sensor_failure_still_purges_grids() {
        // delete #1 is the ingest's membership reset, #2 the first purge delete
        let staging = FaultyStaging::new(Op::Delete, 2);
        stage(&staging).await;

        let err = TransientPurge::new(&staging, KeyScheme::default())
            .purge()
            .await
            .unwrap_err();
        assert!(matches!(err, ContractError::Store { .. }));

        // sensors group aborted on its first key, grids group completed
        assert_eq!(staging.inner.keys_matching("sensor:*").await.unwrap().len(), 2);
        assert!(staging.inner.keys_matching("grid:*").await.unwrap().is_empty());

        // the next run finishes the job
        let report = TransientPurge::new(&staging, KeyScheme::default())
            .purge()
            .await
            .unwrap();
        assert_eq!(report.deleted, 2);
    }

    async fn stage(staging: &FaultyStaging) {
        let ingestor = Ingestor::new(staging, KeyScheme::default());
        ingestor
            .ingest("g1", &payload(&[("A", "1"), ("B", "2")]))
            .await
            .unwrap();
    }
}

#[cfg(test)]
mod config_tests {
    use super::support::*;
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{PurgePolicy, StagingStore};
    use dispatcher::{BatchDispatcher, CredentialCache, MockRemote};
    use ingestion::Ingestor;
    use reconciler::{Reconciler, TransientPurge};
    use staging::MemoryStagingStore;

    const CONFIG: &str = r#"
[remote]
host = "https://collector.example.org/"

[staging]
grid_prefix = "site"
sensor_prefix = "node"

[dispatch]
frequency = 1

[cleanup]
policy = "transient"
"#;

    #[tokio::test]
    async fn test_configured_prefixes_and_frequency_drive_the_pipeline() {
        let config = ConfigLoader::load_from_str(CONFIG, ConfigFormat::Toml).unwrap();
        assert_eq!(config.cleanup.policy, PurgePolicy::Transient);
        let keys = config.staging.keys.clone();

        let staging = MemoryStagingStore::default();
        let ingestor = Ingestor::new(&staging, keys.clone());
        ingestor.ingest("s1", &payload(&[("A", "1")])).await.unwrap();
        ingestor.ingest("s2", &payload(&[("B", "2")])).await.unwrap();
        assert_eq!(staging.members("site:s1").await.unwrap(), vec!["A"]);
        assert_eq!(staging.field_map("node:B").await.unwrap()["value"], "2");

        let (_dir, durable) = open_durable();
        let remote = MockRemote::new();
        refresh(&durable, &remote).await;

        let report = BatchDispatcher::new(
            &staging,
            CredentialCache::new(&durable),
            &remote,
            keys.clone(),
        )
        .with_frequency(config.dispatch.frequency)
        .run()
        .await
        .unwrap();
        assert_eq!(report.requests, 2);
        let clients: Vec<_> = remote
            .pushes()
            .iter()
            .map(|p| p.batches[0].client_id.clone())
            .collect();
        assert_eq!(clients, vec!["s1", "s2"]);

        let purged = TransientPurge::new(&staging, keys).purge().await.unwrap();
        assert_eq!(purged.deleted, 4);
        assert!(staging.is_empty().await);
    }
}
