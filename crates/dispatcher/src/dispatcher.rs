//! BatchDispatcher - drains staged grids to the collection service

use contracts::{
    Batch, ContractError, DispatchConfig, DurableStore, KeyScheme, Reading, RemoteEndpoint,
    StagingStore,
};
use observability::metrics::{record_batch_flush, record_dispatch_run};
use tracing::{debug, info, instrument, warn};

use crate::credentials::CredentialCache;
use crate::error::{DispatcherError, Result};
use crate::report::DispatchReport;

/// Sends every staged grid in requests of at most `frequency` batches
///
/// The run aborts on the first read or send failure. Batches already
/// acknowledged are not rolled back, grids not yet visited stay staged.
/// Staged data is never deleted here; purging belongs to the reconciler.
pub struct BatchDispatcher<'a, S, D, R> {
    store: &'a S,
    credentials: CredentialCache<'a, D>,
    remote: &'a R,
    keys: KeyScheme,
    chunk_size: Option<usize>,
}

impl<'a, S, D, R> BatchDispatcher<'a, S, D, R>
where
    S: StagingStore + Sync,
    D: DurableStore,
    R: RemoteEndpoint + Sync,
{
    /// Create a dispatcher that sends everything in a single request
    pub fn new(
        store: &'a S,
        credentials: CredentialCache<'a, D>,
        remote: &'a R,
        keys: KeyScheme,
    ) -> Self {
        Self {
            store,
            credentials,
            remote,
            keys,
            chunk_size: None,
        }
    }

    /// Set the batch frequency F; `F <= 0` disables chunking
    pub fn with_frequency(mut self, frequency: i64) -> Self {
        self.chunk_size = DispatchConfig { frequency }.chunk_size();
        self
    }

    /// Drain all currently staged grids
    #[instrument(
        name = "batch_dispatcher_run",
        skip(self),
        fields(
            store = %self.store.name(),
            endpoint = %self.remote.endpoint(),
            chunk_size = ?self.chunk_size
        )
    )]
    pub async fn run(&self) -> Result<DispatchReport> {
        let mut report = DispatchReport::default();
        let result = self.drain(&mut report).await;

        record_dispatch_run(
            report.grids_sent,
            report.readings_sent,
            report.orphan_members,
            result.is_ok(),
        );

        match result {
            Ok(()) => {
                info!(
                    grids = report.grids_sent,
                    requests = report.requests,
                    readings = report.readings_sent,
                    orphans = report.orphan_members,
                    "Dispatch run complete"
                );
                Ok(report)
            }
            Err(e) => {
                warn!(
                    grids_read = report.grids_read,
                    grids_sent = report.grids_sent,
                    requests = report.requests,
                    error = %e,
                    "Dispatch run aborted"
                );
                Err(e)
            }
        }
    }

    async fn drain(&self, report: &mut DispatchReport) -> Result<()> {
        let grid_keys = self.store.keys_matching(&self.keys.grid_pattern()).await?;
        debug!(grids = grid_keys.len(), "Staged grids enumerated");

        let mut buffer = Vec::with_capacity(self.chunk_size.unwrap_or(grid_keys.len()));
        for grid_key in &grid_keys {
            let batch = self.build_batch(grid_key, report).await?;
            report.grids_read += 1;
            buffer.push(batch);

            if self.chunk_size == Some(buffer.len()) {
                self.flush(&mut buffer, report).await?;
            }
        }

        if !buffer.is_empty() {
            self.flush(&mut buffer, report).await?;
        }
        Ok(())
    }

    async fn build_batch(&self, grid_key: &str, report: &mut DispatchReport) -> Result<Batch> {
        let mut batch = Batch::new(KeyScheme::client_id(grid_key));

        for node_id in self.store.members(grid_key).await? {
            let fields = self
                .store
                .field_map(&self.keys.sensor_key(&node_id))
                .await?;
            if fields.is_empty() {
                report.orphan_members += 1;
                warn!(grid_key, node_id = %node_id, "Member has no staged reading, sent blank");
            }
            batch.readings.push(Reading::from_fields(node_id, &fields));
        }

        Ok(batch)
    }

    async fn flush(&self, buffer: &mut Vec<Batch>, report: &mut DispatchReport) -> Result<()> {
        let credential = self.credentials.get().map_err(|e| match e {
            DispatcherError::Contract(ContractError::CredentialMissing { bucket, key }) => {
                ContractError::unauthorized(format!(
                    "no credential stored under {bucket}/{key}, refresh credentials first"
                ))
                .into()
            }
            other => other,
        })?;

        let result = self.remote.push_sensor_grids(&credential, buffer).await;
        let ack = match result {
            Ok(ack) if ack.is_ok() => ack,
            Ok(ack) => {
                record_batch_flush(buffer.len(), false);
                return Err(ContractError::Remote {
                    status: ack.status,
                    message: ack.error,
                }
                .into());
            }
            Err(e) => {
                record_batch_flush(buffer.len(), false);
                return Err(e.into());
            }
        };
        record_batch_flush(buffer.len(), true);
        debug!(status = ack.status, grids = buffer.len(), "Batch acknowledged");

        report.requests += 1;
        report.grids_sent += buffer.len();
        report.readings_sent += buffer.iter().map(|b| b.readings.len()).sum::<usize>();
        buffer.clear();
        Ok(())
    }
}
