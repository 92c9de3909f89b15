//! Ingestor - staged write path for one grid submission

use chrono::{DateTime, SecondsFormat, Utc};
use contracts::{GridPayload, KeyScheme, Reading, StagingStore, KEY_SEPARATOR};
use observability::metrics::{record_grid_ingested, record_ingest_failure};
use tracing::{debug, info, instrument, warn};

use crate::error::{IngestionError, Result};

/// Outcome of one grid submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    /// Grid that was replaced
    pub grid_id: String,
    /// Readings written
    pub nodes_written: usize,
}

/// Writes grid submissions into the staging store
///
/// A submission fully replaces the grid's previous membership. Writes are
/// independent store calls: if one fails, the grid is left partially
/// replaced and the error is returned as is.
pub struct Ingestor<'a, S> {
    store: &'a S,
    keys: KeyScheme,
    clock: fn() -> DateTime<Utc>,
}

impl<'a, S> Ingestor<'a, S>
where
    S: StagingStore + Sync,
{
    /// Create an ingestor over `store`
    pub fn new(store: &'a S, keys: KeyScheme) -> Self {
        Self {
            store,
            keys,
            clock: Utc::now,
        }
    }

    /// Replace the clock used to stamp readings
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Decode and ingest a raw JSON submission
    pub async fn ingest_json(&self, grid_id: &str, raw: &str) -> Result<IngestReport> {
        let payload = decode_payload(grid_id, raw)?;
        self.ingest(grid_id, &payload).await
    }

    /// Replace the staged state of `grid_id` with `payload`
    #[instrument(
        name = "ingestor_ingest",
        skip(self, payload),
        fields(store = %self.store.name(), nodes = payload.data.len())
    )]
    pub async fn ingest(&self, grid_id: &str, payload: &GridPayload) -> Result<IngestReport> {
        validate(grid_id, payload)?;

        match self.write(grid_id, payload).await {
            Ok(nodes_written) => {
                record_grid_ingested(nodes_written);
                info!(grid_id, nodes = nodes_written, "Grid staged");
                Ok(IngestReport {
                    grid_id: grid_id.to_string(),
                    nodes_written,
                })
            }
            Err(e) => {
                record_ingest_failure();
                warn!(grid_id, error = %e, "Grid left partially replaced");
                Err(e.into())
            }
        }
    }

    async fn write(
        &self,
        grid_id: &str,
        payload: &GridPayload,
    ) -> std::result::Result<usize, contracts::ContractError> {
        let grid_key = self.keys.grid_key(grid_id);

        // Drop stale membership from the previous submission
        self.store.delete(&grid_key).await?;

        let observed_at = (self.clock)().to_rfc3339_opts(SecondsFormat::Millis, true);
        let mut written = 0;
        for report in &payload.data {
            self.store.add_member(&grid_key, &report.node_id).await?;

            let reading = Reading::new(&report.node_id, &report.value, &observed_at);
            self.store
                .set_field_map(&self.keys.sensor_key(&report.node_id), &reading.to_fields())
                .await?;
            written += 1;

            debug!(grid_id, node_id = %report.node_id, "Reading staged");
        }
        Ok(written)
    }
}

/// Decode a raw JSON submission
///
/// # Errors
/// [`IngestionError::Decode`] for malformed JSON, unknown fields or
/// non-string values.
pub fn decode_payload(grid_id: &str, raw: &str) -> Result<GridPayload> {
    serde_json::from_str(raw).map_err(|e| IngestionError::Decode {
        grid_id: grid_id.to_string(),
        message: e.to_string(),
    })
}

/// Decode an already-parsed JSON submission
pub fn decode_payload_value(grid_id: &str, value: serde_json::Value) -> Result<GridPayload> {
    serde_json::from_value(value).map_err(|e| IngestionError::Decode {
        grid_id: grid_id.to_string(),
        message: e.to_string(),
    })
}

fn validate(grid_id: &str, payload: &GridPayload) -> Result<()> {
    if grid_id.trim().is_empty() {
        return Err(IngestionError::InvalidGrid {
            grid_id: grid_id.to_string(),
            message: "grid id cannot be empty".into(),
        });
    }
    if grid_id.contains(KEY_SEPARATOR) {
        return Err(IngestionError::InvalidGrid {
            grid_id: grid_id.to_string(),
            message: format!("grid id cannot contain '{KEY_SEPARATOR}'"),
        });
    }
    for (index, report) in payload.data.iter().enumerate() {
        if report.node_id.trim().is_empty() {
            return Err(IngestionError::InvalidReport {
                grid_id: grid_id.to_string(),
                index,
                message: "node id cannot be empty".into(),
            });
        }
    }
    Ok(())
}
