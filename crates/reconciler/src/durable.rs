//! DurableBucketPurge - clears the Sensors and Grids buckets entry by entry

use contracts::{ContractError, DurableStore, PurgePolicy, GRIDS_BUCKET, SENSORS_BUCKET};
use observability::metrics::record_purge;
use tracing::{debug, error, info, instrument};

use crate::report::PurgeReport;
use crate::Reconciler;

/// Buckets purged, in order
const PURGED_BUCKETS: [&str; 2] = [SENSORS_BUCKET, GRIDS_BUCKET];

/// Deletes every entry of `Sensors`, then of `Grids`
///
/// A failed delete aborts the rest of its bucket and leaves the bucket
/// partially purged; the next bucket is still attempted.
pub struct DurableBucketPurge<'a, D> {
    store: &'a D,
}

impl<'a, D> DurableBucketPurge<'a, D>
where
    D: DurableStore,
{
    pub fn new(store: &'a D) -> Self {
        Self { store }
    }

    fn purge_bucket(&self, bucket: &str, report: &mut PurgeReport) -> Result<(), ContractError> {
        let mut deleted = 0;
        let result = self.store.iterate(bucket, &mut |key, _| {
            self.store.delete(bucket, key).inspect_err(|e| {
                error!(bucket, key, error = %e, "Entry delete failed, bucket aborted");
            })?;
            deleted += 1;
            Ok(())
        });

        report.deleted += deleted;
        debug!(bucket, deleted, ok = result.is_ok(), "Bucket visited");
        result
    }
}

impl<D> Reconciler for DurableBucketPurge<'_, D>
where
    D: DurableStore,
{
    fn policy(&self) -> PurgePolicy {
        PurgePolicy::DurableBuckets
    }

    #[instrument(name = "durable_bucket_purge", skip(self), fields(store = %self.store.name()))]
    async fn purge(&self) -> Result<PurgeReport, ContractError> {
        let mut report = PurgeReport::new(self.policy());
        let mut first_error = None;
        for bucket in PURGED_BUCKETS {
            if let Err(e) = self.purge_bucket(bucket, &mut report) {
                first_error.get_or_insert(e);
            }
        }
        record_purge(report.policy, report.deleted, first_error.is_none());

        match first_error {
            None => {
                info!(deleted = report.deleted, "Durable buckets purged");
                Ok(report)
            }
            Some(e) => Err(e),
        }
    }
}
