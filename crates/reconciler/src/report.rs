//! Purge run summary

use contracts::PurgePolicy;

/// Outcome of one purge run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurgeReport {
    pub policy: PurgePolicy,
    /// Entries deleted across both groups
    pub deleted: usize,
}

impl PurgeReport {
    pub fn new(policy: PurgePolicy) -> Self {
        Self { policy, deleted: 0 }
    }
}
