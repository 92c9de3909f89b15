//! Dispatch run summary

/// Outcome of one dispatch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Grids turned into batches
    pub grids_read: usize,
    /// Grids acknowledged by the remote service
    pub grids_sent: usize,
    /// Outbound requests acknowledged
    pub requests: usize,
    /// Readings acknowledged
    pub readings_sent: usize,
    /// Members sent with a blank reading because none was staged
    pub orphan_members: usize,
}
