//! Relay 指标收集模块
//!
//! 写入路径、批量分发、凭证刷新与清理的运行指标。

use contracts::PurgePolicy;
use metrics::{counter, gauge, histogram};

fn status_label(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "failure"
    }
}

/// 记录一次网格写入
pub fn record_grid_ingested(readings: usize) {
    counter!("grid_relay_grids_ingested_total").increment(1);
    counter!("grid_relay_readings_staged_total").increment(readings as u64);
}

/// 记录一次写入失败 (网格处于部分替换状态)
pub fn record_ingest_failure() {
    counter!("grid_relay_ingest_failures_total").increment(1);
}

/// 记录一次出站请求
///
/// `grids` 为本次请求携带的网格数。
pub fn record_batch_flush(grids: usize, success: bool) {
    counter!(
        "grid_relay_requests_total",
        "status" => status_label(success)
    )
    .increment(1);
    histogram!("grid_relay_request_grids").record(grids as f64);
}

/// 记录一次分发运行的结果
pub fn record_dispatch_run(grids_sent: usize, readings_sent: usize, orphans: usize, success: bool) {
    counter!(
        "grid_relay_dispatch_runs_total",
        "status" => status_label(success)
    )
    .increment(1);
    counter!("grid_relay_grids_dispatched_total").increment(grids_sent as u64);
    counter!("grid_relay_readings_dispatched_total").increment(readings_sent as u64);
    if orphans > 0 {
        counter!("grid_relay_orphan_members_total").increment(orphans as u64);
    }
    gauge!("grid_relay_last_dispatch_grids").set(grids_sent as f64);
}

/// 记录凭证刷新
pub fn record_credential_refresh(success: bool) {
    counter!(
        "grid_relay_credential_refresh_total",
        "status" => status_label(success)
    )
    .increment(1);
}

/// 记录清理结果
pub fn record_purge(policy: PurgePolicy, deleted: usize, success: bool) {
    let policy = policy.to_string();
    counter!("grid_relay_purged_entries_total", "policy" => policy.clone())
        .increment(deleted as u64);
    if !success {
        counter!("grid_relay_purge_failures_total", "policy" => policy).increment(1);
    }
}
