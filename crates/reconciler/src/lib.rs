//! # Reconciler
//!
//! 清理已暂存的数据，独立于分发运行。
//!
//! 两种清理策略：
//! - `TransientPurge`: 删除 staging 存储中所有 sensor / grid 键
//! - `DurableBucketPurge`: 逐条删除持久存储 `Sensors`、`Grids` 桶中的记录
//!
//! 删除目标在每次调用时重新枚举。每组在首个删除失败时中止，
//! 已删除部分不回滚；另一组仍会尝试，返回首个错误。

mod durable;
mod report;
mod transient;

pub use contracts::PurgePolicy;
pub use durable::DurableBucketPurge;
pub use report::PurgeReport;
pub use transient::TransientPurge;

use contracts::ContractError;

/// A purge policy bound to its target store
#[trait_variant::make(Reconciler: Send)]
pub trait LocalReconciler {
    /// Policy implemented
    fn policy(&self) -> PurgePolicy;

    /// Delete every staged entry the policy targets
    async fn purge(&self) -> Result<PurgeReport, ContractError>;
}
