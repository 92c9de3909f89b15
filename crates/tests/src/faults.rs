//! 故障注入的 staging 存储
//!
//! 包装 `MemoryStagingStore`，在指定操作的第 n 次调用时返回存储错误。

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use contracts::{ContractError, StagingStore};
use staging::MemoryStagingStore;

/// 可注入故障的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Delete,
    AddMember,
    Members,
    FieldMap,
    SetFieldMap,
}

pub struct FaultyStaging {
    pub inner: MemoryStagingStore,
    op: Op,
    /// 第几次调用失败 (从 1 开始)
    fail_at: usize,
    calls: AtomicUsize,
}

impl FaultyStaging {
    pub fn new(op: Op, fail_at: usize) -> Self {
        Self {
            inner: MemoryStagingStore::new("faulty"),
            op,
            fail_at,
            calls: AtomicUsize::new(0),
        }
    }

    fn check(&self, op: Op, key: &str) -> Result<(), ContractError> {
        if op != self.op {
            return Ok(());
        }
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_at {
            return Err(ContractError::store(
                "faulty",
                format!("injected {op:?} failure on '{key}'"),
            ));
        }
        Ok(())
    }
}

impl StagingStore for FaultyStaging {
    fn name(&self) -> &str {
        "faulty"
    }

    async fn delete(&self, key: &str) -> Result<(), ContractError> {
        self.check(Op::Delete, key)?;
        self.inner.delete(key).await
    }

    async fn add_member(&self, key: &str, member: &str) -> Result<(), ContractError> {
        self.check(Op::AddMember, key)?;
        self.inner.add_member(key, member).await
    }

    async fn members(&self, key: &str) -> Result<Vec<String>, ContractError> {
        self.check(Op::Members, key)?;
        self.inner.members(key).await
    }

    async fn field_map(&self, key: &str) -> Result<HashMap<String, String>, ContractError> {
        self.check(Op::FieldMap, key)?;
        self.inner.field_map(key).await
    }

    async fn set_field_map(
        &self,
        key: &str,
        fields: &HashMap<String, String>,
    ) -> Result<(), ContractError> {
        self.check(Op::SetFieldMap, key)?;
        self.inner.set_field_map(key, fields).await
    }

    async fn keys_matching(&self, pattern: &str) -> Result<Vec<String>, ContractError> {
        self.inner.keys_matching(pattern).await
    }

    async fn close(&self) -> Result<(), ContractError> {
        self.inner.close().await
    }
}
