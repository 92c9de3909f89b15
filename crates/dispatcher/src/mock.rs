//! Mock 远端采集服务
//!
//! 记录每次调用，可编排凭证、应答状态与第 n 次发送失败，用于无网络环境的测试。

use std::sync::{Mutex, MutexGuard};

use contracts::{
    Batch, ContractError, Credential, CredentialEnvelope, PushAck, RemoteEndpoint,
};
use tracing::debug;

/// 一次被记录的发送
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPush {
    /// 请求携带的凭证
    pub token: String,
    /// 请求体
    pub batches: Vec<Batch>,
}

#[derive(Debug, Default)]
struct MockState {
    credential_calls: usize,
    push_attempts: usize,
    pushes: Vec<RecordedPush>,
}

/// Mock 远端
pub struct MockRemote {
    endpoint: String,
    credential: CredentialEnvelope,
    ack: PushAck,
    /// 第 n 次 (从 1 开始) 发送返回传输错误
    fail_on_push: Option<usize>,
    state: Mutex<MockState>,
}

impl Default for MockRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRemote {
    /// 创建默认 Mock：授予凭证 `mock-key`，所有发送均成功
    pub fn new() -> Self {
        Self {
            endpoint: "mock://collector".to_string(),
            credential: CredentialEnvelope::granted("mock-key"),
            ack: PushAck::ok(),
            fail_on_push: None,
            state: Mutex::new(MockState::default()),
        }
    }

    /// 凭证端点返回 `key`
    pub fn with_credential_key(mut self, key: impl Into<String>) -> Self {
        self.credential = CredentialEnvelope::granted(key);
        self
    }

    /// 凭证端点返回 `{"data": null}`
    pub fn without_credential(mut self) -> Self {
        self.credential = CredentialEnvelope::default();
        self
    }

    /// 所有发送返回 `ack`
    pub fn with_ack(mut self, ack: PushAck) -> Self {
        self.ack = ack;
        self
    }

    /// 第 `n` 次发送 (从 1 开始) 返回传输错误
    pub fn failing_on_push(mut self, n: usize) -> Self {
        self.fail_on_push = Some(n);
        self
    }

    /// 凭证端点被调用次数
    pub fn credential_calls(&self) -> usize {
        self.state().credential_calls
    }

    /// 发送尝试次数 (包括失败)
    pub fn push_attempts(&self) -> usize {
        self.state().push_attempts
    }

    /// 已被接收的发送 (传输失败的不记录)
    pub fn pushes(&self) -> Vec<RecordedPush> {
        self.state().pushes.clone()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl RemoteEndpoint for MockRemote {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn fetch_credentials(&self) -> Result<CredentialEnvelope, ContractError> {
        self.state().credential_calls += 1;
        Ok(self.credential.clone())
    }

    async fn push_sensor_grids(
        &self,
        credential: &Credential,
        batches: &[Batch],
    ) -> Result<PushAck, ContractError> {
        let mut state = self.state();
        state.push_attempts += 1;
        if self.fail_on_push == Some(state.push_attempts) {
            debug!(attempt = state.push_attempts, "Mock push failing");
            return Err(ContractError::transport(
                &self.endpoint,
                "simulated connection reset",
            ));
        }

        state.pushes.push(RecordedPush {
            token: credential.token.clone(),
            batches: batches.to_vec(),
        });
        Ok(self.ack.clone())
    }
}
