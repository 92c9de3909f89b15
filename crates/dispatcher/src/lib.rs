//! # Dispatcher
//!
//! 批量分发模块。
//!
//! 负责：
//! - 枚举 staging 中的网格并组装 `Batch`
//! - 按频率 F 分块发送到远端采集服务
//! - 凭证缓存 (刷新 / 读取)，发送前不自动刷新
//!
//! ## 使用示例
//!
//! ```ignore
//! use dispatcher::{BatchDispatcher, CredentialCache, HttpRemote};
//!
//! let remote = HttpRemote::from_config(&config.remote)?;
//! let credentials = CredentialCache::new(&durable);
//! credentials.refresh(&remote).await?;
//!
//! let report = BatchDispatcher::new(&staging, credentials, &remote, config.staging.keys.clone())
//!     .with_frequency(config.dispatch.frequency)
//!     .run()
//!     .await?;
//! ```

pub mod credentials;
pub mod dispatcher;
pub mod error;
pub mod mock;
pub mod remote;
pub mod report;

pub use contracts::{Batch, Credential, PushAck, RemoteEndpoint};
pub use credentials::CredentialCache;
pub use dispatcher::BatchDispatcher;
pub use error::{DispatcherError, Result};
pub use mock::{MockRemote, RecordedPush};
pub use remote::HttpRemote;
pub use report::DispatchReport;
