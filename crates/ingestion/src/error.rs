//! Ingestion 错误类型

use contracts::ContractError;
use thiserror::Error;

/// Ingestion 错误
#[derive(Debug, Error)]
pub enum IngestionError {
    /// 载荷结构不合法 (未知字段 / 非字符串值 / JSON 语法错误)
    #[error("failed to decode payload for grid '{grid_id}': {message}")]
    Decode {
        /// 网格 ID
        grid_id: String,
        /// 错误消息
        message: String,
    },

    /// 网格 ID 不合法
    #[error("invalid grid id '{grid_id}': {message}")]
    InvalidGrid {
        /// 网格 ID
        grid_id: String,
        /// 错误消息
        message: String,
    },

    /// 单个节点上报不合法
    #[error("invalid report #{index} for grid '{grid_id}': {message}")]
    InvalidReport {
        /// 网格 ID
        grid_id: String,
        /// 上报在载荷中的位置
        index: usize,
        /// 错误消息
        message: String,
    },

    /// staging 存储失败 (原样透传)
    #[error(transparent)]
    Contract(#[from] ContractError),
}

/// Ingestion Result 类型别名
pub type Result<T> = std::result::Result<T, IngestionError>;
