// ==========================================
// 温室预测排程核心 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换引擎/目录/配置错误为用户可读的错误消息
// 说明: 执行失败不是错误,以 ExecutionOutcome.success = false 返回
// ==========================================

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::engine::EngineError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 请求错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("未登记的作物类型: {0}")]
    UnknownCropType(String),

    // ==========================================
    // 作业状态错误
    // ==========================================
    #[error("作业状态冲突: {0}")]
    ActionStateConflict(String),

    #[error("作业执行失败: {0}")]
    ExecutionFailed(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 调用方稍后重试可能成功
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::ActionStateConflict(msg) if msg.contains("执行中"))
    }
}

// ==========================================
// 从 EngineError 转换
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidHorizon(_)
            | EngineError::MissingMetric(_)
            | EngineError::InvalidInput(_) => ApiError::InvalidInput(err.to_string()),
            EngineError::UnknownCropType(crop) => ApiError::UnknownCropType(crop),
            EngineError::ActionNotFound(id) => ApiError::NotFound(format!("作业(id={})不存在", id)),
            EngineError::AlreadyCompleted(_)
            | EngineError::ActionInProgress(_)
            | EngineError::AlreadyFailed(_)
            | EngineError::InvalidStateTransition { .. } => {
                ApiError::ActionStateConflict(err.to_string())
            }
            EngineError::ExecutionFailure { .. } => ApiError::ExecutionFailed(err.to_string()),
            EngineError::LockPoisoned(msg) => ApiError::InternalError(format!("锁获取失败: {}", msg)),
        }
    }
}

// ==========================================
// 从 CatalogError 转换
// ==========================================
impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::GreenhouseNotFound(id) => {
                ApiError::NotFound(format!("温室(id={})不存在", id))
            }
            CatalogError::UnknownCropType(crop) | CatalogError::MarketDataNotFound(crop) => {
                ApiError::UnknownCropType(crop)
            }
            CatalogError::Unavailable(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
