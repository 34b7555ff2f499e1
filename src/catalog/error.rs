// ==========================================
// 温室预测排程核心 - 目录层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::engine::error::EngineError;
use thiserror::Error;

/// 目录查询错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("温室不存在: {0}")]
    GreenhouseNotFound(String),

    #[error("未登记的作物类型: {0}")]
    UnknownCropType(String),

    #[error("缺少市场数据: {0}")]
    MarketDataNotFound(String),

    #[error("目录数据不可用: {0}")]
    Unavailable(String),
}

impl From<CatalogError> for EngineError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::UnknownCropType(crop) | CatalogError::MarketDataNotFound(crop) => {
                EngineError::UnknownCropType(crop)
            }
            other => EngineError::InvalidInput(other.to_string()),
        }
    }
}
