// ==========================================
// 温室预测排程核心 - 目录读取 Trait
// ==========================================
// 职责: 定义预测所需的外部数据读取接口（不包含实现）
// 红线: 不包含写入、不包含业务逻辑
// ==========================================

use crate::catalog::error::CatalogError;
use crate::domain::crop::{CropModel, GrowthCalendar, MarketModel};
use crate::domain::snapshot::{EnvironmentSnapshot, GreenhouseProfile, GreenhouseState};
use async_trait::async_trait;

// ==========================================
// CatalogReader Trait
// ==========================================
// 实现者: StaticCatalog (内存演示数据) / 上层接入的传感器平台
#[async_trait]
pub trait CatalogReader: Send + Sync {
    // ===== 温室 =====

    /// 获取温室档案
    async fn get_profile(&self, greenhouse_id: &str) -> Result<GreenhouseProfile, CatalogError>;

    /// 获取温室当前环境快照
    ///
    /// # 返回
    /// - 快照只含实际采集到的指标,缺失指标由引擎降级处理
    async fn get_snapshot(&self, greenhouse_id: &str)
        -> Result<EnvironmentSnapshot, CatalogError>;

    /// 全部温室 ID (按登记顺序)
    async fn list_greenhouses(&self) -> Result<Vec<String>, CatalogError>;

    // ===== 作物 =====

    /// 获取作物模型
    ///
    /// # 返回
    /// - Err(UnknownCropType): 未登记,不做回退
    async fn get_crop_model(&self, crop_type: &str) -> Result<CropModel, CatalogError>;

    /// 获取生育阶段日历
    async fn get_growth_calendar(&self, crop_type: &str) -> Result<GrowthCalendar, CatalogError>;

    // ===== 市场 =====

    /// 获取市场模型
    async fn get_market_model(&self, crop_type: &str) -> Result<MarketModel, CatalogError>;

    /// 档案 + 快照
    async fn get_state(&self, greenhouse_id: &str) -> Result<GreenhouseState, CatalogError> {
        let profile = self.get_profile(greenhouse_id).await?;
        let snapshot = self.get_snapshot(greenhouse_id).await?;
        Ok(GreenhouseState { profile, snapshot })
    }
}
