// ==========================================
// 温室预测排程核心 - 运营预测 API
// ==========================================
// 职责: 7日运营视图 (环境预测 + 作业排程 + 分析 + 建议 + 风险)
// 数据: 温室状态 / 生育日历 由 CatalogReader 提供
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::catalog::CatalogReader;
use crate::config::ForecastConfig;
use crate::domain::forecast::ExogenousFactors;
use crate::domain::scenario::ComprehensivePrediction;
use crate::domain::snapshot::GreenhouseState;
use crate::engine::ComprehensivePredictor;
use chrono::{Local, NaiveDate};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::{info, instrument};

// ==========================================
// ForecastApi - 运营预测 API
// ==========================================

/// 运营预测API
///
/// 面向展示层的单次调用: 给定温室与外部条件,返回完整的7日运营视图
pub struct ForecastApi {
    catalog: Arc<dyn CatalogReader>,
    predictor: ComprehensivePredictor,
    seed: Option<u64>,
}

impl ForecastApi {
    /// 创建新的ForecastApi实例
    ///
    /// # 参数
    /// - catalog: 目录读取接口
    /// - config: 预测配置 (scheduler.seed 同时作为预测噪声种子)
    pub fn new(catalog: Arc<dyn CatalogReader>, config: &ForecastConfig) -> Self {
        Self {
            catalog,
            predictor: ComprehensivePredictor::new(config),
            seed: config.scheduler.seed,
        }
    }

    /// 固定随机种子 (结果可复现)
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    // ==========================================
    // 综合预测
    // ==========================================

    /// 按温室ID执行综合预测 (基准日 = 今天)
    ///
    /// # 参数
    /// - greenhouse_id: 温室ID
    /// - exogenous: 天气类别 + 室外温度
    ///
    /// # 返回
    /// - Ok(ComprehensivePrediction): 7日运营视图
    /// - Err(ApiError::NotFound): 温室不存在
    /// - Err(ApiError::UnknownCropType): 作物未登记
    pub async fn run_comprehensive_prediction(
        &self,
        greenhouse_id: &str,
        exogenous: &ExogenousFactors,
    ) -> ApiResult<ComprehensivePrediction> {
        let state = self.catalog.get_state(greenhouse_id).await?;
        self.run_for_state(&state, exogenous).await
    }

    /// 按给定状态执行综合预测 (基准日 = 今天)
    pub async fn run_for_state(
        &self,
        state: &GreenhouseState,
        exogenous: &ExogenousFactors,
    ) -> ApiResult<ComprehensivePrediction> {
        self.run_for_state_at(state, exogenous, Local::now().date_naive())
            .await
    }

    /// 按给定状态与基准日执行综合预测
    ///
    /// # 参数
    /// - state: 温室档案 + 当前快照
    /// - exogenous: 外部条件
    /// - base_date: 基准日 (第1天 = 基准日 + 1)
    #[instrument(skip(self, state, exogenous), fields(greenhouse_id = %state.profile.greenhouse_id))]
    pub async fn run_for_state_at(
        &self,
        state: &GreenhouseState,
        exogenous: &ExogenousFactors,
        base_date: NaiveDate,
    ) -> ApiResult<ComprehensivePrediction> {
        if state.profile.current_week == 0 {
            return Err(ApiError::InvalidInput("栽培周次必须从1开始".to_string()));
        }

        let calendar = self
            .catalog
            .get_growth_calendar(&state.profile.crop_type)
            .await?;

        let mut rng = self.rng();
        let prediction = self
            .predictor
            .run(state, &calendar, exogenous, base_date, &mut rng)?;

        info!(
            days = prediction.action_schedule.len(),
            actions = prediction.analysis.summary.total_actions,
            "运营预测完成"
        );
        Ok(prediction)
    }
}
