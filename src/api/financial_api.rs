// ==========================================
// 温室预测排程核心 - 财务预测 API
// ==========================================
// 职责: 产量 → 收益 → 情景 的经济视图, 以及全场汇总
// 数据: 档案 / 快照 / 作物模型 / 日历 / 市场模型 由 CatalogReader 提供
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::catalog::CatalogReader;
use crate::config::ForecastConfig;
use crate::domain::revenue::RevenueForecast;
use crate::domain::scenario::{
    CompletePrediction, FarmForecast, FarmSummary, GreenhousePerformance, PredictionSummary,
};
use crate::domain::types::round1;
use crate::domain::yield_forecast::{CultivationContext, YieldForecast};
use crate::engine::{RevenueForecaster, ScenarioComposer, YieldForecaster};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::{info, instrument, warn};

// ==========================================
// FinancialApi - 财务预测 API
// ==========================================

/// 财务预测API
///
/// 职责:
/// 1. 单温室完整预测 (产量 / 收益 / 情景 / 摘要)
/// 2. 全场汇总 (最佳 / 最差温室按 ROI)
pub struct FinancialApi {
    catalog: Arc<dyn CatalogReader>,
    yield_engine: YieldForecaster,
    revenue_engine: RevenueForecaster,
    scenario_engine: ScenarioComposer,
    horizon_days: i64,
    seed: Option<u64>,
}

impl FinancialApi {
    /// 创建新的FinancialApi实例
    ///
    /// # 参数
    /// - catalog: 目录读取接口
    /// - config: 预测配置 (产量期默认 yield_model.default_horizon_days)
    pub fn new(catalog: Arc<dyn CatalogReader>, config: &ForecastConfig) -> Self {
        Self {
            catalog,
            yield_engine: YieldForecaster::new(config.yield_model.clone()),
            revenue_engine: RevenueForecaster::new(config.revenue.clone()),
            scenario_engine: ScenarioComposer::new(
                config.scenario.clone(),
                YieldForecaster::new(config.yield_model.clone()),
                RevenueForecaster::new(config.revenue.clone()),
            ),
            horizon_days: config.yield_model.default_horizon_days,
            seed: config.scheduler.seed,
        }
    }

    /// 固定随机种子
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// 覆盖产量预测天数
    pub fn with_horizon_days(mut self, horizon_days: i64) -> Self {
        self.horizon_days = horizon_days;
        self
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    // ==========================================
    // 单温室完整预测
    // ==========================================

    /// 生成完整财务预测
    ///
    /// # 参数
    /// - greenhouse_id: 温室ID
    ///
    /// # 返回
    /// - Ok(CompletePrediction): 产量 / 收益 / 情景 / 摘要
    /// - Err(ApiError::NotFound): 温室不存在
    /// - Err(ApiError::UnknownCropType): 作物模型或市场模型未登记
    #[instrument(skip(self))]
    pub async fn generate_complete_prediction(
        &self,
        greenhouse_id: &str,
    ) -> ApiResult<CompletePrediction> {
        let state = self.catalog.get_state(greenhouse_id).await?;
        let crop_type = state.profile.crop_type.clone();

        let crop_model = self.catalog.get_crop_model(&crop_type).await?;
        let calendar = self.catalog.get_growth_calendar(&crop_type).await?;
        let market = self.catalog.get_market_model(&crop_type).await?;

        let context = CultivationContext {
            area_sqm: state.profile.area_sqm,
            current_week: state.profile.current_week,
            season_start: state.profile.season_start,
        };

        let mut rng = self.rng();
        let yield_forecast = self.yield_engine.predict_yield(
            &state.snapshot,
            &crop_model,
            &calendar,
            &context,
            self.horizon_days,
            &mut rng,
        )?;
        if !yield_forecast.missing_metrics.is_empty() {
            warn!(
                missing = yield_forecast.missing_metrics.len(),
                "部分指标缺失,预测置信度已下调"
            );
        }

        let revenue = self.revenue_engine.predict_revenue(&yield_forecast, &market);
        let scenarios = self.scenario_engine.compose(&yield_forecast, &market);
        let summary = Self::summarize(&yield_forecast, &revenue);

        info!(
            expected_yield = summary.expected_yield,
            expected_profit = summary.expected_profit,
            roi = summary.roi_percent,
            "完整财务预测完成"
        );

        Ok(CompletePrediction {
            greenhouse: state.profile,
            yield_forecast,
            revenue,
            scenarios,
            summary,
        })
    }

    fn summarize(yield_forecast: &YieldForecast, revenue: &RevenueForecast) -> PredictionSummary {
        PredictionSummary {
            expected_yield: yield_forecast.total_yield,
            expected_revenue: revenue.summary.total_revenue,
            expected_profit: revenue.summary.net_profit,
            profit_margin_percent: revenue.summary.profit_margin_percent,
            roi_percent: revenue.summary.roi_percent,
            confidence: yield_forecast.confidence,
            risk_level: revenue.overall_risk,
        }
    }

    // ==========================================
    // 全场汇总
    // ==========================================

    /// 全部温室的完整预测与汇总
    ///
    /// # 返回
    /// - 任一温室预测失败即返回错误
    #[instrument(skip(self))]
    pub async fn predict_farm_total(&self) -> ApiResult<FarmForecast> {
        let ids = self.catalog.list_greenhouses().await?;
        if ids.is_empty() {
            return Err(ApiError::NotFound("目录中没有温室".to_string()));
        }

        let mut predictions = Vec::with_capacity(ids.len());
        for id in &ids {
            predictions.push(self.generate_complete_prediction(id).await?);
        }

        let summary = Self::farm_summary(&predictions);
        info!(
            greenhouses = predictions.len(),
            total_profit = summary.total_profit,
            "全场预测完成"
        );

        Ok(FarmForecast {
            predictions,
            summary,
        })
    }

    /// 全场合计 + 最佳/最差温室
    pub fn farm_summary(predictions: &[CompletePrediction]) -> FarmSummary {
        let total_yield = round1(predictions.iter().map(|p| p.summary.expected_yield).sum());
        let total_revenue = predictions
            .iter()
            .map(|p| p.summary.expected_revenue)
            .sum::<f64>()
            .round();
        let total_profit = predictions
            .iter()
            .map(|p| p.summary.expected_profit)
            .sum::<f64>()
            .round();
        let avg_profit_margin_percent = if total_revenue > 0.0 {
            round1(total_profit / total_revenue * 100.0)
        } else {
            0.0
        };

        let performance = |p: &CompletePrediction| GreenhousePerformance {
            greenhouse_id: p.greenhouse.greenhouse_id.clone(),
            name: p.greenhouse.name.clone(),
            roi_percent: p.summary.roi_percent,
            profit: p.summary.expected_profit,
        };

        let best_performing = predictions
            .iter()
            .max_by(|a, b| a.summary.roi_percent.total_cmp(&b.summary.roi_percent))
            .map(performance);
        let worst_performing = predictions
            .iter()
            .min_by(|a, b| a.summary.roi_percent.total_cmp(&b.summary.roi_percent))
            .map(performance);

        FarmSummary {
            total_yield,
            total_revenue,
            total_profit,
            avg_profit_margin_percent,
            best_performing,
            worst_performing,
        }
    }
}
