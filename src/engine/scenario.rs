// ==========================================
// 温室预测排程核心 - 情景分析引擎
// ==========================================
// 职责: 乐观 / 现实 / 悲观 三情景下重算收益
// 做法: 基于同一份产量预测按倍率缩放周产量,再走收益引擎
// 红线: 同一输入下 乐观产量 ≥ 现实产量 ≥ 悲观产量
// ==========================================

use crate::config::{ScenarioConfig, ScenarioParams};
use crate::domain::crop::MarketModel;
use crate::domain::scenario::{ScenarioComparison, ScenarioKind, ScenarioOutcome};
use crate::domain::types::{round1, round2};
use crate::domain::yield_forecast::YieldForecast;
use crate::engine::revenue::RevenueForecaster;
use crate::engine::yield_forecast::YieldForecaster;
use crate::i18n::{t, t_with_args};
use tracing::{info, instrument};

// ==========================================
// ScenarioComposer - 情景分析引擎
// ==========================================
pub struct ScenarioComposer {
    config: ScenarioConfig,
    yield_engine: YieldForecaster,
    revenue_engine: RevenueForecaster,
}

impl ScenarioComposer {
    pub fn new(
        config: ScenarioConfig,
        yield_engine: YieldForecaster,
        revenue_engine: RevenueForecaster,
    ) -> Self {
        Self {
            config,
            yield_engine,
            revenue_engine,
        }
    }

    fn params(&self, kind: ScenarioKind) -> ScenarioParams {
        match kind {
            ScenarioKind::Optimistic => self.config.optimistic,
            ScenarioKind::Realistic => self.config.realistic,
            ScenarioKind::Pessimistic => self.config.pessimistic,
        }
    }

    /// 三情景对比
    #[instrument(skip(self, base, market), fields(crop = %base.crop_type, base_yield = base.total_yield))]
    pub fn compose(&self, base: &YieldForecast, market: &MarketModel) -> ScenarioComparison {
        let optimistic = self.run_scenario(ScenarioKind::Optimistic, base, market);
        let realistic = self.run_scenario(ScenarioKind::Realistic, base, market);
        let pessimistic = self.run_scenario(ScenarioKind::Pessimistic, base, market);

        let expected_profit = [&optimistic, &realistic, &pessimistic]
            .iter()
            .map(|s| s.probability * s.profit)
            .sum::<f64>()
            .round();

        info!(expected_profit, "情景分析完成");

        ScenarioComparison {
            optimistic,
            realistic,
            pessimistic,
            expected_profit,
        }
    }

    fn run_scenario(
        &self,
        kind: ScenarioKind,
        base: &YieldForecast,
        market: &MarketModel,
    ) -> ScenarioOutcome {
        let params = self.params(kind);
        let scaled = self.scale_forecast(base, params.yield_multiplier);
        let revenue = self.revenue_engine.predict_revenue(&scaled, market);

        let percent_text = format!("{}", (params.yield_multiplier * 100.0).round());
        ScenarioOutcome {
            kind,
            name: t(&format!("scenario.{}.name", kind.as_str())),
            yield_multiplier: params.yield_multiplier,
            probability: params.probability,
            yield_kg: scaled.total_yield,
            revenue: revenue.summary.total_revenue,
            profit: revenue.summary.net_profit,
            description: t_with_args(
                &format!("scenario.{}.description", kind.as_str()),
                &[("percent", percent_text.as_str())],
            ),
        }
    }

    /// 按倍率缩放周产量 (采收计划随之重建)
    pub fn scale_forecast(&self, base: &YieldForecast, multiplier: f64) -> YieldForecast {
        let mut scaled = base.clone();
        for week in &mut scaled.weekly_yields {
            week.yield_kg = round1((week.yield_kg * multiplier).max(0.0));
        }
        scaled.total_yield = round1(scaled.weekly_yields.iter().map(|w| w.yield_kg).sum());
        scaled.yield_per_sqm = if scaled.area_sqm > 0.0 {
            round2(scaled.total_yield / scaled.area_sqm)
        } else {
            0.0
        };
        scaled.harvest_schedule = self.yield_engine.build_harvest_schedule(&scaled.weekly_yields);
        scaled
    }
}

impl Default for ScenarioComposer {
    fn default() -> Self {
        Self::new(
            ScenarioConfig::default(),
            YieldForecaster::default(),
            RevenueForecaster::default(),
        )
    }
}
