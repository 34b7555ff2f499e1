// ==========================================
// 温室预测排程核心 - 综合预测编排器
// ==========================================
// 用途: 协调 环境预测 → 作业推导 → 分析/建议/风险 的执行顺序
// 输出: 单个温室的 7 日运营视图
// ==========================================

use crate::config::ForecastConfig;
use crate::domain::crop::GrowthCalendar;
use crate::domain::forecast::ExogenousFactors;
use crate::domain::scenario::ComprehensivePrediction;
use crate::domain::snapshot::GreenhouseState;
use crate::engine::action_deriver::ActionDeriver;
use crate::engine::environment::EnvironmentForecaster;
use crate::engine::error::EngineError;
use crate::engine::risk::RiskEngine;
use chrono::NaiveDate;
use rand::Rng;
use tracing::{debug, info, instrument};

// ==========================================
// ComprehensivePredictor - 综合预测编排器
// ==========================================
pub struct ComprehensivePredictor {
    horizon_days: i64,
    environment: EnvironmentForecaster,
    deriver: ActionDeriver,
    risk: RiskEngine,
}

impl ComprehensivePredictor {
    /// 创建新的编排器实例
    pub fn new(config: &ForecastConfig) -> Self {
        Self {
            horizon_days: config.orchestrator.horizon_days,
            environment: EnvironmentForecaster::new(config.environment.clone()),
            deriver: ActionDeriver::new(config.deriver.clone()),
            risk: RiskEngine::new(config.orchestrator.clone()),
        }
    }

    /// 执行综合预测
    ///
    /// # 参数
    /// - state: 温室档案 + 当前快照
    /// - calendar: 作物生育阶段日历
    /// - exogenous: 天气类别 + 室外温度
    /// - base_date: 基准日
    /// - rng: 随机源
    #[instrument(skip(self, state, calendar, exogenous, rng), fields(greenhouse_id = %state.profile.greenhouse_id))]
    pub fn run<R: Rng + ?Sized>(
        &self,
        state: &GreenhouseState,
        calendar: &GrowthCalendar,
        exogenous: &ExogenousFactors,
        base_date: NaiveDate,
        rng: &mut R,
    ) -> Result<ComprehensivePrediction, EngineError> {
        info!(
            crop = %state.profile.crop_type,
            week = state.profile.current_week,
            horizon_days = self.horizon_days,
            "开始执行综合预测"
        );

        // ==========================================
        // 步骤1: 环境预测
        // ==========================================
        debug!("步骤1: 环境预测");
        let days = self
            .environment
            .forecast(&state.snapshot, self.horizon_days, exogenous, base_date, rng)?;

        // ==========================================
        // 步骤2: 作业推导
        // ==========================================
        debug!("步骤2: 作业推导");
        let bands = state.snapshot.bands();
        let schedules =
            self.deriver
                .derive_actions(&days, &bands, calendar, state.profile.current_week);

        // ==========================================
        // 步骤3: 分析 / 建议 / 风险
        // ==========================================
        debug!("步骤3: 分析与风险评估");
        let analysis = self.risk.analyze(&days, &schedules);
        let recommendations = self.risk.recommend(&analysis.summary);
        let risk_assessment = self.risk.assess(&days, &bands, &schedules);

        info!(
            total_actions = analysis.summary.total_actions,
            critical_days = analysis.summary.critical_days,
            recommendations = recommendations.len(),
            risks = risk_assessment.len(),
            "综合预测完成"
        );

        Ok(ComprehensivePrediction {
            greenhouse_id: state.profile.greenhouse_id.clone(),
            environment_predictions: days,
            action_schedule: schedules,
            analysis,
            recommendations,
            risk_assessment,
        })
    }
}

impl Default for ComprehensivePredictor {
    fn default() -> Self {
        Self::new(&ForecastConfig::default())
    }
}
