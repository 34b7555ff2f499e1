// ==========================================
// 温室预测排程核心 - 引擎配置
// ==========================================
// 职责: 各引擎的可调参数 (带默认值)
// 红线: 配置为不可变数据,构造引擎时注入
// ==========================================

use crate::engine::environment::MAX_HORIZON_DAYS;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

// ==========================================
// ConfigError - 配置错误
// ==========================================
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("配置解析失败: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("配置校验失败: {0}")]
    Invalid(String),
}

// ==========================================
// 环境预测参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub confidence_max: f64,
    pub confidence_floor: f64,
    pub confidence_decay_per_day: f64,
    pub noise_growth_per_day: f64, // 不确定度 = min(cap, k·d)
    pub noise_cap: f64,
    pub insulation_damping: f64,   // 室外温度传导系数
    pub reference_outdoor_temp: f64,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            confidence_max: 0.95,
            confidence_floor: 0.3,
            confidence_decay_per_day: 0.10,
            noise_growth_per_day: 0.05,
            noise_cap: 0.3,
            insulation_damping: 0.3,
            reference_outdoor_temp: 20.0,
        }
    }
}

// ==========================================
// 作业推导参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeriverConfig {
    /// 偏离比例 ≥ 该值 → high, 否则 medium
    pub high_deviation_ratio: f64,
    pub disease_humidity_threshold: f64,
    pub disease_temperature_threshold: f64,
    pub stress_reference_temperature: f64,
    pub stress_temperature_tolerance: f64,
    pub moisture_stress_threshold: f64,
}

impl Default for DeriverConfig {
    fn default() -> Self {
        Self {
            high_deviation_ratio: 0.5,
            disease_humidity_threshold: 80.0,
            disease_temperature_threshold: 20.0,
            stress_reference_temperature: 22.0,
            stress_temperature_tolerance: 5.0,
            moisture_stress_threshold: 25.0,
        }
    }
}

// ==========================================
// 执行模拟参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub success_rate: f64,
    pub latency_min_ms: u64,
    pub latency_max_ms: u64,
    pub duration_min_minutes: u32,
    pub duration_max_minutes: u32,
    /// 固定种子 (None 时使用系统熵)
    pub seed: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            success_rate: 0.9,
            latency_min_ms: 2000,
            latency_max_ms: 5000,
            duration_min_minutes: 10,
            duration_max_minutes: 70,
            seed: None,
        }
    }
}

// ==========================================
// 产量模型参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YieldModelConfig {
    pub default_horizon_days: i64,
    pub confidence_min: f64,
    pub confidence_max: f64,
    pub weekly_confidence_decay: f64,
    pub weekly_confidence_floor: f64,
    pub missing_metric_penalty: f64,
    pub random_variation: f64, // 随机系数 ∈ [1-v, 1+v]
    pub harvest_minutes_per_kg: f64,
    pub worker_minutes_per_day: f64,
    pub hourly_wage: f64,
    pub packaging_cost_per_kg: f64,
    pub poor_environment_threshold: f64,
    pub flowering_humidity_threshold: f64,
}

impl Default for YieldModelConfig {
    fn default() -> Self {
        Self {
            default_horizon_days: 90,
            confidence_min: 0.5,
            confidence_max: 0.95,
            weekly_confidence_decay: 0.02,
            weekly_confidence_floor: 0.3,
            missing_metric_penalty: 0.05,
            random_variation: 0.1,
            harvest_minutes_per_kg: 8.0,
            worker_minutes_per_day: 480.0,
            hourly_wage: 15000.0,
            packaging_cost_per_kg: 500.0,
            poor_environment_threshold: 70.0,
            flowering_humidity_threshold: 80.0,
        }
    }
}

// ==========================================
// 收益与成本参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevenueConfig {
    // ===== 固定成本 (月) =====
    pub facility_per_sqm: f64,
    pub insurance_per_sqm: f64,
    pub utilities_per_sqm: f64,
    pub base_labor_monthly: f64,
    pub weeks_per_month: f64,

    // ===== 变动成本 =====
    pub seeds_per_sqm: f64,
    pub fertilizer_per_kg: f64,
    pub pesticide_per_sqm: f64,
    pub packaging_per_kg: f64,
    pub transport_per_kg: f64,

    // ===== 盈亏平衡与风险折扣 =====
    pub representative_price_factor: f64,
    pub critical_discount: f64,
    pub high_discount: f64,
    pub medium_discount: f64,
}

impl Default for RevenueConfig {
    fn default() -> Self {
        Self {
            facility_per_sqm: 2000.0,
            insurance_per_sqm: 500.0,
            utilities_per_sqm: 3000.0,
            base_labor_monthly: 2_000_000.0,
            weeks_per_month: 4.0,
            seeds_per_sqm: 5000.0,
            fertilizer_per_kg: 800.0,
            pesticide_per_sqm: 8000.0,
            packaging_per_kg: 500.0,
            transport_per_kg: 300.0,
            representative_price_factor: 1.2,
            critical_discount: 0.30,
            high_discount: 0.15,
            medium_discount: 0.05,
        }
    }
}

// ==========================================
// 情景参数
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioParams {
    pub yield_multiplier: f64,
    pub probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub optimistic: ScenarioParams,
    pub realistic: ScenarioParams,
    pub pessimistic: ScenarioParams,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            optimistic: ScenarioParams {
                yield_multiplier: 1.25,
                probability: 0.2,
            },
            realistic: ScenarioParams {
                yield_multiplier: 1.0,
                probability: 0.6,
            },
            pessimistic: ScenarioParams {
                yield_multiplier: 0.75,
                probability: 0.2,
            },
        }
    }
}

// ==========================================
// 综合预测参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub horizon_days: i64,
    pub critical_days_threshold: usize,
    pub cost_threshold: f64,
    pub confidence_threshold_percent: f64,
    pub workload_threshold_hours: f64,
    pub trend_threshold_percent: f64,
    pub risk_trend_threshold: f64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            horizon_days: 7,
            critical_days_threshold: 2,
            cost_threshold: 100_000.0,
            confidence_threshold_percent: 70.0,
            workload_threshold_hours: 6.0,
            trend_threshold_percent: 5.0,
            risk_trend_threshold: 2.0,
        }
    }
}

// ==========================================
// ForecastConfig - 总配置
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub environment: EnvironmentConfig,
    pub deriver: DeriverConfig,
    pub scheduler: SchedulerConfig,
    pub yield_model: YieldModelConfig,
    pub revenue: RevenueConfig,
    pub scenario: ScenarioConfig,
    pub orchestrator: OrchestratorConfig,
}

impl ForecastConfig {
    /// 校验配置取值范围
    pub fn validate(&self) -> Result<(), ConfigError> {
        let env = &self.environment;
        if !(0.0..=1.0).contains(&env.confidence_max) {
            return Err(ConfigError::Invalid(format!(
                "environment.confidence_max 超出 [0,1]: {}",
                env.confidence_max
            )));
        }
        if env.confidence_floor > env.confidence_max || env.confidence_floor < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "environment.confidence_floor={} 不得大于 confidence_max={}",
                env.confidence_floor, env.confidence_max
            )));
        }

        let yield_model = &self.yield_model;
        if yield_model.confidence_min > yield_model.confidence_max {
            return Err(ConfigError::Invalid(format!(
                "yield_model.confidence_min={} 不得大于 confidence_max={}",
                yield_model.confidence_min, yield_model.confidence_max
            )));
        }
        if yield_model.default_horizon_days <= 0 {
            return Err(ConfigError::Invalid(format!(
                "yield_model.default_horizon_days 必须为正: {}",
                yield_model.default_horizon_days
            )));
        }

        let scheduler = &self.scheduler;
        if !(0.0..=1.0).contains(&scheduler.success_rate) {
            return Err(ConfigError::Invalid(format!(
                "scheduler.success_rate 超出 [0,1]: {}",
                scheduler.success_rate
            )));
        }
        if scheduler.latency_min_ms > scheduler.latency_max_ms {
            return Err(ConfigError::Invalid(format!(
                "scheduler 延迟区间倒置: {}ms > {}ms",
                scheduler.latency_min_ms, scheduler.latency_max_ms
            )));
        }
        if scheduler.duration_min_minutes > scheduler.duration_max_minutes {
            return Err(ConfigError::Invalid(format!(
                "scheduler 执行时长区间倒置: {} > {}",
                scheduler.duration_min_minutes, scheduler.duration_max_minutes
            )));
        }

        let revenue = &self.revenue;
        for (name, discount) in [
            ("critical_discount", revenue.critical_discount),
            ("high_discount", revenue.high_discount),
            ("medium_discount", revenue.medium_discount),
        ] {
            if !(0.0..=1.0).contains(&discount) {
                return Err(ConfigError::Invalid(format!(
                    "revenue.{} 超出 [0,1]: {}",
                    name, discount
                )));
            }
        }
        if revenue.weeks_per_month <= 0.0 {
            return Err(ConfigError::Invalid("revenue.weeks_per_month 必须为正".to_string()));
        }

        let scenario = &self.scenario;
        let probability_sum = scenario.optimistic.probability
            + scenario.realistic.probability
            + scenario.pessimistic.probability;
        if (probability_sum - 1.0).abs() > 1e-6 {
            return Err(ConfigError::Invalid(format!(
                "scenario 概率之和必须为 1: {}",
                probability_sum
            )));
        }
        if scenario.optimistic.yield_multiplier < scenario.realistic.yield_multiplier
            || scenario.realistic.yield_multiplier < scenario.pessimistic.yield_multiplier
        {
            return Err(ConfigError::Invalid(
                "scenario 产量系数须满足 optimistic ≥ realistic ≥ pessimistic".to_string(),
            ));
        }

        if self.orchestrator.horizon_days <= 0
            || self.orchestrator.horizon_days > i64::from(MAX_HORIZON_DAYS)
        {
            return Err(ConfigError::Invalid(format!(
                "orchestrator.horizon_days 须在 1..={} 之间: {}",
                MAX_HORIZON_DAYS, self.orchestrator.horizon_days
            )));
        }

        Ok(())
    }
}
