// ==========================================
// 温室预测排程核心 - 产量预测领域模型
// ==========================================
// 职责: 周产量轨迹 / 品质分布 / 风险因素 / 采收排程
// 红线: 周产量不得为负
// ==========================================

use crate::domain::types::{MetricKind, QualityGrade, RiskSeverity};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// CultivationContext - 栽培上下文
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CultivationContext {
    pub area_sqm: f64,
    pub current_week: u32,
    pub season_start: NaiveDate,
}

// ==========================================
// YieldWeek - 周产量
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldWeek {
    pub week: u32,
    pub date: NaiveDate,
    pub yield_kg: f64,
    pub harvest_curve: f64,
    pub environment_multiplier: f64,
    pub seasonal_multiplier: f64,
    pub stage_name: Option<String>,
    pub confidence: f64,
}

// ==========================================
// QualityDistribution - 品质分布 (%)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityDistribution {
    pub premium: f64,
    pub standard: f64,
    pub economy: f64,
}

impl QualityDistribution {
    pub fn new(premium: f64, standard: f64, economy: f64) -> Self {
        Self {
            premium,
            standard,
            economy,
        }
    }

    /// 占比 (0..1)
    pub fn share(&self, grade: QualityGrade) -> f64 {
        let percent = match grade {
            QualityGrade::Premium => self.premium,
            QualityGrade::Standard => self.standard,
            QualityGrade::Economy => self.economy,
        };
        percent / 100.0
    }
}

// ==========================================
// RiskFactor - 产量风险因素
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "metric", rename_all = "snake_case")]
pub enum RiskFactorKind {
    /// 环境评分过低
    PoorEnvironment,
    /// 指标处于临界状态
    CriticalMetric(MetricKind),
    /// 开花期高湿
    FloweringHumidity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub kind: RiskFactorKind,
    pub severity: RiskSeverity,
    pub description: String,
    pub impact: String,
}

// ==========================================
// HarvestTask - 采收排程
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HarvestDifficulty {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarvestWorkload {
    pub total_minutes: u32,
    pub hours: f64,
    pub workers: u32,
    pub difficulty: HarvestDifficulty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarvestLaborCost {
    pub harvest_cost: f64,
    pub packaging_cost: f64,
    pub total_labor_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarvestTask {
    pub week: u32,
    pub date: NaiveDate,
    pub yield_kg: f64,
    pub stage_name: Option<String>,
    pub workload: HarvestWorkload,
    pub labor_cost: HarvestLaborCost,
}

// ==========================================
// YieldForecast - 产量预测结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldForecast {
    pub crop_type: String,
    pub area_sqm: f64,
    pub current_week: u32,
    pub weekly_yields: Vec<YieldWeek>,
    pub total_yield: f64,
    pub yield_per_sqm: f64,
    pub quality_distribution: QualityDistribution,
    pub environment_score: f64,
    pub confidence: f64,
    pub risk_factors: Vec<RiskFactor>,
    pub harvest_schedule: Vec<HarvestTask>,
    /// 快照缺失、按降低置信度处理的指标
    pub missing_metrics: Vec<MetricKind>,
}

impl YieldForecast {
    pub fn harvest_labor_total(&self) -> f64 {
        self.harvest_schedule
            .iter()
            .map(|t| t.labor_cost.total_labor_cost)
            .sum()
    }

    pub fn max_severity(&self) -> Option<RiskSeverity> {
        self.risk_factors.iter().map(|r| r.severity).max()
    }
}
