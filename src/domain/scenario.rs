// ==========================================
// 温室预测排程核心 - 情景分析与综合预测领域模型
// ==========================================

use crate::domain::action::DaySchedule;
use crate::domain::forecast::ForecastDay;
use crate::domain::revenue::RevenueForecast;
use crate::domain::snapshot::GreenhouseProfile;
use crate::domain::types::{MetricKind, RiskSeverity, Trend, Urgency};
use crate::domain::yield_forecast::YieldForecast;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 情景分析 (Scenario)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    Optimistic,
    Realistic,
    Pessimistic,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 3] = [
        ScenarioKind::Optimistic,
        ScenarioKind::Realistic,
        ScenarioKind::Pessimistic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioKind::Optimistic => "optimistic",
            ScenarioKind::Realistic => "realistic",
            ScenarioKind::Pessimistic => "pessimistic",
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub kind: ScenarioKind,
    pub name: String,
    pub yield_multiplier: f64,
    pub probability: f64,
    pub yield_kg: f64,
    pub revenue: f64,
    pub profit: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub optimistic: ScenarioOutcome,
    pub realistic: ScenarioOutcome,
    pub pessimistic: ScenarioOutcome,
    /// 概率加权利润
    pub expected_profit: f64,
}

impl ScenarioComparison {
    pub fn get(&self, kind: ScenarioKind) -> &ScenarioOutcome {
        match kind {
            ScenarioKind::Optimistic => &self.optimistic,
            ScenarioKind::Realistic => &self.realistic,
            ScenarioKind::Pessimistic => &self.pessimistic,
        }
    }
}

// ==========================================
// 经济视图: 完整预测
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionSummary {
    pub expected_yield: f64,
    pub expected_revenue: f64,
    pub expected_profit: f64,
    pub profit_margin_percent: f64,
    pub roi_percent: f64,
    pub confidence: f64,
    pub risk_level: RiskSeverity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletePrediction {
    pub greenhouse: GreenhouseProfile,
    #[serde(rename = "yield")]
    pub yield_forecast: YieldForecast,
    pub revenue: RevenueForecast,
    pub scenarios: ScenarioComparison,
    pub summary: PredictionSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GreenhousePerformance {
    pub greenhouse_id: String,
    pub name: String,
    pub roi_percent: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmSummary {
    pub total_yield: f64,
    pub total_revenue: f64,
    pub total_profit: f64,
    pub avg_profit_margin_percent: f64,
    pub best_performing: Option<GreenhousePerformance>,
    pub worst_performing: Option<GreenhousePerformance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmForecast {
    pub predictions: Vec<CompletePrediction>,
    pub summary: FarmSummary,
}

// ==========================================
// 运营视图: 综合预测 (7日)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_actions: usize,
    pub total_cost: f64,
    pub avg_confidence_percent: f64,
    pub critical_days: usize,
    pub workload_peak_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    pub temperature: Trend,
    pub humidity: Trend,
    pub risk: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComprehensiveAnalysis {
    pub summary: AnalysisSummary,
    pub trends: TrendAnalysis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    Urgent,
    Economic,
    Monitoring,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub priority: Urgency,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtremeDirection {
    CriticallyLow,
    CriticallyHigh,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtremeCondition {
    pub metric: MetricKind,
    pub value: f64,
    pub direction: ExtremeDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OperationalRisk {
    /// 某日出现临界环境
    Environment {
        day_index: u32,
        date: NaiveDate,
        level: RiskSeverity,
        conditions: Vec<ExtremeCondition>,
        impact: String,
    },
    /// 作业量过高
    Workload {
        level: RiskSeverity,
        day_indexes: Vec<u32>,
        impact: String,
    },
}

impl OperationalRisk {
    pub fn level(&self) -> RiskSeverity {
        match self {
            OperationalRisk::Environment { level, .. } => *level,
            OperationalRisk::Workload { level, .. } => *level,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComprehensivePrediction {
    pub greenhouse_id: String,
    pub environment_predictions: Vec<ForecastDay>,
    pub action_schedule: Vec<DaySchedule>,
    pub analysis: ComprehensiveAnalysis,
    pub recommendations: Vec<Recommendation>,
    pub risk_assessment: Vec<OperationalRisk>,
}
