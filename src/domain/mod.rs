// ==========================================
// 温室预测排程核心 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、值对象
// 红线: 不含引擎逻辑,不含数据获取逻辑
// ==========================================

pub mod action;
pub mod crop;
pub mod forecast;
pub mod revenue;
pub mod scenario;
pub mod snapshot;
pub mod types;
pub mod yield_forecast;

// 重导出核心类型
pub use action::{ActionCategory, ActionConditions, DaySchedule, ExecutionOutcome, Intervention};
pub use crop::{
    CropModel, EnvironmentFactor, GrowthCalendar, GrowthStage, MarketModel, QualityPremium,
    WeekRange,
};
pub use forecast::{ExogenousFactors, ForecastDay};
pub use revenue::{
    AdjustmentConfidence, BreakEven, CostBreakdown, FinancialSummary, FixedCosts, MonthlyRevenue,
    RevenueForecast, RiskAdjustment, VariableCosts,
};
pub use scenario::{
    AnalysisSummary, CompletePrediction, ComprehensiveAnalysis, ComprehensivePrediction,
    ExtremeCondition, ExtremeDirection, FarmForecast, FarmSummary, GreenhousePerformance,
    OperationalRisk, PredictionSummary, Recommendation, RecommendationKind, ScenarioComparison,
    ScenarioKind, ScenarioOutcome, TrendAnalysis,
};
pub use snapshot::{
    EnvironmentSnapshot, GreenhouseProfile, GreenhouseState, MetricBand, MetricReading,
    SensorDeltas,
};
pub use types::{
    ActionStatus, AutomationClass, DayStatus, Direction, GrowthPhase, MetricKind, MetricStatus,
    QualityGrade, RiskSeverity, Trend, Urgency, WeatherForecast,
};
pub use yield_forecast::{
    CultivationContext, HarvestDifficulty, HarvestLaborCost, HarvestTask, HarvestWorkload,
    QualityDistribution, RiskFactor, RiskFactorKind, YieldForecast, YieldWeek,
};
