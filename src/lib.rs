// ==========================================
// 温室预测排程核心 - 核心库
// ==========================================
// 职责: 环境预测 / 作业推导与执行 / 产量与收益预测
// 系统定位: 决策支持库 (展示层负责呈现,执行以人工确认为前提)
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 目录层 - 温室 / 作物 / 市场数据读取
pub mod catalog;

// 配置层 - 引擎参数
pub mod config;

// 引擎层 - 预测与排程算法
pub mod engine;

// API 层 - 展示层入口
pub mod api;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    ActionStatus, AutomationClass, GrowthPhase, MetricKind, RiskSeverity, Urgency,
    WeatherForecast,
};

// 领域实体
pub use domain::{
    CompletePrediction, ComprehensivePrediction, DaySchedule, EnvironmentSnapshot,
    ExecutionOutcome, ExogenousFactors, GreenhouseState, Intervention, RevenueForecast,
    ScenarioComparison, YieldForecast,
};

// 目录
pub use catalog::{CatalogError, CatalogReader, StaticCatalog};

// 配置
pub use config::{ConfigManager, ForecastConfig};

// 引擎
pub use engine::{
    ActionDeriver, ActionScheduler, ComprehensivePredictor, EngineError, EnvironmentForecaster,
    PrioritySorter, RevenueForecaster, RiskEngine, ScenarioComposer, YieldForecaster,
};

// API
pub use api::{ApiError, ApiResult, ExecutionApi, FinancialApi, ForecastApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "温室预测排程核心";
