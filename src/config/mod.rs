// ==========================================
// 温室预测排程核心 - 配置层
// ==========================================
// 职责: 引擎参数定义与加载
// ==========================================

pub mod config_manager;
pub mod forecast_config;

pub use config_manager::{ConfigManager, ConfigSource};
pub use forecast_config::{
    ConfigError, DeriverConfig, EnvironmentConfig, ForecastConfig, OrchestratorConfig,
    RevenueConfig, ScenarioConfig, ScenarioParams, SchedulerConfig, YieldModelConfig,
};
