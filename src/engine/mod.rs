// ==========================================
// 温室预测排程核心 - 引擎层
// ==========================================
// 职责: 预测 / 推导 / 调度 / 财务 的算法核心
// 红线: 引擎不持有目录数据, 输入全部由调用方注入
// 红线: 随机源一律由参数传入
// ==========================================

pub mod action_deriver;
pub mod environment;
pub mod error;
pub mod events;
pub mod orchestrator;
pub mod priority;
pub mod remedy;
pub mod revenue;
pub mod risk;
pub mod scenario;
pub mod scheduler;
pub mod yield_forecast;

// 重导出核心引擎
pub use action_deriver::{ActionDeriver, StageTask, TaskFrequency};
pub use environment::{EnvironmentForecaster, MAX_HORIZON_DAYS};
pub use error::EngineError;
pub use events::{
    ActionEvent, ActionEventPublisher, ActionEventType, NoOpEventPublisher,
    OptionalEventPublisher,
};
pub use orchestrator::ComprehensivePredictor;
pub use priority::PrioritySorter;
pub use remedy::Remedy;
pub use revenue::{break_even_yield, overall_risk, RevenueForecaster};
pub use risk::RiskEngine;
pub use scenario::ScenarioComposer;
pub use scheduler::{ActionScheduler, ActuationReport, Actuator, SimulatedActuator};
pub use yield_forecast::{month_of_week, EnvironmentScore, YieldForecaster};
