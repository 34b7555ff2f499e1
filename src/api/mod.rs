// ==========================================
// 温室预测排程核心 - API 层
// ==========================================
// 职责: 面向展示层的三个请求入口 (运营预测 / 财务预测 / 作业执行)
// ==========================================

pub mod error;
pub mod execution_api;
pub mod financial_api;
pub mod forecast_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use execution_api::ExecutionApi;
pub use financial_api::FinancialApi;
pub use forecast_api::ForecastApi;
