// ==========================================
// 温室预测排程核心 - 作业执行 API
// ==========================================
// 职责: 展示层的作业执行 / 重置 / 查询入口
// 说明: 执行失败以 ExecutionOutcome.success = false 返回, 不作为错误
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::SchedulerConfig;
use crate::domain::action::{DaySchedule, ExecutionOutcome, Intervention};
use crate::domain::scenario::ComprehensivePrediction;
use crate::engine::{ActionEventPublisher, ActionScheduler};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, instrument};

// ==========================================
// ExecutionApi - 作业执行 API
// ==========================================

/// 作业执行API
pub struct ExecutionApi {
    scheduler: Arc<ActionScheduler>,
}

impl ExecutionApi {
    /// 创建新的ExecutionApi实例
    pub fn new(scheduler: Arc<ActionScheduler>) -> Self {
        Self { scheduler }
    }

    /// 以综合预测的日排程建立执行会话 (模拟执行机构)
    ///
    /// # 参数
    /// - prediction: 综合预测结果
    /// - config: 执行模拟配置
    /// - publisher: 可选的作业事件发布者
    pub fn from_prediction(
        prediction: &ComprehensivePrediction,
        config: SchedulerConfig,
        publisher: Option<Arc<dyn ActionEventPublisher>>,
    ) -> Self {
        let scheduler = ActionScheduler::simulated(prediction.action_schedule.clone(), config);
        let scheduler = match publisher {
            Some(publisher) => scheduler.with_publisher(publisher),
            None => scheduler,
        };
        Self::new(Arc::new(scheduler))
    }

    // ==========================================
    // 执行
    // ==========================================

    /// 执行作业
    ///
    /// # 返回
    /// - Ok(ExecutionOutcome): 执行结束 (含失败)
    /// - Err(ApiError::NotFound): 作业不存在
    /// - Err(ApiError::ActionStateConflict): 已完成 / 执行中 / 已失败
    #[instrument(skip(self))]
    pub async fn execute_action(&self, action_id: &str) -> ApiResult<ExecutionOutcome> {
        if action_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("作业ID不能为空".to_string()));
        }
        let outcome = self.scheduler.execute(action_id).await?;
        info!(action_id, success = outcome.success, "作业执行请求完成");
        Ok(outcome)
    }

    /// 执行某日全部可自动执行的作业
    pub async fn execute_automated(&self, date: NaiveDate) -> ApiResult<Vec<ExecutionOutcome>> {
        Ok(self.scheduler.execute_all_automated(date).await?)
    }

    /// 终态作业重置为待执行
    pub fn reset_action(&self, action_id: &str) -> ApiResult<Intervention> {
        Ok(self.scheduler.reset(action_id)?)
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn get_action(&self, action_id: &str) -> ApiResult<Intervention> {
        Ok(self.scheduler.get_action(action_id)?)
    }

    pub fn day_schedules(&self) -> ApiResult<Vec<DaySchedule>> {
        Ok(self.scheduler.day_schedules()?)
    }

    /// 日进度 (%)
    pub fn day_progress(&self, date: NaiveDate) -> ApiResult<f64> {
        self.scheduler
            .day_schedule(date)?
            .map(|day| day.progress_percent())
            .ok_or_else(|| ApiError::NotFound(format!("日期 {} 没有排程", date)))
    }
}
