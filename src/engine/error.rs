// ==========================================
// 温室预测排程核心 - 引擎层错误类型
// ==========================================
// 职责: 预测 / 推导 / 执行过程的错误分类
// 说明: MissingMetric 仅用于告警记录,预测不因缺失指标中断
// ==========================================

use crate::domain::types::{ActionStatus, MetricKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("预测天数无效: {0} (必须大于0)")]
    InvalidHorizon(i64),

    #[error("未登记的作物类型: {0}")]
    UnknownCropType(String),

    #[error("快照缺少指标: {0}")]
    MissingMetric(MetricKind),

    #[error("作业不存在: {0}")]
    ActionNotFound(String),

    #[error("作业已完成: {0}")]
    AlreadyCompleted(String),

    #[error("作业执行中: {0}")]
    ActionInProgress(String),

    #[error("作业已失败,需重置后再执行: {0}")]
    AlreadyFailed(String),

    #[error("执行失败: action_id={action_id}, reason={reason}")]
    ExecutionFailure { action_id: String, reason: String },

    #[error("无效的状态转换: action_id={action_id}, from={from}")]
    InvalidStateTransition {
        action_id: String,
        from: ActionStatus,
    },

    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("锁获取失败: {0}")]
    LockPoisoned(String),
}

impl EngineError {
    /// 调用方可重试 (执行中的作业稍后可查询结果)
    pub fn is_transient(&self) -> bool {
        matches!(self, EngineError::ActionInProgress(_))
    }
}
