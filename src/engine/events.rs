// ==========================================
// 温室预测排程核心 - 作业执行事件发布
// ==========================================
// 职责: 定义执行事件发布 trait，实现依赖倒置
// 说明: Engine 层定义 trait，上层 (仪表盘/日志/测试) 实现适配器
// ==========================================

use crate::domain::snapshot::SensorDeltas;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::Arc;
use uuid::Uuid;

// ==========================================
// 执行事件类型
// ==========================================

/// 作业执行事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionEventType {
    /// 开始执行 (pending → in_progress)
    Started,
    /// 执行成功
    Completed,
    /// 执行失败
    Failed,
    /// 终态作业被重置为 pending
    Reset,
}

impl ActionEventType {
    pub fn as_str(&self) -> &str {
        match self {
            ActionEventType::Started => "Started",
            ActionEventType::Completed => "Completed",
            ActionEventType::Failed => "Failed",
            ActionEventType::Reset => "Reset",
        }
    }
}

/// 作业执行事件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionEvent {
    /// 事件 ID (UUID v4)
    pub event_id: String,
    /// 作业 ID
    pub action_id: String,
    /// 事件类型
    pub event_type: ActionEventType,
    /// 发生时间
    pub occurred_at: NaiveDateTime,
    /// 执行结果描述 (仅 Completed/Failed)
    pub message: Option<String>,
    /// 传感器变化量 (仅成功时)
    pub sensor_deltas: Option<SensorDeltas>,
}

impl ActionEvent {
    /// 创建状态事件 (无执行结果)
    pub fn status(action_id: String, event_type: ActionEventType) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            action_id,
            event_type,
            occurred_at: chrono::Local::now().naive_local(),
            message: None,
            sensor_deltas: None,
        }
    }

    /// 创建结果事件
    pub fn outcome(
        action_id: String,
        success: bool,
        message: String,
        sensor_deltas: Option<SensorDeltas>,
        occurred_at: NaiveDateTime,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            action_id,
            event_type: if success {
                ActionEventType::Completed
            } else {
                ActionEventType::Failed
            },
            occurred_at,
            message: Some(message),
            sensor_deltas,
        }
    }
}

// ==========================================
// 事件发布 Trait
// ==========================================

/// 作业事件发布者 Trait
///
/// # 返回
/// - `Ok(id)`: 下游分配的 ID（如果支持）或空字符串
/// - `Err`: 发布失败 (调度器只记录告警,不影响执行结果)
pub trait ActionEventPublisher: Send + Sync {
    fn publish(&self, event: ActionEvent) -> Result<String, Box<dyn Error + Send + Sync>>;
}

/// 空操作事件发布者
#[derive(Debug, Clone, Default)]
pub struct NoOpEventPublisher;

impl ActionEventPublisher for NoOpEventPublisher {
    fn publish(&self, event: ActionEvent) -> Result<String, Box<dyn Error + Send + Sync>> {
        tracing::debug!(
            "NoOpEventPublisher: 跳过事件发布 - action_id={}, event_type={}",
            event.action_id,
            event.event_type.as_str()
        );
        Ok(String::new())
    }
}

/// 可选的事件发布者包装
pub struct OptionalEventPublisher {
    inner: Option<Arc<dyn ActionEventPublisher>>,
}

impl OptionalEventPublisher {
    pub fn with_publisher(publisher: Arc<dyn ActionEventPublisher>) -> Self {
        Self {
            inner: Some(publisher),
        }
    }

    pub fn none() -> Self {
        Self { inner: None }
    }

    /// 发布事件（如果有发布者）
    pub fn publish(&self, event: ActionEvent) -> Result<String, Box<dyn Error + Send + Sync>> {
        match &self.inner {
            Some(publisher) => publisher.publish(event),
            None => {
                tracing::debug!(
                    "OptionalEventPublisher: 未配置发布者，跳过事件 - action_id={}, event_type={}",
                    event.action_id,
                    event.event_type.as_str()
                );
                Ok(String::new())
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.inner.is_some()
    }
}

impl Default for OptionalEventPublisher {
    fn default() -> Self {
        Self::none()
    }
}
