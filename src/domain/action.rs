// ==========================================
// 温室预测排程核心 - 作业领域模型
// ==========================================
// 职责: 作业 (Intervention) / 执行结果 / 日排程
// 红线: 作业ID稳定,状态只由调度执行器修改
// ==========================================

use crate::domain::snapshot::SensorDeltas;
use crate::domain::types::{
    round1, ActionStatus, AutomationClass, DayStatus, MetricKind, Urgency,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 作业类别 (Action Category)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionCategory {
    EnvironmentControl, // 阈值触发的环境调节
    Routine,            // 按星期的例行作业
    GrowthStage,        // 生育阶段作业
    Seasonal,           // 季节作业
    Preventive,         // 预防性作业
    Monitoring,         // 兜底监测
}

impl fmt::Display for ActionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionCategory::EnvironmentControl => write!(f, "environment_control"),
            ActionCategory::Routine => write!(f, "routine"),
            ActionCategory::GrowthStage => write!(f, "growth_stage"),
            ActionCategory::Seasonal => write!(f, "seasonal"),
            ActionCategory::Preventive => write!(f, "preventive"),
            ActionCategory::Monitoring => write!(f, "monitoring"),
        }
    }
}

/// 触发条件 (当前值 → 目标区间)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionConditions {
    pub metric: MetricKind,
    pub current: f64,
    pub target_low: f64,
    pub target_high: f64,
    pub deviation_ratio: f64,
}

// ==========================================
// ExecutionOutcome - 执行结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub action_id: String,
    pub success: bool,
    pub duration_minutes: u32,
    pub result_message: String,
    pub sensor_deltas: Option<SensorDeltas>,
    pub executed_at: NaiveDateTime,
}

// ==========================================
// Intervention - 作业
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intervention {
    pub id: String,
    pub category: ActionCategory,
    pub name: String,
    pub description: String,
    pub urgency: Urgency,
    pub automation: AutomationClass,
    pub scheduled_time: NaiveTime,
    pub estimated_duration_min: u32,
    pub estimated_cost: f64,
    pub status: ActionStatus,
    pub conditions: Option<ActionConditions>,
    pub result: Option<ExecutionOutcome>,
}

impl Intervention {
    /// 创建待执行作业
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: String,
        category: ActionCategory,
        name: String,
        description: String,
        urgency: Urgency,
        automation: AutomationClass,
        scheduled_time: NaiveTime,
        estimated_duration_min: u32,
        estimated_cost: f64,
    ) -> Self {
        Self {
            id,
            category,
            name,
            description,
            urgency,
            automation,
            scheduled_time,
            estimated_duration_min,
            estimated_cost,
            status: ActionStatus::Pending,
            conditions: None,
            result: None,
        }
    }

    pub fn with_conditions(mut self, conditions: ActionConditions) -> Self {
        self.conditions = Some(conditions);
        self
    }

    /// 可否无人值守执行
    pub fn is_auto_executable(&self) -> bool {
        self.automation == AutomationClass::Full && self.status == ActionStatus::Pending
    }
}

// ==========================================
// DaySchedule - 日排程
// ==========================================
// 汇总字段随作业变化重新计算
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub date: NaiveDate,
    pub day_index: u32,
    pub confidence: f64,
    pub actions: Vec<Intervention>,
    pub total_count: usize,
    pub urgent_count: usize,
    pub automation_rate_percent: f64,
    pub total_duration_minutes: u32,
    pub total_cost: f64,
    pub status: DayStatus,
}

impl DaySchedule {
    /// 创建日排程 (作业应已按优先级排序)
    pub fn new(date: NaiveDate, day_index: u32, confidence: f64, actions: Vec<Intervention>) -> Self {
        let mut schedule = Self {
            date,
            day_index,
            confidence,
            actions,
            total_count: 0,
            urgent_count: 0,
            automation_rate_percent: 0.0,
            total_duration_minutes: 0,
            total_cost: 0.0,
            status: DayStatus::Light,
        };
        schedule.recompute();
        schedule
    }

    /// 重新计算汇总字段
    pub fn recompute(&mut self) {
        self.total_count = self.actions.len();
        self.urgent_count = self.actions.iter().filter(|a| a.urgency.is_urgent()).count();
        self.total_duration_minutes = self.actions.iter().map(|a| a.estimated_duration_min).sum();
        self.total_cost = self.actions.iter().map(|a| a.estimated_cost).sum();

        self.automation_rate_percent = if self.actions.is_empty() {
            0.0
        } else {
            let score: f64 = self.actions.iter().map(|a| a.automation.score()).sum();
            (score / self.actions.len() as f64 * 100.0).round()
        };

        self.status = Self::derive_status(&self.actions);
    }

    /// 日负荷状态
    ///
    /// 规则（顺序执行，命中即返回）:
    /// 1) 存在 critical 作业 → Critical
    /// 2) high 作业 > 2 → Busy
    /// 3) 作业数 > 5 → Normal
    /// 4) 其他 → Light
    fn derive_status(actions: &[Intervention]) -> DayStatus {
        let critical = actions.iter().any(|a| a.urgency == Urgency::Critical);
        let high = actions.iter().filter(|a| a.urgency == Urgency::High).count();

        if critical {
            DayStatus::Critical
        } else if high > 2 {
            DayStatus::Busy
        } else if actions.len() > 5 {
            DayStatus::Normal
        } else {
            DayStatus::Light
        }
    }

    /// 完成进度 (%)
    ///
    /// (completed + 0.5 * in_progress) / total; 空日视为 100
    pub fn progress_percent(&self) -> f64 {
        if self.actions.is_empty() {
            return 100.0;
        }
        let completed = self
            .actions
            .iter()
            .filter(|a| a.status == ActionStatus::Completed)
            .count() as f64;
        let in_progress = self
            .actions
            .iter()
            .filter(|a| a.status == ActionStatus::InProgress)
            .count() as f64;
        ((completed + in_progress * 0.5) / self.actions.len() as f64 * 100.0).round()
    }

    /// 作业量 (小时)
    pub fn workload_hours(&self) -> f64 {
        round1(self.total_duration_minutes as f64 / 60.0)
    }

    pub fn critical_count(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| a.urgency == Urgency::Critical)
            .count()
    }

    pub fn has_critical(&self) -> bool {
        self.critical_count() > 0
    }

    pub fn find(&self, action_id: &str) -> Option<&Intervention> {
        self.actions.iter().find(|a| a.id == action_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(id: &str, urgency: Urgency, automation: AutomationClass) -> Intervention {
        Intervention::new(
            id.to_string(),
            ActionCategory::Routine,
            id.to_string(),
            String::new(),
            urgency,
            automation,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            30,
            1000.0,
        )
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
    }

    #[test]
    fn test_day_status_rules() {
        let critical = DaySchedule::new(
            date(),
            1,
            0.85,
            vec![action("a", Urgency::Critical, AutomationClass::Full)],
        );
        assert_eq!(critical.status, DayStatus::Critical);

        let busy = DaySchedule::new(
            date(),
            1,
            0.85,
            vec![
                action("a", Urgency::High, AutomationClass::Full),
                action("b", Urgency::High, AutomationClass::Full),
                action("c", Urgency::High, AutomationClass::Full),
            ],
        );
        assert_eq!(busy.status, DayStatus::Busy);

        let light = DaySchedule::new(date(), 1, 0.85, vec![action("a", Urgency::Low, AutomationClass::Full)]);
        assert_eq!(light.status, DayStatus::Light);
    }

    #[test]
    fn test_automation_rate_and_totals() {
        let schedule = DaySchedule::new(
            date(),
            1,
            0.85,
            vec![
                action("a", Urgency::High, AutomationClass::Full),
                action("b", Urgency::Medium, AutomationClass::Semi),
                action("c", Urgency::Low, AutomationClass::Manual),
                action("d", Urgency::Low, AutomationClass::Full),
            ],
        );
        // (1 + 0.5 + 0 + 1) / 4 = 62.5 → 63
        assert_eq!(schedule.automation_rate_percent, 63.0);
        assert_eq!(schedule.urgent_count, 1);
        assert_eq!(schedule.total_duration_minutes, 120);
        assert_eq!(schedule.total_cost, 4000.0);
        assert_eq!(schedule.workload_hours(), 2.0);
    }

    #[test]
    fn test_progress_percent() {
        let mut schedule = DaySchedule::new(
            date(),
            1,
            0.85,
            vec![
                action("a", Urgency::High, AutomationClass::Full),
                action("b", Urgency::Low, AutomationClass::Full),
            ],
        );
        assert_eq!(schedule.progress_percent(), 0.0);

        schedule.actions[0].status = ActionStatus::Completed;
        schedule.actions[1].status = ActionStatus::InProgress;
        assert_eq!(schedule.progress_percent(), 75.0);
    }
}
