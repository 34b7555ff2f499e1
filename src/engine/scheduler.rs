// ==========================================
// 温室预测排程核心 - 作业调度执行器
// ==========================================
// 职责: 持有按日排列的作业,受理执行请求,维护状态与进度
// 状态机: pending → in_progress → {completed | failed}
// 红线: 同一作业的状态转换必须在同一把锁内完成
// 红线: 调用方放弃等待不影响已发起的执行 (tokio::spawn)
// ==========================================

use crate::config::SchedulerConfig;
use crate::domain::action::{DaySchedule, ExecutionOutcome, Intervention};
use crate::domain::snapshot::SensorDeltas;
use crate::domain::types::{round1, ActionStatus, MetricKind};
use crate::engine::error::EngineError;
use crate::engine::events::{
    ActionEvent, ActionEventPublisher, ActionEventType, OptionalEventPublisher,
};
use crate::i18n::{t, t_with_args};
use async_trait::async_trait;
use chrono::NaiveDate;
use futures::future::join_all;
use futures::FutureExt;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

// ==========================================
// Actuator Trait - 执行机构
// ==========================================

/// 一次成功执行的回报
#[derive(Debug, Clone, PartialEq)]
pub struct ActuationReport {
    pub duration_minutes: u32,
    pub sensor_deltas: SensorDeltas,
}

/// 执行机构 Trait
///
/// 模拟器与真实设备驱动都实现此 trait
/// 失败以 Err(ExecutionFailure) 返回,由调度器转换为失败结果值
#[async_trait]
pub trait Actuator: Send + Sync {
    async fn actuate(&self, action: &Intervention) -> Result<ActuationReport, EngineError>;
}

// ==========================================
// SimulatedActuator - 模拟执行机构
// ==========================================
pub struct SimulatedActuator {
    config: SchedulerConfig,
    rng: Mutex<StdRng>,
}

impl SimulatedActuator {
    /// 配置了 seed 时结果可复现
    pub fn new(config: SchedulerConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            rng: Mutex::new(rng),
        }
    }

    fn sample(&self, action_id: &str) -> Result<(u64, bool, u32, SensorDeltas), EngineError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|e| EngineError::LockPoisoned(format!("模拟执行随机源: {}", e)))?;

        let latency_ms = rng.gen_range(
            self.config.latency_min_ms..=self.config.latency_max_ms.max(self.config.latency_min_ms),
        );
        let success = rng.gen::<f64>() < self.config.success_rate;
        let duration = rng.gen_range(
            self.config.duration_min_minutes
                ..=self
                    .config
                    .duration_max_minutes
                    .max(self.config.duration_min_minutes),
        );

        let mut deltas = BTreeMap::new();
        deltas.insert(MetricKind::Temperature, round1((rng.gen::<f64>() - 0.5) * 2.0));
        deltas.insert(MetricKind::Humidity, round1((rng.gen::<f64>() - 0.5) * 5.0));
        deltas.insert(MetricKind::SoilMoisture, round1(rng.gen::<f64>() * 10.0));
        deltas.insert(MetricKind::Co2, round1((rng.gen::<f64>() - 0.5) * 50.0));

        debug!(action_id, latency_ms, success, "模拟执行采样完成");
        Ok((latency_ms, success, duration, deltas))
    }
}

impl Default for SimulatedActuator {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

#[async_trait]
impl Actuator for SimulatedActuator {
    async fn actuate(&self, action: &Intervention) -> Result<ActuationReport, EngineError> {
        // 锁在 sleep 之前释放
        let (latency_ms, success, duration_minutes, sensor_deltas) = self.sample(&action.id)?;

        tokio::time::sleep(Duration::from_millis(latency_ms)).await;

        if !success {
            return Err(EngineError::ExecutionFailure {
                action_id: action.id.clone(),
                reason: t("execution.actuator_fault"),
            });
        }

        Ok(ActuationReport {
            duration_minutes,
            sensor_deltas,
        })
    }
}

// ==========================================
// ActionScheduler - 作业调度执行器
// ==========================================

struct SchedulerState {
    days: Vec<DaySchedule>,
    // action_id → (day 下标, action 下标)
    index: HashMap<String, (usize, usize)>,
}

impl SchedulerState {
    fn new(days: Vec<DaySchedule>) -> Self {
        let mut index = HashMap::new();
        for (day_pos, day) in days.iter().enumerate() {
            for (action_pos, action) in day.actions.iter().enumerate() {
                if index.insert(action.id.clone(), (day_pos, action_pos)).is_some() {
                    warn!(action_id = %action.id, "作业ID重复,后者覆盖前者");
                }
            }
        }
        Self { days, index }
    }

    fn locate(&self, action_id: &str) -> Result<(usize, usize), EngineError> {
        self.index
            .get(action_id)
            .copied()
            .ok_or_else(|| EngineError::ActionNotFound(action_id.to_string()))
    }

    fn action_mut(&mut self, action_id: &str) -> Result<&mut Intervention, EngineError> {
        let (day_pos, action_pos) = self.locate(action_id)?;
        Ok(&mut self.days[day_pos].actions[action_pos])
    }

    fn recompute_day_of(&mut self, action_id: &str) {
        if let Some((day_pos, _)) = self.index.get(action_id).copied() {
            self.days[day_pos].recompute();
        }
    }
}

pub struct ActionScheduler {
    state: Arc<Mutex<SchedulerState>>,
    actuator: Arc<dyn Actuator>,
    publisher: Arc<OptionalEventPublisher>,
}

impl ActionScheduler {
    pub fn new(days: Vec<DaySchedule>, actuator: Arc<dyn Actuator>) -> Self {
        Self {
            state: Arc::new(Mutex::new(SchedulerState::new(days))),
            actuator,
            publisher: Arc::new(OptionalEventPublisher::none()),
        }
    }

    /// 使用模拟执行机构
    pub fn simulated(days: Vec<DaySchedule>, config: SchedulerConfig) -> Self {
        Self::new(days, Arc::new(SimulatedActuator::new(config)))
    }

    /// 注入事件发布者
    pub fn with_publisher(mut self, publisher: Arc<dyn ActionEventPublisher>) -> Self {
        self.publisher = Arc::new(OptionalEventPublisher::with_publisher(publisher));
        self
    }

    fn lock_state(
        state: &Mutex<SchedulerState>,
    ) -> Result<MutexGuard<'_, SchedulerState>, EngineError> {
        state
            .lock()
            .map_err(|e| EngineError::LockPoisoned(format!("调度状态: {}", e)))
    }

    fn emit(publisher: &OptionalEventPublisher, event: ActionEvent) {
        let action_id = event.action_id.clone();
        if let Err(e) = publisher.publish(event) {
            warn!(action_id = %action_id, error = %e, "作业事件发布失败");
        }
    }

    // ==========================================
    // 执行
    // ==========================================

    /// 执行单个作业
    ///
    /// # 返回
    /// - Ok(outcome): 执行已结束 (outcome.success 区分成败)
    /// - Err(ActionNotFound / AlreadyCompleted / ActionInProgress / AlreadyFailed)
    #[instrument(skip(self))]
    pub async fn execute(&self, action_id: &str) -> Result<ExecutionOutcome, EngineError> {
        // 1) 状态守卫: pending → in_progress (原子)
        let action = {
            let mut state = Self::lock_state(&self.state)?;
            let action = state.action_mut(action_id)?;
            match action.status {
                ActionStatus::Pending => {}
                ActionStatus::InProgress => {
                    return Err(EngineError::ActionInProgress(action_id.to_string()))
                }
                ActionStatus::Completed => {
                    return Err(EngineError::AlreadyCompleted(action_id.to_string()))
                }
                ActionStatus::Failed => {
                    return Err(EngineError::AlreadyFailed(action_id.to_string()))
                }
            }
            action.status = ActionStatus::InProgress;
            let snapshot = action.clone();
            state.recompute_day_of(action_id);
            snapshot
        };

        info!(action_id, name = %action.name, "作业开始执行");
        Self::emit(
            &self.publisher,
            ActionEvent::status(action.id.clone(), ActionEventType::Started),
        );

        // 2) 执行与收尾放在独立任务中
        let state = Arc::clone(&self.state);
        let actuator = Arc::clone(&self.actuator);
        let publisher = Arc::clone(&self.publisher);
        let claimed = action.clone();
        let handle = tokio::spawn(async move {
            // 执行机构 panic 视为一次失败执行
            let result = match AssertUnwindSafe(actuator.actuate(&action))
                .catch_unwind()
                .await
            {
                Ok(result) => result,
                Err(payload) => Err(EngineError::ExecutionFailure {
                    action_id: action.id.clone(),
                    reason: Self::panic_reason(payload.as_ref()),
                }),
            };
            Self::finalize(&state, &publisher, &action, result)
        });

        match handle.await {
            Ok(outcome) => outcome,
            // 任务被取消或收尾阶段 panic: 仍需落到终态
            Err(e) => {
                warn!(action_id, error = %e, "执行任务异常结束");
                Self::finalize(
                    &self.state,
                    &self.publisher,
                    &claimed,
                    Err(EngineError::ExecutionFailure {
                        action_id: action_id.to_string(),
                        reason: e.to_string(),
                    }),
                )
            }
        }
    }

    fn panic_reason(payload: &(dyn Any + Send)) -> String {
        payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| t("execution.actuator_fault"))
    }

    /// 执行结果写回 (in_progress → completed | failed)
    fn finalize(
        state: &Mutex<SchedulerState>,
        publisher: &OptionalEventPublisher,
        action: &Intervention,
        result: Result<ActuationReport, EngineError>,
    ) -> Result<ExecutionOutcome, EngineError> {
        let executed_at = chrono::Local::now().naive_local();
        let outcome = match result {
            Ok(report) => ExecutionOutcome {
                action_id: action.id.clone(),
                success: true,
                duration_minutes: report.duration_minutes,
                result_message: t_with_args(
                    "execution.completed",
                    &[("name", action.name.as_str())],
                ),
                sensor_deltas: Some(report.sensor_deltas),
                executed_at,
            },
            Err(e) => {
                let reason = match &e {
                    EngineError::ExecutionFailure { reason, .. } => reason.clone(),
                    other => other.to_string(),
                };
                ExecutionOutcome {
                    action_id: action.id.clone(),
                    success: false,
                    duration_minutes: 0,
                    result_message: t_with_args(
                        "execution.failed",
                        &[("name", action.name.as_str()), ("reason", reason.as_str())],
                    ),
                    sensor_deltas: None,
                    executed_at,
                }
            }
        };

        {
            // 锁中毒时仍写回终态
            let mut state = state.lock().unwrap_or_else(|poisoned| {
                warn!(action_id = %action.id, "调度状态锁已中毒,恢复后写回终态");
                poisoned.into_inner()
            });
            let stored = state.action_mut(&action.id)?;
            stored.status = if outcome.success {
                ActionStatus::Completed
            } else {
                ActionStatus::Failed
            };
            stored.result = Some(outcome.clone());
            state.recompute_day_of(&action.id);
        }

        if outcome.success {
            info!(action_id = %action.id, duration = outcome.duration_minutes, "作业执行成功");
        } else {
            warn!(action_id = %action.id, message = %outcome.result_message, "作业执行失败");
        }
        Self::emit(
            publisher,
            ActionEvent::outcome(
                outcome.action_id.clone(),
                outcome.success,
                outcome.result_message.clone(),
                outcome.sensor_deltas.clone(),
                executed_at,
            ),
        );

        Ok(outcome)
    }

    /// 批量执行某日全部可自动执行 (full + pending) 的作业
    ///
    /// 各作业相互独立,单个失败不影响其他作业
    #[instrument(skip(self))]
    pub async fn execute_all_automated(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<ExecutionOutcome>, EngineError> {
        let ids: Vec<String> = {
            let state = Self::lock_state(&self.state)?;
            state
                .days
                .iter()
                .filter(|day| day.date == date)
                .flat_map(|day| day.actions.iter())
                .filter(|action| action.is_auto_executable())
                .map(|action| action.id.clone())
                .collect()
        };

        if ids.is_empty() {
            debug!(%date, "当日没有可自动执行的作业");
            return Ok(Vec::new());
        }

        let results = join_all(ids.iter().map(|id| self.execute(id))).await;

        let mut outcomes = Vec::with_capacity(results.len());
        for (id, result) in ids.iter().zip(results) {
            match result {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => warn!(action_id = %id, error = %e, "批量执行跳过作业"),
            }
        }

        let succeeded = outcomes.iter().filter(|o| o.success).count();
        info!(%date, total = outcomes.len(), succeeded, "批量自动执行完成");
        Ok(outcomes)
    }

    // ==========================================
    // 重置与查询
    // ==========================================

    /// 终态作业重置为 pending
    pub fn reset(&self, action_id: &str) -> Result<Intervention, EngineError> {
        let action = {
            let mut state = Self::lock_state(&self.state)?;
            let action = state.action_mut(action_id)?;
            match action.status {
                ActionStatus::Completed | ActionStatus::Failed => {}
                ActionStatus::InProgress => {
                    return Err(EngineError::ActionInProgress(action_id.to_string()))
                }
                ActionStatus::Pending => {
                    return Err(EngineError::InvalidStateTransition {
                        action_id: action_id.to_string(),
                        from: ActionStatus::Pending,
                    })
                }
            }
            action.status = ActionStatus::Pending;
            action.result = None;
            let snapshot = action.clone();
            state.recompute_day_of(action_id);
            snapshot
        };

        info!(action_id, "作业已重置");
        Self::emit(
            &self.publisher,
            ActionEvent::status(action.id.clone(), ActionEventType::Reset),
        );
        Ok(action)
    }

    pub fn get_action(&self, action_id: &str) -> Result<Intervention, EngineError> {
        let state = Self::lock_state(&self.state)?;
        let (day_pos, action_pos) = state.locate(action_id)?;
        Ok(state.days[day_pos].actions[action_pos].clone())
    }

    /// 全部日排程快照
    pub fn day_schedules(&self) -> Result<Vec<DaySchedule>, EngineError> {
        let state = Self::lock_state(&self.state)?;
        Ok(state.days.clone())
    }

    pub fn day_schedule(&self, date: NaiveDate) -> Result<Option<DaySchedule>, EngineError> {
        let state = Self::lock_state(&self.state)?;
        Ok(state.days.iter().find(|day| day.date == date).cloned())
    }
}
