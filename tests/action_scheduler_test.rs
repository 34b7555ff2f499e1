// ==========================================
// ActionScheduler 集成测试
// ==========================================
// 测试目标: 状态守卫 / 并发执行 / 批量执行 / 事件发布 / 放弃等待
// ==========================================

mod helpers;

use chrono::NaiveDate;
use greenhouse_forecast::config::SchedulerConfig;
use greenhouse_forecast::domain::{ActionStatus, AutomationClass, DaySchedule, Urgency};
use greenhouse_forecast::engine::{ActionEventType, ActionScheduler, EngineError};
use helpers::recording_publisher::RecordingPublisher;
use helpers::test_data_builder::{day_schedule, intervention};
use std::sync::Arc;
use std::time::Duration;

// ==========================================
// 测试辅助函数
// ==========================================

fn schedule_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()
}

fn config(success_rate: f64, latency_ms: (u64, u64)) -> SchedulerConfig {
    SchedulerConfig {
        success_rate,
        latency_min_ms: latency_ms.0,
        latency_max_ms: latency_ms.1,
        seed: Some(7),
        ..SchedulerConfig::default()
    }
}

fn create_test_days() -> Vec<DaySchedule> {
    vec![
        day_schedule(
            schedule_date(),
            1,
            vec![
                intervention("heat", Urgency::Critical, AutomationClass::Full, 3000.0),
                intervention("vent", Urgency::High, AutomationClass::Full, 2000.0),
                intervention("irrigate", Urgency::Medium, AutomationClass::Full, 1000.0),
                intervention("lime", Urgency::Low, AutomationClass::Manual, 10000.0),
            ],
        ),
        day_schedule(
            NaiveDate::from_ymd_opt(2025, 3, 5).unwrap(),
            2,
            vec![intervention("next_day", Urgency::Low, AutomationClass::Full, 0.0)],
        ),
    ]
}

// ==========================================
// 状态守卫
// ==========================================

#[tokio::test]
async fn test_execute_twice_succeeds_once() {
    let scheduler = ActionScheduler::simulated(create_test_days(), config(1.0, (0, 2)));

    let first = scheduler.execute("heat").await.unwrap();
    assert!(first.success);
    assert!(first.duration_minutes > 0);

    let second = scheduler.execute("heat").await;
    assert_eq!(second, Err(EngineError::AlreadyCompleted("heat".to_string())));

    let action = scheduler.get_action("heat").unwrap();
    assert_eq!(action.status, ActionStatus::Completed);
    assert_eq!(action.result.unwrap().action_id, "heat");
}

#[tokio::test]
async fn test_concurrent_execute_same_id_only_one_wins() {
    let scheduler = ActionScheduler::simulated(create_test_days(), config(1.0, (20, 30)));

    let (a, b) = tokio::join!(scheduler.execute("vent"), scheduler.execute("vent"));

    let results = [a, b];
    let wins = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1);
    assert!(results.iter().any(|r| matches!(
        r,
        Err(EngineError::ActionInProgress(_)) | Err(EngineError::AlreadyCompleted(_))
    )));
    assert_eq!(
        scheduler.get_action("vent").unwrap().status,
        ActionStatus::Completed
    );
}

#[tokio::test]
async fn test_different_ids_run_independently() {
    let scheduler = ActionScheduler::simulated(create_test_days(), config(1.0, (5, 15)));

    let (a, b, c) = tokio::join!(
        scheduler.execute("heat"),
        scheduler.execute("vent"),
        scheduler.execute("next_day"),
    );
    assert!(a.unwrap().success);
    assert!(b.unwrap().success);
    assert!(c.unwrap().success);
}

#[tokio::test]
async fn test_failed_action_requires_reset() {
    let scheduler = ActionScheduler::simulated(create_test_days(), config(0.0, (0, 2)));

    let outcome = scheduler.execute("irrigate").await.unwrap();
    assert!(!outcome.success);
    assert_eq!(outcome.duration_minutes, 0);
    assert!(outcome.sensor_deltas.is_none());

    assert_eq!(
        scheduler.execute("irrigate").await,
        Err(EngineError::AlreadyFailed("irrigate".to_string()))
    );

    let reset = scheduler.reset("irrigate").unwrap();
    assert_eq!(reset.status, ActionStatus::Pending);

    // 重置后可再次执行
    let retry = scheduler.execute("irrigate").await.unwrap();
    assert!(!retry.success);
}

#[tokio::test]
async fn test_unknown_action() {
    let scheduler = ActionScheduler::simulated(create_test_days(), config(1.0, (0, 2)));
    assert_eq!(
        scheduler.execute("missing").await,
        Err(EngineError::ActionNotFound("missing".to_string()))
    );
    assert!(scheduler.get_action("missing").is_err());
}

// ==========================================
// 批量执行
// ==========================================

#[tokio::test]
async fn test_execute_all_automated_skips_manual_and_other_days() {
    let scheduler = ActionScheduler::simulated(create_test_days(), config(1.0, (0, 5)));

    let outcomes = scheduler
        .execute_all_automated(schedule_date())
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes.iter().all(|o| o.success));
    assert_eq!(
        scheduler.get_action("lime").unwrap().status,
        ActionStatus::Pending
    );
    assert_eq!(
        scheduler.get_action("next_day").unwrap().status,
        ActionStatus::Pending
    );

    let day = scheduler.day_schedule(schedule_date()).unwrap().unwrap();
    assert_eq!(day.progress_percent(), 75.0);

    // 再次批量: 没有可执行作业
    let again = scheduler
        .execute_all_automated(schedule_date())
        .await
        .unwrap();
    assert!(again.is_empty());
}

#[tokio::test]
async fn test_batch_partial_failure_does_not_cancel_siblings() {
    let scheduler = ActionScheduler::simulated(create_test_days(), config(0.5, (0, 5)));

    let outcomes = scheduler
        .execute_all_automated(schedule_date())
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 3);
    for outcome in &outcomes {
        let status = scheduler.get_action(&outcome.action_id).unwrap().status;
        let expected = if outcome.success {
            ActionStatus::Completed
        } else {
            ActionStatus::Failed
        };
        assert_eq!(status, expected);
    }
}

// ==========================================
// 事件与取消
// ==========================================

#[tokio::test]
async fn test_events_are_published_in_order() {
    let publisher = Arc::new(RecordingPublisher::new());
    let scheduler = ActionScheduler::simulated(create_test_days(), config(1.0, (0, 2)))
        .with_publisher(publisher.clone());

    scheduler.execute("heat").await.unwrap();
    scheduler.reset("heat").unwrap();

    assert_eq!(
        publisher.types_for("heat"),
        vec![
            ActionEventType::Started,
            ActionEventType::Completed,
            ActionEventType::Reset
        ]
    );
    let completed = &publisher.events()[1];
    assert!(completed.sensor_deltas.is_some());
    assert!(completed.message.is_some());
}

#[tokio::test]
async fn test_abandoned_caller_does_not_cancel_execution() {
    let scheduler = ActionScheduler::simulated(create_test_days(), config(1.0, (40, 50)));

    let abandoned =
        tokio::time::timeout(Duration::from_millis(5), scheduler.execute("heat")).await;
    assert!(abandoned.is_err());
    assert_eq!(
        scheduler.get_action("heat").unwrap().status,
        ActionStatus::InProgress
    );
    assert_eq!(
        scheduler.reset("heat"),
        Err(EngineError::ActionInProgress("heat".to_string()))
    );

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(
        scheduler.get_action("heat").unwrap().status,
        ActionStatus::Completed
    );
}
