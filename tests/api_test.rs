// ==========================================
// API 层集成测试
// ==========================================
// 测试目标: ForecastApi / FinancialApi / ExecutionApi 在演示目录上的端到端行为
// ==========================================

mod helpers;

use greenhouse_forecast::api::{ApiError, ExecutionApi, FinancialApi, ForecastApi};
use greenhouse_forecast::catalog::StaticCatalog;
use greenhouse_forecast::config::{ForecastConfig, SchedulerConfig};
use greenhouse_forecast::domain::{
    ActionStatus, AutomationClass, ComprehensivePrediction, ExogenousFactors, WeatherForecast,
};
use helpers::recording_publisher::RecordingPublisher;
use helpers::test_data_builder::{base_date, GreenhouseBuilder};
use std::sync::Arc;

// ==========================================
// 测试辅助函数
// ==========================================

fn catalog() -> Arc<StaticCatalog> {
    Arc::new(
        StaticCatalog::demo().with_greenhouse(GreenhouseBuilder::new("GH-M").crop("melon").build()),
    )
}

fn forecast_api() -> ForecastApi {
    ForecastApi::new(catalog(), &ForecastConfig::default()).with_seed(42)
}

fn financial_api() -> FinancialApi {
    FinancialApi::new(catalog(), &ForecastConfig::default()).with_seed(42)
}

fn fast_scheduler() -> SchedulerConfig {
    SchedulerConfig {
        success_rate: 1.0,
        latency_min_ms: 0,
        latency_max_ms: 3,
        seed: Some(11),
        ..SchedulerConfig::default()
    }
}

async fn prediction_for(greenhouse_id: &str) -> ComprehensivePrediction {
    let api = forecast_api();
    let state = GreenhouseBuilder::new(greenhouse_id).build();
    api.run_for_state_at(&state, &ExogenousFactors::default(), base_date())
        .await
        .unwrap()
}

// ==========================================
// ForecastApi
// ==========================================

#[tokio::test]
async fn test_forecast_api_unknown_greenhouse() {
    let result = forecast_api()
        .run_comprehensive_prediction("GH-404", &ExogenousFactors::default())
        .await;
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[tokio::test]
async fn test_forecast_api_unknown_crop() {
    let result = forecast_api()
        .run_comprehensive_prediction("GH-M", &ExogenousFactors::default())
        .await;
    assert!(matches!(result, Err(ApiError::UnknownCropType(_))));
}

#[tokio::test]
async fn test_forecast_api_rejects_week_zero() {
    let state = GreenhouseBuilder::new("GH-W").week(0).build();
    let result = forecast_api()
        .run_for_state_at(&state, &ExogenousFactors::default(), base_date())
        .await;
    assert!(matches!(result, Err(ApiError::InvalidInput(_))));
}

#[tokio::test]
async fn test_forecast_api_seeded_runs_match() {
    let exogenous = ExogenousFactors::new(WeatherForecast::Rainy, 8.0);
    let state = GreenhouseBuilder::new("GH-S").build();

    let a = forecast_api()
        .run_for_state_at(&state, &exogenous, base_date())
        .await
        .unwrap();
    let b = forecast_api()
        .run_for_state_at(&state, &exogenous, base_date())
        .await
        .unwrap();

    assert_eq!(a, b);
    assert_eq!(a.action_schedule.len(), 7);
    assert_eq!(a.action_schedule[0].date, base_date().succ_opt().unwrap());
}

// ==========================================
// FinancialApi
// ==========================================

#[tokio::test]
async fn test_financial_api_complete_prediction() {
    let prediction = financial_api()
        .generate_complete_prediction("GH-A")
        .await
        .unwrap();

    assert_eq!(prediction.greenhouse.greenhouse_id, "GH-A");
    assert_eq!(prediction.summary.expected_yield, prediction.yield_forecast.total_yield);
    assert_eq!(
        prediction.summary.expected_revenue,
        prediction.revenue.summary.total_revenue
    );
    assert!(prediction.scenarios.optimistic.yield_kg >= prediction.scenarios.pessimistic.yield_kg);
    assert!(prediction.summary.confidence > 0.0 && prediction.summary.confidence <= 1.0);
}

#[tokio::test]
async fn test_financial_api_unknown_crop_and_greenhouse() {
    let api = financial_api();
    assert!(matches!(
        api.generate_complete_prediction("GH-M").await,
        Err(ApiError::UnknownCropType(_))
    ));
    assert!(matches!(
        api.generate_complete_prediction("GH-404").await,
        Err(ApiError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_financial_api_rejects_zero_horizon() {
    let result = financial_api()
        .with_horizon_days(0)
        .generate_complete_prediction("GH-A")
        .await;
    assert!(matches!(result, Err(ApiError::InvalidInput(_))));
}

#[tokio::test]
async fn test_farm_summary_over_demo_catalog() {
    let api = FinancialApi::new(Arc::new(StaticCatalog::demo()), &ForecastConfig::default())
        .with_seed(3);
    let farm = api.predict_farm_total().await.unwrap();

    assert_eq!(farm.predictions.len(), 4);
    let total_yield: f64 = farm
        .predictions
        .iter()
        .map(|p| p.summary.expected_yield)
        .sum();
    assert!((farm.summary.total_yield - total_yield).abs() < 1.0);

    let best = farm.summary.best_performing.as_ref().unwrap();
    let worst = farm.summary.worst_performing.as_ref().unwrap();
    assert!(best.roi_percent >= worst.roi_percent);
}

// ==========================================
// ExecutionApi
// ==========================================

#[tokio::test]
async fn test_execution_api_execute_twice_conflicts() {
    let prediction = prediction_for("GH-E").await;
    let publisher = Arc::new(RecordingPublisher::new());
    let api = ExecutionApi::from_prediction(&prediction, fast_scheduler(), Some(publisher.clone()));

    let action_id = prediction.action_schedule[0].actions[0].id.clone();
    let outcome = api.execute_action(&action_id).await.unwrap();
    assert!(outcome.success);
    assert_eq!(api.get_action(&action_id).unwrap().status, ActionStatus::Completed);

    let second = api.execute_action(&action_id).await;
    assert!(matches!(second, Err(ApiError::ActionStateConflict(_))));

    assert!(!publisher.types_for(&action_id).is_empty());
}

#[tokio::test]
async fn test_execution_api_input_and_lookup_errors() {
    let prediction = prediction_for("GH-E").await;
    let api = ExecutionApi::from_prediction(&prediction, fast_scheduler(), None);

    assert!(matches!(
        api.execute_action("  ").await,
        Err(ApiError::InvalidInput(_))
    ));
    assert!(matches!(
        api.execute_action("no-such-action").await,
        Err(ApiError::NotFound(_))
    ));
    assert!(matches!(
        api.day_progress(base_date()),
        Err(ApiError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_execution_api_automated_day_and_reset() {
    let prediction = prediction_for("GH-E").await;
    let api = ExecutionApi::from_prediction(&prediction, fast_scheduler(), None);
    let first_day = prediction.action_schedule[0].date;

    let outcomes = api.execute_automated(first_day).await.unwrap();
    assert!(outcomes.iter().all(|o| o.success));

    let day = api
        .day_schedules()
        .unwrap()
        .into_iter()
        .find(|d| d.date == first_day)
        .unwrap();
    for action in &day.actions {
        let expected = if action.automation == AutomationClass::Full {
            ActionStatus::Completed
        } else {
            ActionStatus::Pending
        };
        assert_eq!(action.status, expected, "action {}", action.id);
    }
    assert!(api.day_progress(first_day).unwrap() >= 0.0);

    if let Some(done) = outcomes.first() {
        let reset = api.reset_action(&done.action_id).unwrap();
        assert_eq!(reset.status, ActionStatus::Pending);
    }
}
