// ==========================================
// YieldForecaster 集成测试
// ==========================================
// 测试目标: 环境评分 / 周区间 / 非负产量 / 采收曲线 / 置信度降级
// ==========================================

mod helpers;

use approx::assert_relative_eq;
use chrono::NaiveDate;
use greenhouse_forecast::catalog::static_catalog::{demo_crop_models, strawberry_stages};
use greenhouse_forecast::domain::{
    CropModel, CultivationContext, EnvironmentSnapshot, GrowthCalendar, MetricKind,
    RiskFactorKind, RiskSeverity,
};
use greenhouse_forecast::engine::{EngineError, YieldForecaster};
use helpers::test_data_builder::{neutral_rng, SnapshotBuilder};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ==========================================
// 测试辅助函数
// ==========================================

fn crop_model(crop_type: &str) -> CropModel {
    demo_crop_models()
        .into_iter()
        .find(|m| m.crop_type == crop_type)
        .unwrap()
}

fn calendar(crop_type: &str) -> GrowthCalendar {
    GrowthCalendar {
        crop_type: crop_type.to_string(),
        stages: strawberry_stages(),
    }
}

fn context(current_week: u32) -> CultivationContext {
    CultivationContext {
        area_sqm: 400.0,
        current_week,
        season_start: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
    }
}

/// 每个加权指标都取作物最适区间中点
fn midpoint_snapshot(model: &CropModel) -> EnvironmentSnapshot {
    model
        .environment_factors
        .iter()
        .fold(SnapshotBuilder::new("GH-Y"), |builder, (metric, factor)| {
            builder.metric(*metric, (factor.optimal_low + factor.optimal_high) / 2.0)
        })
        .build()
}

// ==========================================
// 环境评分与置信度
// ==========================================

#[test]
fn test_midpoint_scores_full_marks() {
    let engine = YieldForecaster::default();
    for model in demo_crop_models() {
        let score = engine.environment_score(&midpoint_snapshot(&model), &model);
        assert_eq!(score.score, 100.0, "crop {}", model.crop_type);
        assert!(score.missing_metrics.is_empty());
    }
}

#[test]
fn test_missing_metric_lowers_confidence_not_fatal() {
    let engine = YieldForecaster::default();
    let model = crop_model("strawberry");
    let full = midpoint_snapshot(&model);
    let partial = SnapshotBuilder::new("GH-Y")
        .metric(MetricKind::Humidity, 70.0)
        .metric(MetricKind::LightIntensity, 25000.0)
        .metric(MetricKind::Co2, 500.0)
        .metric(MetricKind::SoilMoisture, 62.5)
        .build();

    let full_forecast = engine
        .predict_yield(&full, &model, &calendar("strawberry"), &context(12), 28, &mut neutral_rng())
        .unwrap();
    let partial_forecast = engine
        .predict_yield(&partial, &model, &calendar("strawberry"), &context(12), 28, &mut neutral_rng())
        .unwrap();

    assert_eq!(partial_forecast.environment_score, 100.0);
    assert_eq!(partial_forecast.missing_metrics, vec![MetricKind::Temperature]);
    assert_relative_eq!(full_forecast.confidence, 0.95, epsilon = 1e-9);
    assert_relative_eq!(partial_forecast.confidence, 0.90, epsilon = 1e-9);
}

#[test]
fn test_non_positive_horizon_is_rejected() {
    let engine = YieldForecaster::default();
    let model = crop_model("tomato");
    let result = engine.predict_yield(
        &midpoint_snapshot(&model),
        &model,
        &calendar("tomato"),
        &context(10),
        0,
        &mut neutral_rng(),
    );
    assert_eq!(result, Err(EngineError::InvalidHorizon(0)));
}

// ==========================================
// 周区间与产量
// ==========================================

#[test]
fn test_week_range_is_capped_at_52() {
    let engine = YieldForecaster::default();
    let model = crop_model("tomato");
    let snapshot = midpoint_snapshot(&model);

    let late = engine
        .predict_yield(&snapshot, &model, &calendar("tomato"), &context(48), 90, &mut neutral_rng())
        .unwrap();
    let weeks: Vec<u32> = late.weekly_yields.iter().map(|w| w.week).collect();
    assert_eq!(weeks, vec![48, 49, 50, 51, 52]);

    let short = engine
        .predict_yield(&snapshot, &model, &calendar("tomato"), &context(10), 1, &mut neutral_rng())
        .unwrap();
    assert_eq!(short.weekly_yields.len(), 2);
}

#[test]
fn test_oversized_horizon_is_clamped_to_week_52() {
    let engine = YieldForecaster::default();
    let model = crop_model("tomato");
    let snapshot = midpoint_snapshot(&model);

    for horizon in [i64::MAX, i64::from(u32::MAX) * 7, 10_000] {
        let forecast = engine
            .predict_yield(&snapshot, &model, &calendar("tomato"), &context(10), horizon, &mut neutral_rng())
            .unwrap();
        let weeks: Vec<u32> = forecast.weekly_yields.iter().map(|w| w.week).collect();
        assert_eq!(weeks, (10..=52).collect::<Vec<u32>>(), "horizon {}", horizon);
    }
}

#[test]
fn test_yield_is_never_negative() {
    let engine = YieldForecaster::default();
    let mut rng = StdRng::seed_from_u64(99);

    for model in demo_crop_models() {
        for _ in 0..10 {
            let snapshot = SnapshotBuilder::new("GH-Y")
                .metric(MetricKind::Temperature, rng.gen_range(-5.0..45.0))
                .metric(MetricKind::Humidity, rng.gen_range(10.0..100.0))
                .metric(MetricKind::Co2, rng.gen_range(100.0..2000.0))
                .metric(MetricKind::LightIntensity, rng.gen_range(0.0..80000.0))
                .metric(MetricKind::SoilMoisture, rng.gen_range(0.0..100.0))
                .build();
            let week = rng.gen_range(1..=52);

            let forecast = engine
                .predict_yield(&snapshot, &model, &calendar(&model.crop_type), &context(week), 90, &mut rng)
                .unwrap();

            assert!(forecast.total_yield >= 0.0);
            assert!(forecast.weekly_yields.iter().all(|w| w.yield_kg >= 0.0));
            assert!(forecast.confidence >= 0.5 && forecast.confidence <= 0.95);
            assert!(forecast
                .harvest_schedule
                .iter()
                .all(|task| task.yield_kg > 0.0));
        }
    }
}

#[test]
fn test_harvest_curve_bounded_for_all_models() {
    for model in demo_crop_models() {
        for week in 0..=70 {
            let h = YieldForecaster::harvest_curve(week, model.peak_weeks);
            assert!((0.0..=1.0).contains(&h), "crop {} week {} -> {}", model.crop_type, week, h);
        }
    }
}

#[test]
fn test_peak_weeks_yield_more_than_ramp() {
    let engine = YieldForecaster::default();
    let model = crop_model("tomato");
    let forecast = engine
        .predict_yield(
            &midpoint_snapshot(&model),
            &model,
            &calendar("tomato"),
            &context(14),
            84,
            &mut neutral_rng(),
        )
        .unwrap();

    // 第14周在爬升段之前, 第26周位于盛产期
    let week14 = forecast.weekly_yields.iter().find(|w| w.week == 14).unwrap();
    let week26 = forecast.weekly_yields.iter().find(|w| w.week == 26).unwrap();
    assert_eq!(week14.yield_kg, 0.0);
    assert!(week26.yield_kg > 0.0);
    assert_eq!(week26.stage_name.as_deref(), Some("flowering"));
}

// ==========================================
// 风险因子
// ==========================================

#[test]
fn test_critical_metric_and_poor_environment_risks() {
    let engine = YieldForecaster::default();
    let model = crop_model("tomato");
    let snapshot = SnapshotBuilder::new("GH-Y")
        .metric(MetricKind::Temperature, 38.0)
        .metric(MetricKind::Humidity, 95.0)
        .build();

    let forecast = engine
        .predict_yield(&snapshot, &model, &calendar("tomato"), &context(22), 28, &mut neutral_rng())
        .unwrap();

    assert!(forecast.environment_score < 70.0);
    let kinds: Vec<RiskFactorKind> = forecast.risk_factors.iter().map(|r| r.kind).collect();
    assert!(kinds.contains(&RiskFactorKind::PoorEnvironment));
    assert!(kinds.contains(&RiskFactorKind::CriticalMetric(MetricKind::Temperature)));
    assert!(kinds.contains(&RiskFactorKind::CriticalMetric(MetricKind::Humidity)));
    // 第22周处于开花期且湿度 > 80
    assert!(kinds.contains(&RiskFactorKind::FloweringHumidity));
    assert_eq!(forecast.max_severity(), Some(RiskSeverity::Critical));
}
