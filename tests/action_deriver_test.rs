// ==========================================
// ActionDeriver 集成测试
// ==========================================
// 测试目标: 阈值 / 日历 / 预防 / 兜底 规则与优先级排序
// 覆盖范围: 预测 → 推导 全链路 (演示生育日历)
// ==========================================

mod helpers;

use chrono::NaiveDate;
use greenhouse_forecast::catalog::static_catalog::strawberry_stages;
use greenhouse_forecast::domain::{
    ActionCategory, ExogenousFactors, ForecastDay, GrowthCalendar, MetricBand, MetricKind,
    Urgency, WeatherForecast,
};
use greenhouse_forecast::engine::{ActionDeriver, EnvironmentForecaster, PrioritySorter};
use helpers::test_data_builder::{base_date, SnapshotBuilder};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

// ==========================================
// 测试辅助函数
// ==========================================

fn strawberry_calendar() -> GrowthCalendar {
    GrowthCalendar {
        crop_type: "strawberry".to_string(),
        stages: strawberry_stages(),
    }
}

fn empty_calendar() -> GrowthCalendar {
    GrowthCalendar {
        crop_type: "strawberry".to_string(),
        stages: vec![],
    }
}

fn forecast_day(date: NaiveDate, day_index: u32, values: &[(MetricKind, f64)]) -> ForecastDay {
    ForecastDay {
        day_index,
        date,
        predictions: values.iter().copied().collect(),
        confidence: 0.85,
        weather: WeatherForecast::Normal,
    }
}

fn temperature_bands(critical_high: f64) -> BTreeMap<MetricKind, MetricBand> {
    let mut bands = BTreeMap::new();
    bands.insert(
        MetricKind::Temperature,
        MetricBand::new(18.0, 25.0, 10.0, critical_high),
    );
    bands
}

// ==========================================
// 规则测试
// ==========================================

#[test]
fn test_critical_temperature_yields_critical_cooling() {
    let deriver = ActionDeriver::default();
    // 2025-03-06 周四: 无例行作业
    let day = forecast_day(
        NaiveDate::from_ymd_opt(2025, 3, 6).unwrap(),
        3,
        &[(MetricKind::Temperature, 35.0)],
    );

    let schedule = deriver.derive_day(&day, &temperature_bands(32.0), &empty_calendar(), 12);
    let first = &schedule.actions[0];

    assert_eq!(first.id, "temperature_high_2025-03-06");
    assert_eq!(first.urgency, Urgency::Critical);
    assert_eq!(first.category, ActionCategory::EnvironmentControl);
    let conditions = first.conditions.as_ref().unwrap();
    assert_eq!(conditions.current, 35.0);
    assert_eq!(conditions.target_high, 25.0);
    assert!(schedule.has_critical());
}

#[test]
fn test_empty_day_gets_single_baseline_action() {
    let deriver = ActionDeriver::default();
    // 2025-03-06 周四, 3月, day_index 3: 无例行 / 季节 / 阶段周检
    let day = forecast_day(
        NaiveDate::from_ymd_opt(2025, 3, 6).unwrap(),
        3,
        &[
            (MetricKind::Temperature, 22.0),
            (MetricKind::Humidity, 67.0),
            (MetricKind::SoilMoisture, 50.0),
        ],
    );

    let schedule = deriver.derive_day(&day, &temperature_bands(35.0), &empty_calendar(), 12);

    assert_eq!(schedule.total_count, 1);
    assert_eq!(schedule.actions[0].id, "baseline_monitoring_2025-03-06");
    assert_eq!(schedule.actions[0].category, ActionCategory::Monitoring);
    assert_eq!(schedule.actions[0].urgency, Urgency::Low);
}

#[test]
fn test_seasonal_rules() {
    let deriver = ActionDeriver::default();
    let bands = BTreeMap::new();

    // 1月8日: 8 % 7 == 1 → 冬季保温
    let winter = forecast_day(NaiveDate::from_ymd_opt(2025, 1, 8).unwrap(), 2, &[]);
    let schedule = deriver.derive_day(&winter, &bands, &empty_calendar(), 12);
    assert!(schedule
        .actions
        .iter()
        .any(|a| a.id == "seasonal_winter_insulation_2025-01-08" && a.urgency == Urgency::High));

    // 7月10日: 10 % 3 == 1 → 夏季降温
    let summer = forecast_day(NaiveDate::from_ymd_opt(2025, 7, 10).unwrap(), 2, &[]);
    let schedule = deriver.derive_day(&summer, &bands, &empty_calendar(), 12);
    assert!(schedule
        .actions
        .iter()
        .any(|a| a.id == "seasonal_summer_cooling_2025-07-10"));

    // 3月: 无季节作业
    let spring = forecast_day(NaiveDate::from_ymd_opt(2025, 3, 8).unwrap(), 2, &[]);
    let schedule = deriver.derive_day(&spring, &bands, &empty_calendar(), 12);
    assert!(schedule.actions.iter().all(|a| a.category != ActionCategory::Seasonal));
}

#[test]
fn test_stage_week_advances_with_day_index() {
    let deriver = ActionDeriver::default();
    let bands = BTreeMap::new();
    let calendar = strawberry_calendar();

    // 当前第12周 (营养生长期末), day 8 → 第13周 (花芽分化期, 低温处理仅首日)
    let day1 = forecast_day(NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(), 1, &[]);
    let day8 = forecast_day(NaiveDate::from_ymd_opt(2025, 3, 11).unwrap(), 8, &[]);

    let week12 = deriver.derive_day(&day1, &bands, &calendar, 12);
    assert!(week12
        .actions
        .iter()
        .any(|a| a.id == "stage_irrigation_management_2025-03-04"));

    let week13 = deriver.derive_day(&day8, &bands, &calendar, 12);
    assert!(week13
        .actions
        .iter()
        .all(|a| a.id != "stage_irrigation_management_2025-03-11"));
    assert!(week13
        .actions
        .iter()
        .any(|a| a.id == "stage_inspection_2025-03-11"));
}

// ==========================================
// 性质测试
// ==========================================

#[test]
fn test_every_day_is_non_empty_and_priority_sorted() {
    let forecaster = EnvironmentForecaster::default();
    let deriver = ActionDeriver::default();
    let sorter = PrioritySorter::new();
    let calendar = strawberry_calendar();
    let weathers = [
        WeatherForecast::Sunny,
        WeatherForecast::Cloudy,
        WeatherForecast::Rainy,
        WeatherForecast::Storm,
        WeatherForecast::Normal,
    ];

    let mut rng = StdRng::seed_from_u64(2025);
    for round in 0..30u32 {
        let snapshot = SnapshotBuilder::new("GH-P")
            .metric(MetricKind::Temperature, rng.gen_range(5.0..40.0))
            .metric(MetricKind::Humidity, rng.gen_range(30.0..95.0))
            .metric(MetricKind::Co2, rng.gen_range(300.0..1300.0))
            .metric(MetricKind::LightIntensity, rng.gen_range(10000.0..50000.0))
            .metric(MetricKind::SoilMoisture, rng.gen_range(15.0..80.0))
            .metric(MetricKind::SoilPh, rng.gen_range(5.0..8.0))
            .build();
        let exogenous = ExogenousFactors::new(
            weathers[(round as usize) % weathers.len()],
            rng.gen_range(-10.0..35.0),
        );
        let base = base_date() + chrono::Duration::days((round * 11) as i64);

        let days = forecaster
            .forecast(&snapshot, 7, &exogenous, base, &mut rng)
            .unwrap();
        let schedules = deriver.derive_actions(&days, &snapshot.bands(), &calendar, 1 + round);

        assert_eq!(schedules.len(), 7);
        for schedule in &schedules {
            assert!(!schedule.actions.is_empty());
            assert!(sorter.is_sorted(&schedule.actions));
            for pair in schedule.actions.windows(2) {
                let (a, b) = (&pair[0], &pair[1]);
                assert!(a.urgency.rank() >= b.urgency.rank());
                if a.urgency == b.urgency {
                    assert!(a.estimated_cost <= b.estimated_cost);
                }
            }
        }
    }
}
