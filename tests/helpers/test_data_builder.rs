// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use chrono::{NaiveDate, NaiveTime};
use greenhouse_forecast::catalog::{standard_band, standard_snapshot};
use greenhouse_forecast::domain::{
    ActionCategory, AutomationClass, DaySchedule, EnvironmentSnapshot, GreenhouseProfile,
    GreenhouseState, Intervention, MetricBand, MetricKind, MetricReading, Urgency,
};
use rand::rngs::mock::StepRng;

/// 基准日 (2025-03-03 周一, 预测第1天为周二)
pub fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
}

/// 每次抽样都为 0.5 的随机源 (噪声项为 0)
pub fn neutral_rng() -> StepRng {
    StepRng::new(1 << 63, 0)
}

/// 全部指标处于最适区间的快照
pub fn optimal_values() -> [f64; 6] {
    [21.5, 67.5, 600.0, 30000.0, 52.5, 6.4]
}

// ==========================================
// EnvironmentSnapshot 构建器
// ==========================================

pub struct SnapshotBuilder {
    snapshot: EnvironmentSnapshot,
}

impl SnapshotBuilder {
    pub fn new(greenhouse_id: &str) -> Self {
        Self {
            snapshot: EnvironmentSnapshot::new(greenhouse_id),
        }
    }

    /// 全部六项指标取最适中值
    pub fn optimal(greenhouse_id: &str) -> Self {
        Self {
            snapshot: standard_snapshot(greenhouse_id, optimal_values()),
        }
    }

    /// 以标准区间设置指标
    pub fn metric(mut self, metric: MetricKind, value: f64) -> Self {
        self.snapshot
            .insert(MetricReading::new(metric, value, standard_band(metric)));
        self
    }

    /// 以自定义区间设置指标
    pub fn metric_with_band(mut self, metric: MetricKind, value: f64, band: MetricBand) -> Self {
        self.snapshot.insert(MetricReading::new(metric, value, band));
        self
    }

    pub fn without(mut self, metric: MetricKind) -> Self {
        self.snapshot.readings.remove(&metric);
        self
    }

    pub fn build(self) -> EnvironmentSnapshot {
        self.snapshot
    }
}

// ==========================================
// GreenhouseState 构建器
// ==========================================

pub struct GreenhouseBuilder {
    profile: GreenhouseProfile,
    snapshot: Option<EnvironmentSnapshot>,
}

impl GreenhouseBuilder {
    pub fn new(greenhouse_id: &str) -> Self {
        Self {
            profile: GreenhouseProfile {
                greenhouse_id: greenhouse_id.to_string(),
                name: format!("{} 测试温室", greenhouse_id),
                crop_type: "strawberry".to_string(),
                area_sqm: 400.0,
                current_week: 12,
                season_start: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
            },
            snapshot: None,
        }
    }

    pub fn crop(mut self, crop_type: &str) -> Self {
        self.profile.crop_type = crop_type.to_string();
        self
    }

    pub fn area(mut self, area_sqm: f64) -> Self {
        self.profile.area_sqm = area_sqm;
        self
    }

    pub fn week(mut self, current_week: u32) -> Self {
        self.profile.current_week = current_week;
        self
    }

    pub fn snapshot(mut self, snapshot: EnvironmentSnapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    pub fn build(self) -> GreenhouseState {
        let snapshot = self
            .snapshot
            .unwrap_or_else(|| SnapshotBuilder::optimal(&self.profile.greenhouse_id).build());
        GreenhouseState {
            profile: self.profile,
            snapshot,
        }
    }
}

// ==========================================
// Intervention / DaySchedule
// ==========================================

pub fn intervention(
    id: &str,
    urgency: Urgency,
    automation: AutomationClass,
    cost: f64,
) -> Intervention {
    Intervention::new(
        id.to_string(),
        ActionCategory::EnvironmentControl,
        id.to_string(),
        String::new(),
        urgency,
        automation,
        NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        30,
        cost,
    )
}

pub fn day_schedule(date: NaiveDate, day_index: u32, actions: Vec<Intervention>) -> DaySchedule {
    DaySchedule::new(date, day_index, 0.85, actions)
}
