// ==========================================
// 温室预测排程核心 - 作业推导引擎
// ==========================================
// 职责: 逐日预测 → 当日所需作业 (已按优先级排序)
// 规则来源:
// 1) 阈值规则: 指标超出最适区间
// 2) 日历规则: 星期例行 / 生育阶段 / 季节
// 3) 预防规则: 复合条件
// 4) 兜底规则: 当日无任何作业时补一条监测
// 红线: 任何一天都不得为空
// ==========================================

use crate::config::DeriverConfig;
use crate::domain::action::{ActionCategory, ActionConditions, DaySchedule, Intervention};
use crate::domain::crop::{GrowthCalendar, WeekRange};
use crate::domain::forecast::ForecastDay;
use crate::domain::snapshot::MetricBand;
use crate::domain::types::{round2, AutomationClass, Direction, MetricKind, Urgency};
use crate::engine::priority::PrioritySorter;
use crate::engine::remedy::Remedy;
use crate::i18n::{t, t_with_args};
use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::{debug, info, instrument};

// ==========================================
// 生育阶段作业 (Stage Task)
// ==========================================

/// 执行频率
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFrequency {
    Once,       // 仅预测第1天
    Weekly,     // day_index % 7 == 1
    Daily,
    Continuous,
}

/// 已登记排期的阶段作业
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageTask {
    Transplanting,
    Establishment,
    IrrigationManagement,
    TemperatureManagement,
    DiseasePrevention,
    ChillingTreatment,
    PollinationManagement,
    FruitManagement,
    Harvesting,
}

/// 阶段作业排期
#[derive(Debug, Clone, Copy)]
pub struct StageTaskSchedule {
    pub weeks: WeekRange,
    pub frequency: TaskFrequency,
    pub duration_minutes: u32,
    pub cost: f64,
    pub automation: AutomationClass,
}

impl StageTask {
    pub fn key(&self) -> &'static str {
        match self {
            StageTask::Transplanting => "transplanting",
            StageTask::Establishment => "establishment",
            StageTask::IrrigationManagement => "irrigation_management",
            StageTask::TemperatureManagement => "temperature_management",
            StageTask::DiseasePrevention => "disease_prevention",
            StageTask::ChillingTreatment => "chilling_treatment",
            StageTask::PollinationManagement => "pollination_management",
            StageTask::FruitManagement => "fruit_management",
            StageTask::Harvesting => "harvesting",
        }
    }

    pub fn schedule(&self) -> StageTaskSchedule {
        use AutomationClass::{Full, Manual, Semi};
        use TaskFrequency::{Continuous, Daily, Once, Weekly};

        let (weeks, frequency, duration_minutes, cost, automation) = match self {
            StageTask::Transplanting => (WeekRange::single(1), Once, 300, 50000.0, Manual),
            StageTask::Establishment => (WeekRange::new(1, 2), Once, 30, 5000.0, Semi),
            StageTask::IrrigationManagement => (WeekRange::new(5, 12), Daily, 20, 3000.0, Full),
            StageTask::TemperatureManagement => {
                (WeekRange::new(5, 28), Continuous, 60, 15000.0, Full)
            }
            StageTask::DiseasePrevention => (WeekRange::new(8, 40), Weekly, 60, 20000.0, Semi),
            StageTask::ChillingTreatment => (WeekRange::new(13, 16), Once, 60, 10000.0, Full),
            StageTask::PollinationManagement => (WeekRange::new(21, 28), Once, 120, 8000.0, Full),
            StageTask::FruitManagement => (WeekRange::new(29, 40), Daily, 150, 12000.0, Semi),
            StageTask::Harvesting => (WeekRange::new(35, 52), Daily, 210, 25000.0, Semi),
        };

        StageTaskSchedule {
            weeks,
            frequency,
            duration_minutes,
            cost,
            automation,
        }
    }

    /// 当日是否执行
    pub fn is_due(&self, stage_week: u32, day_index: u32) -> bool {
        let schedule = self.schedule();
        if !schedule.weeks.contains(stage_week) {
            return false;
        }
        match schedule.frequency {
            TaskFrequency::Daily | TaskFrequency::Continuous => true,
            TaskFrequency::Weekly => day_index % 7 == 1,
            TaskFrequency::Once => day_index == 1,
        }
    }
}

impl FromStr for StageTask {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "transplanting" => Ok(StageTask::Transplanting),
            "establishment" => Ok(StageTask::Establishment),
            "irrigation_management" => Ok(StageTask::IrrigationManagement),
            "temperature_management" => Ok(StageTask::TemperatureManagement),
            "disease_prevention" => Ok(StageTask::DiseasePrevention),
            "chilling_treatment" => Ok(StageTask::ChillingTreatment),
            "pollination_management" => Ok(StageTask::PollinationManagement),
            "fruit_management" => Ok(StageTask::FruitManagement),
            "harvesting" => Ok(StageTask::Harvesting),
            other => Err(format!("未登记排期的阶段作业: {}", other)),
        }
    }
}

// ==========================================
// ActionDeriver - 作业推导引擎
// ==========================================
pub struct ActionDeriver {
    config: DeriverConfig,
    sorter: PrioritySorter,
}

impl ActionDeriver {
    pub fn new(config: DeriverConfig) -> Self {
        Self {
            config,
            sorter: PrioritySorter::new(),
        }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 批量推导 (每个预测日一份日排程)
    ///
    /// # 参数
    /// - days: 逐日预测
    /// - bands: 各指标最适/临界区间
    /// - calendar: 生育阶段日历
    /// - current_week: 当前栽培周
    #[instrument(skip(self, days, bands, calendar), fields(days = days.len(), crop = %calendar.crop_type))]
    pub fn derive_actions(
        &self,
        days: &[ForecastDay],
        bands: &BTreeMap<MetricKind, MetricBand>,
        calendar: &GrowthCalendar,
        current_week: u32,
    ) -> Vec<DaySchedule> {
        let schedules: Vec<DaySchedule> = days
            .iter()
            .map(|day| self.derive_day(day, bands, calendar, current_week))
            .collect();

        let total: usize = schedules.iter().map(|s| s.total_count).sum();
        info!(total_actions = total, "作业推导完成");
        schedules
    }

    /// 单日推导
    pub fn derive_day(
        &self,
        day: &ForecastDay,
        bands: &BTreeMap<MetricKind, MetricBand>,
        calendar: &GrowthCalendar,
        current_week: u32,
    ) -> DaySchedule {
        let stage_week = current_week + day.day_index / 7;

        let mut actions = Vec::new();
        actions.extend(self.threshold_actions(day, bands));
        actions.extend(self.routine_actions(day.date));
        actions.extend(self.stage_actions(day, calendar, stage_week));
        actions.extend(self.seasonal_actions(day.date));
        actions.extend(self.preventive_actions(day));

        if actions.is_empty() {
            debug!(date = %day.date, "当日无触发规则,补充兜底监测");
            actions.push(self.baseline_action(day.date));
        }

        let actions = self.sorter.sort(actions);
        DaySchedule::new(day.date, day.day_index, day.confidence, actions)
    }

    /// 阈值紧急度
    ///
    /// - 超出临界区间 → Critical
    /// - 偏离比例 ≥ high_deviation_ratio → High
    /// - 其他 → Medium
    pub fn threshold_urgency(&self, band: &MetricBand, value: f64) -> Urgency {
        if band.is_critical(value) {
            Urgency::Critical
        } else if band.deviation_ratio(value) >= self.config.high_deviation_ratio {
            Urgency::High
        } else {
            Urgency::Medium
        }
    }

    // ==========================================
    // 1) 阈值规则
    // ==========================================

    fn threshold_actions(
        &self,
        day: &ForecastDay,
        bands: &BTreeMap<MetricKind, MetricBand>,
    ) -> Vec<Intervention> {
        let mut actions = Vec::new();

        for (metric, value) in &day.predictions {
            let band = match bands.get(metric) {
                Some(band) => band,
                None => continue,
            };
            if band.is_optimal(*value) {
                continue;
            }

            let direction = if *value < band.optimal_low {
                Direction::TooLow
            } else {
                Direction::TooHigh
            };
            let remedy = Remedy::for_deviation(*metric, direction);
            let urgency = self.threshold_urgency(band, *value);

            let value_text = format!("{}", value);
            let low_text = format!("{}", band.optimal_low);
            let high_text = format!("{}", band.optimal_high);
            let metric_name = t(&format!("metric.{}", metric.as_str()));
            let description_key = match direction {
                Direction::TooLow => "action.threshold_low",
                Direction::TooHigh => "action.threshold_high",
            };

            let action = Intervention::new(
                format!("{}_{}_{}", metric.as_str(), direction.as_str(), day.date),
                ActionCategory::EnvironmentControl,
                t(&format!("remedy.{}", remedy.key())),
                t_with_args(
                    description_key,
                    &[
                        ("metric", metric_name.as_str()),
                        ("value", value_text.as_str()),
                        ("unit", metric.unit()),
                        ("low", low_text.as_str()),
                        ("high", high_text.as_str()),
                    ],
                ),
                urgency,
                remedy.automation(),
                remedy.scheduled_time(),
                remedy.duration_minutes(),
                remedy.cost(),
            )
            .with_conditions(ActionConditions {
                metric: *metric,
                current: *value,
                target_low: band.optimal_low,
                target_high: band.optimal_high,
                deviation_ratio: round2(band.deviation_ratio(*value)),
            });

            actions.push(action);
        }

        actions
    }

    // ==========================================
    // 2) 日历规则
    // ==========================================

    /// 星期例行作业: 周一设施点检 / 周三营养管理 / 周五病虫害监测
    fn routine_actions(&self, date: NaiveDate) -> Vec<Intervention> {
        let routine = match date.weekday() {
            Weekday::Mon => Some(("facility_inspection", AutomationClass::Full, 14, 60, 0.0)),
            Weekday::Wed => Some(("nutrition_management", AutomationClass::Semi, 11, 30, 5000.0)),
            Weekday::Fri => Some(("pest_monitoring", AutomationClass::Full, 15, 30, 0.0)),
            _ => None,
        };

        routine
            .map(|(key, automation, hour, duration, cost)| {
                Intervention::new(
                    format!("routine_{}_{}", key, date),
                    ActionCategory::Routine,
                    t(&format!("routine.{}.name", key)),
                    t(&format!("routine.{}.description", key)),
                    Urgency::Medium,
                    automation,
                    at_hour(hour),
                    duration,
                    cost,
                )
            })
            .into_iter()
            .collect()
    }

    /// 生育阶段作业
    fn stage_actions(
        &self,
        day: &ForecastDay,
        calendar: &GrowthCalendar,
        stage_week: u32,
    ) -> Vec<Intervention> {
        let stage = match calendar.stage_for_week(stage_week) {
            Some(stage) => stage,
            None => return Vec::new(),
        };

        let mut actions = Vec::new();
        let stage_name = t(&format!("stage.{}", stage.phase.as_str()));

        // 阶段周检
        if day.day_index % 7 == 1 {
            actions.push(Intervention::new(
                format!("stage_inspection_{}", day.date),
                ActionCategory::GrowthStage,
                t_with_args("stage_task.weekly_inspection.name", &[("stage", stage_name.as_str())]),
                t("stage_task.weekly_inspection.description"),
                Urgency::Low,
                AutomationClass::Semi,
                at_hour(9),
                30,
                0.0,
            ));
        }

        for target in &stage.target_interventions {
            let task = match StageTask::from_str(target) {
                Ok(task) => task,
                Err(_) => continue,
            };
            if !task.is_due(stage_week, day.day_index) {
                continue;
            }

            let schedule = task.schedule();
            actions.push(Intervention::new(
                format!("stage_{}_{}", task.key(), day.date),
                ActionCategory::GrowthStage,
                t(&format!("stage_task.{}.name", task.key())),
                t(&format!("stage_task.{}.description", task.key())),
                Urgency::Medium,
                schedule.automation,
                at_hour(10),
                schedule.duration_minutes,
                schedule.cost,
            ));
        }

        actions
    }

    /// 季节作业: 冬季保温 (12-2月, 日 ≡ 1 mod 7) / 夏季降温 (6-8月, 日 ≡ 1 mod 3)
    fn seasonal_actions(&self, date: NaiveDate) -> Vec<Intervention> {
        let month = date.month();
        let day_of_month = date.day();

        let seasonal = if matches!(month, 12 | 1 | 2) && day_of_month % 7 == 1 {
            Some(("winter_insulation", 18, 240, 15000.0))
        } else if (6..=8).contains(&month) && day_of_month % 3 == 1 {
            Some(("summer_cooling", 5, 240, 8000.0))
        } else {
            None
        };

        seasonal
            .map(|(key, hour, duration, cost)| {
                Intervention::new(
                    format!("seasonal_{}_{}", key, date),
                    ActionCategory::Seasonal,
                    t(&format!("seasonal.{}.name", key)),
                    t(&format!("seasonal.{}.description", key)),
                    Urgency::High,
                    AutomationClass::Full,
                    at_hour(hour),
                    duration,
                    cost,
                )
            })
            .into_iter()
            .collect()
    }

    // ==========================================
    // 3) 预防规则
    // ==========================================

    fn preventive_actions(&self, day: &ForecastDay) -> Vec<Intervention> {
        let mut actions = Vec::new();
        let temperature = day.value(MetricKind::Temperature);
        let humidity = day.value(MetricKind::Humidity);
        let soil_moisture = day.value(MetricKind::SoilMoisture);

        // 高温高湿 → 病害预防
        if let (Some(temp), Some(hum)) = (temperature, humidity) {
            if hum > self.config.disease_humidity_threshold
                && temp > self.config.disease_temperature_threshold
            {
                actions.push(self.preventive_action(
                    "disease",
                    day.date,
                    Urgency::Medium,
                    AutomationClass::Semi,
                    20,
                    60,
                    15000.0,
                ));
            }
        }

        // 温度偏离参考值 → 温度胁迫预防
        if let Some(temp) = temperature {
            if (temp - self.config.stress_reference_temperature).abs()
                > self.config.stress_temperature_tolerance
            {
                actions.push(self.preventive_action(
                    "temperature_stress",
                    day.date,
                    Urgency::Medium,
                    AutomationClass::Full,
                    12,
                    45,
                    5000.0,
                ));
            }
        }

        // 土壤过干 → 水分胁迫缓解
        if let Some(moisture) = soil_moisture {
            if moisture < self.config.moisture_stress_threshold {
                actions.push(self.preventive_action(
                    "moisture_stress",
                    day.date,
                    Urgency::High,
                    AutomationClass::Full,
                    8,
                    120,
                    5000.0,
                ));
            }
        }

        actions
    }

    #[allow(clippy::too_many_arguments)]
    fn preventive_action(
        &self,
        key: &str,
        date: NaiveDate,
        urgency: Urgency,
        automation: AutomationClass,
        hour: u32,
        duration: u32,
        cost: f64,
    ) -> Intervention {
        Intervention::new(
            format!("preventive_{}_{}", key, date),
            ActionCategory::Preventive,
            t(&format!("preventive.{}.name", key)),
            t(&format!("preventive.{}.description", key)),
            urgency,
            automation,
            at_hour(hour),
            duration,
            cost,
        )
    }

    // ==========================================
    // 4) 兜底规则
    // ==========================================

    fn baseline_action(&self, date: NaiveDate) -> Intervention {
        Intervention::new(
            format!("baseline_monitoring_{}", date),
            ActionCategory::Monitoring,
            t("baseline.monitoring.name"),
            t("baseline.monitoring.description"),
            Urgency::Low,
            AutomationClass::Full,
            at_hour(9),
            15,
            0.0,
        )
    }
}

impl Default for ActionDeriver {
    fn default() -> Self {
        Self::new(DeriverConfig::default())
    }
}

fn at_hour(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::crop::GrowthStage;
    use crate::domain::types::{GrowthPhase, WeatherForecast};

    fn create_test_bands() -> BTreeMap<MetricKind, MetricBand> {
        let mut bands = BTreeMap::new();
        bands.insert(MetricKind::Temperature, MetricBand::new(18.0, 25.0, 10.0, 32.0));
        bands.insert(MetricKind::Humidity, MetricBand::new(60.0, 75.0, 40.0, 85.0));
        bands.insert(MetricKind::SoilMoisture, MetricBand::new(40.0, 65.0, 30.0, 75.0));
        bands
    }

    fn create_test_day(day_index: u32, date: NaiveDate, values: &[(MetricKind, f64)]) -> ForecastDay {
        ForecastDay {
            day_index,
            date,
            predictions: values.iter().copied().collect(),
            confidence: 0.85,
            weather: WeatherForecast::Normal,
        }
    }

    fn empty_calendar() -> GrowthCalendar {
        GrowthCalendar {
            crop_type: "test".to_string(),
            stages: vec![],
        }
    }

    // 2025-03-04 是星期二
    fn tuesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()
    }

    #[test]
    fn test_threshold_breach_is_critical_cooling() {
        let deriver = ActionDeriver::default();
        let day = create_test_day(2, tuesday(), &[(MetricKind::Temperature, 35.0)]);
        let schedule = deriver.derive_day(&day, &create_test_bands(), &empty_calendar(), 10);

        let cooling = schedule
            .actions
            .iter()
            .find(|a| a.category == ActionCategory::EnvironmentControl)
            .unwrap();
        assert_eq!(cooling.urgency, Urgency::Critical);
        assert_eq!(cooling.id, "temperature_high_2025-03-04");
        assert_eq!(cooling.estimated_cost, Remedy::VentilationShading.cost());
        assert_eq!(schedule.actions[0].id, cooling.id);
    }

    #[test]
    fn test_threshold_urgency_scaling() {
        let deriver = ActionDeriver::default();
        let band = MetricBand::new(18.0, 25.0, 10.0, 35.0);
        assert_eq!(deriver.threshold_urgency(&band, 26.0), Urgency::Medium);
        assert_eq!(deriver.threshold_urgency(&band, 31.0), Urgency::High);
        assert_eq!(deriver.threshold_urgency(&band, 36.0), Urgency::Critical);
    }

    #[test]
    fn test_empty_day_gets_single_baseline() {
        let deriver = ActionDeriver::default();
        let day = create_test_day(
            2,
            tuesday(),
            &[(MetricKind::Temperature, 22.0), (MetricKind::Humidity, 65.0)],
        );
        let schedule = deriver.derive_day(&day, &create_test_bands(), &empty_calendar(), 10);

        assert_eq!(schedule.total_count, 1);
        assert_eq!(schedule.actions[0].category, ActionCategory::Monitoring);
        assert_eq!(schedule.actions[0].urgency, Urgency::Low);
    }

    #[test]
    fn test_stage_task_frequency() {
        assert!(StageTask::Transplanting.is_due(1, 1));
        assert!(!StageTask::Transplanting.is_due(1, 2));
        assert!(StageTask::DiseasePrevention.is_due(10, 8));
        assert!(!StageTask::DiseasePrevention.is_due(10, 3));
        assert!(StageTask::Harvesting.is_due(40, 5));
        assert!(!StageTask::Harvesting.is_due(30, 5));
        assert!("soil_preparation".parse::<StageTask>().is_err());
    }

    #[test]
    fn test_stage_actions_follow_calendar() {
        let deriver = ActionDeriver::default();
        let calendar = GrowthCalendar {
            crop_type: "strawberry".to_string(),
            stages: vec![GrowthStage {
                name: "vegetative".to_string(),
                phase: GrowthPhase::Vegetative,
                weeks: WeekRange::new(5, 12),
                key_metrics: vec![MetricKind::Temperature],
                target_interventions: vec![
                    "irrigation_management".to_string(),
                    "temperature_management".to_string(),
                    "foliar_feeding".to_string(),
                ],
            }],
        };

        let day = create_test_day(1, tuesday(), &[(MetricKind::Temperature, 22.0)]);
        let schedule = deriver.derive_day(&day, &create_test_bands(), &calendar, 6);

        let ids: Vec<&str> = schedule.actions.iter().map(|a| a.id.as_str()).collect();
        assert!(ids.contains(&"stage_inspection_2025-03-04"));
        assert!(ids.contains(&"stage_irrigation_management_2025-03-04"));
        assert!(ids.contains(&"stage_temperature_management_2025-03-04"));
        assert_eq!(schedule.total_count, 3);
    }

    #[test]
    fn test_preventive_rules() {
        let deriver = ActionDeriver::default();
        let day = create_test_day(
            2,
            tuesday(),
            &[
                (MetricKind::Temperature, 24.0),
                (MetricKind::Humidity, 82.0),
                (MetricKind::SoilMoisture, 20.0),
            ],
        );
        let schedule = deriver.derive_day(&day, &create_test_bands(), &empty_calendar(), 10);

        let ids: Vec<&str> = schedule.actions.iter().map(|a| a.id.as_str()).collect();
        assert!(ids.contains(&"preventive_disease_2025-03-04"));
        assert!(ids.contains(&"preventive_moisture_stress_2025-03-04"));
        assert!(!ids.contains(&"preventive_temperature_stress_2025-03-04"));
        assert!(deriver.sorter.is_sorted(&schedule.actions));
    }
}
