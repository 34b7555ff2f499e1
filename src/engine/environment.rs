// ==========================================
// 温室预测排程核心 - 环境预测引擎
// ==========================================
// 职责: 从当前快照逐日外推各环境指标
// 模型: predicted = base + seasonal + weather + trend + noise
// 红线: 快照缺失的指标直接跳过,不编造数值
// ==========================================

use crate::config::EnvironmentConfig;
use crate::domain::forecast::{ExogenousFactors, ForecastDay};
use crate::domain::snapshot::EnvironmentSnapshot;
use crate::domain::types::{round1, round2, MetricKind, WeatherForecast};
use crate::engine::error::EngineError;
use chrono::{Datelike, Duration, NaiveDate};
use rand::Rng;
use std::collections::BTreeMap;
use std::f64::consts::PI;
use tracing::{debug, info, instrument};

/// 单次逐日预测的最大天数
pub const MAX_HORIZON_DAYS: u32 = 366;

// ==========================================
// EnvironmentForecaster - 环境预测引擎
// ==========================================
pub struct EnvironmentForecaster {
    config: EnvironmentConfig,
}

impl EnvironmentForecaster {
    pub fn new(config: EnvironmentConfig) -> Self {
        Self { config }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 逐日预测
    ///
    /// # 参数
    /// - snapshot: 当前环境快照
    /// - horizon_days: 预测天数 (必须 > 0)
    /// - exogenous: 天气类别 + 室外温度
    /// - base_date: 基准日 (第1天 = base_date + 1)
    /// - rng: 随机源 (测试中可替换为固定序列)
    ///
    /// # 返回
    /// - Ok(Vec<ForecastDay>): day_index 1..=horizon_days
    /// - Err(InvalidHorizon): horizon_days ≤ 0 或超过 MAX_HORIZON_DAYS
    #[instrument(skip(self, snapshot, exogenous, rng), fields(greenhouse_id = %snapshot.greenhouse_id, metrics = snapshot.len()))]
    pub fn forecast<R: Rng + ?Sized>(
        &self,
        snapshot: &EnvironmentSnapshot,
        horizon_days: i64,
        exogenous: &ExogenousFactors,
        base_date: NaiveDate,
        rng: &mut R,
    ) -> Result<Vec<ForecastDay>, EngineError> {
        let horizon = match u32::try_from(horizon_days) {
            Ok(days) if (1..=MAX_HORIZON_DAYS).contains(&days) => days,
            _ => return Err(EngineError::InvalidHorizon(horizon_days)),
        };

        for metric in MetricKind::ALL {
            if snapshot.get(metric).is_none() {
                debug!(metric = %metric, "快照缺少指标,跳过预测");
            }
        }

        let mut days = Vec::with_capacity(horizon as usize);
        for d in 1..=horizon {
            let date = base_date + Duration::days(d as i64);
            let uncertainty = self.uncertainty(d);

            let mut predictions = BTreeMap::new();
            for (metric, reading) in &snapshot.readings {
                let noise = (rng.gen::<f64>() - 0.5) * Self::noise_span(*metric) * uncertainty;
                let predicted = reading.current_value
                    + Self::seasonal_delta(*metric, date)
                    + self.weather_delta(*metric, exogenous)
                    + Self::trend_delta(*metric, d)
                    + noise;
                predictions.insert(*metric, round1(predicted));
            }

            days.push(ForecastDay {
                day_index: d,
                date,
                predictions,
                confidence: self.confidence_for_day(d),
                weather: exogenous.weather_forecast,
            });
        }

        info!(days = days.len(), weather = exogenous.weather_forecast.as_str(), "环境预测完成");
        Ok(days)
    }

    /// 第 d 天的置信度 = clamp(max - decay·d, floor, max)
    pub fn confidence_for_day(&self, d: u32) -> f64 {
        let raw = self.config.confidence_max - self.config.confidence_decay_per_day * d as f64;
        round2(raw.clamp(self.config.confidence_floor, self.config.confidence_max))
    }

    /// 不确定度 = min(cap, k·d)
    pub fn uncertainty(&self, d: u32) -> f64 {
        (self.config.noise_growth_per_day * d as f64).min(self.config.noise_cap)
    }

    // ==========================================
    // 四项影响因子
    // ==========================================

    /// 季节项: 按年内日序的正弦周期
    pub fn seasonal_delta(metric: MetricKind, date: NaiveDate) -> f64 {
        let phase = date.ordinal() as f64 / 365.0 * 2.0 * PI;
        let month = date.month();
        match metric {
            MetricKind::Temperature => phase.sin() * 8.0,
            MetricKind::Humidity => phase.cos() * 10.0,
            MetricKind::LightIntensity => (phase + PI / 2.0).sin() * 3000.0,
            // 夏季蒸发量大
            MetricKind::SoilMoisture => {
                if (6..=8).contains(&month) {
                    -5.0
                } else {
                    3.0
                }
            }
            // 冬季通风少, CO₂ 积累
            MetricKind::Co2 => {
                if month >= 11 || month <= 2 {
                    50.0
                } else {
                    -30.0
                }
            }
            MetricKind::SoilPh => 0.0,
        }
    }

    /// 天气项: 天气类别固定增量 + 室外温度衰减传导
    pub fn weather_delta(&self, metric: MetricKind, exogenous: &ExogenousFactors) -> f64 {
        // (温度, 湿度, 土壤含水, CO₂, 光照)
        let (temperature, humidity, soil, co2, light) = match exogenous.weather_forecast {
            WeatherForecast::Sunny => (2.0, -5.0, 0.0, 0.0, 4000.0),
            WeatherForecast::Cloudy => (-1.0, 5.0, 0.0, 0.0, -8000.0),
            WeatherForecast::Rainy => (-3.0, 15.0, 10.0, 0.0, -12000.0),
            WeatherForecast::Storm => (-5.0, 25.0, 20.0, -100.0, -14000.0),
            WeatherForecast::Normal => (0.0, 0.0, 0.0, 0.0, 0.0),
        };

        match metric {
            MetricKind::Temperature => {
                temperature
                    + (exogenous.external_temperature - self.config.reference_outdoor_temp)
                        * self.config.insulation_damping
            }
            MetricKind::Humidity => humidity,
            MetricKind::SoilMoisture => soil,
            MetricKind::Co2 => co2,
            MetricKind::LightIntensity => light,
            MetricKind::SoilPh => 0.0,
        }
    }

    /// 趋势项: 随天数线性累积
    pub fn trend_delta(metric: MetricKind, d: u32) -> f64 {
        let d = d as f64;
        match metric {
            MetricKind::Temperature => 0.1 * d,
            MetricKind::Humidity => -0.2 * d,
            MetricKind::SoilMoisture => -0.5 * d,
            MetricKind::Co2 => 5.0 * d,
            MetricKind::LightIntensity => 100.0 * d,
            MetricKind::SoilPh => 0.0,
        }
    }

    /// 噪声幅度 (均匀分布全宽)
    fn noise_span(metric: MetricKind) -> f64 {
        match metric {
            MetricKind::Temperature => 4.0,
            MetricKind::Humidity => 10.0,
            MetricKind::SoilMoisture => 8.0,
            MetricKind::Co2 => 100.0,
            MetricKind::LightIntensity => 4000.0,
            MetricKind::SoilPh => 0.2,
        }
    }
}

impl Default for EnvironmentForecaster {
    fn default() -> Self {
        Self::new(EnvironmentConfig::default())
    }
}
