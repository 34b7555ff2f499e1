// ==========================================
// 温室预测排程核心 - 环境预测领域模型
// ==========================================
// 职责: 外部因素输入 + 逐日预测结果
// 红线: 预测结果生成后不可修改,重跑生成新序列
// ==========================================

use crate::domain::types::{MetricKind, WeatherForecast};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// ExogenousFactors - 外部因素
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExogenousFactors {
    pub weather_forecast: WeatherForecast,
    pub external_temperature: f64, // 室外温度 (°C)
}

impl Default for ExogenousFactors {
    fn default() -> Self {
        Self {
            weather_forecast: WeatherForecast::Normal,
            external_temperature: 20.0,
        }
    }
}

impl ExogenousFactors {
    pub fn new(weather_forecast: WeatherForecast, external_temperature: f64) -> Self {
        Self {
            weather_forecast,
            external_temperature,
        }
    }
}

// ==========================================
// ForecastDay - 单日预测
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub day_index: u32, // 1..=N
    pub date: NaiveDate,
    pub predictions: BTreeMap<MetricKind, f64>,
    pub confidence: f64,
    pub weather: WeatherForecast,
}

impl ForecastDay {
    pub fn value(&self, metric: MetricKind) -> Option<f64> {
        self.predictions.get(&metric).copied()
    }
}
