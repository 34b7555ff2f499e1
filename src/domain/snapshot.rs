// ==========================================
// 温室预测排程核心 - 环境快照领域模型
// ==========================================
// 职责: 指标读数 / 指标区间 / 温室当前状态
// 红线: 快照在一次预测中只读,不被引擎修改
// ==========================================

use crate::domain::types::{round1, MetricKind, MetricStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 执行后回写的传感器变化量
pub type SensorDeltas = BTreeMap<MetricKind, f64>;

// ==========================================
// MetricBand - 指标区间
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricBand {
    pub optimal_low: f64,   // 最适下限
    pub optimal_high: f64,  // 最适上限
    pub critical_low: f64,  // 临界下限
    pub critical_high: f64, // 临界上限
}

impl MetricBand {
    pub fn new(optimal_low: f64, optimal_high: f64, critical_low: f64, critical_high: f64) -> Self {
        Self {
            optimal_low,
            optimal_high,
            critical_low,
            critical_high,
        }
    }

    pub fn is_optimal(&self, value: f64) -> bool {
        value >= self.optimal_low && value <= self.optimal_high
    }

    pub fn is_critical(&self, value: f64) -> bool {
        value < self.critical_low || value > self.critical_high
    }

    pub fn midpoint(&self) -> f64 {
        (self.optimal_low + self.optimal_high) / 2.0
    }

    /// 指标状态分类
    pub fn classify(&self, value: f64) -> MetricStatus {
        if self.is_optimal(value) {
            MetricStatus::Optimal
        } else if self.is_critical(value) {
            MetricStatus::Critical
        } else {
            MetricStatus::Warning
        }
    }

    /// 偏离比例
    ///
    /// 超出最适边界的距离 / (最适边界 → 临界边界) 的宽度
    /// - 区间内: 0
    /// - 恰到临界边界: 1
    pub fn deviation_ratio(&self, value: f64) -> f64 {
        if value < self.optimal_low {
            let span = (self.optimal_low - self.critical_low).max(f64::EPSILON);
            (self.optimal_low - value) / span
        } else if value > self.optimal_high {
            let span = (self.critical_high - self.optimal_high).max(f64::EPSILON);
            (value - self.optimal_high) / span
        } else {
            0.0
        }
    }
}

// ==========================================
// MetricReading - 指标读数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricReading {
    pub metric: MetricKind,
    pub current_value: f64,
    pub unit: String,
    #[serde(flatten)]
    pub band: MetricBand,
}

impl MetricReading {
    pub fn new(metric: MetricKind, current_value: f64, band: MetricBand) -> Self {
        Self {
            metric,
            current_value,
            unit: metric.unit().to_string(),
            band,
        }
    }

    pub fn status(&self) -> MetricStatus {
        self.band.classify(self.current_value)
    }
}

// ==========================================
// EnvironmentSnapshot - 环境快照
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentSnapshot {
    pub greenhouse_id: String,
    pub readings: BTreeMap<MetricKind, MetricReading>,
}

impl EnvironmentSnapshot {
    pub fn new(greenhouse_id: impl Into<String>) -> Self {
        Self {
            greenhouse_id: greenhouse_id.into(),
            readings: BTreeMap::new(),
        }
    }

    /// 链式添加读数
    pub fn with_reading(mut self, reading: MetricReading) -> Self {
        self.insert(reading);
        self
    }

    pub fn insert(&mut self, reading: MetricReading) {
        self.readings.insert(reading.metric, reading);
    }

    pub fn get(&self, metric: MetricKind) -> Option<&MetricReading> {
        self.readings.get(&metric)
    }

    pub fn value(&self, metric: MetricKind) -> Option<f64> {
        self.readings.get(&metric).map(|r| r.current_value)
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// 各指标区间 (供作业推导使用)
    pub fn bands(&self) -> BTreeMap<MetricKind, MetricBand> {
        self.readings
            .iter()
            .map(|(metric, reading)| (*metric, reading.band))
            .collect()
    }

    /// 处于临界状态的指标
    pub fn critical_metrics(&self) -> Vec<MetricKind> {
        self.readings
            .values()
            .filter(|r| r.status() == MetricStatus::Critical)
            .map(|r| r.metric)
            .collect()
    }

    /// 叠加执行回报的传感器变化量,生成新快照
    ///
    /// 快照中不存在的指标忽略
    pub fn apply_deltas(&self, deltas: &SensorDeltas) -> Self {
        let mut next = self.clone();
        for (metric, delta) in deltas {
            if let Some(reading) = next.readings.get_mut(metric) {
                reading.current_value = round1(reading.current_value + delta);
            }
        }
        next
    }
}

// ==========================================
// GreenhouseProfile - 温室档案
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GreenhouseProfile {
    pub greenhouse_id: String,
    pub name: String,
    pub crop_type: String,
    pub area_sqm: f64,
    pub current_week: u32,
    pub season_start: NaiveDate, // 栽培起始日 (第1周)
}

// ==========================================
// GreenhouseState - 温室当前状态
// ==========================================
// 综合预测的输入: 档案 + 当前快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GreenhouseState {
    pub profile: GreenhouseProfile,
    pub snapshot: EnvironmentSnapshot,
}
