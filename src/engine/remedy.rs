// ==========================================
// 温室预测排程核心 - 调节措施表
// ==========================================
// 职责: (指标, 偏离方向) → 调节措施 的穷举映射
// 红线: 新增指标必须在此补齐两个方向的措施
// ==========================================

use crate::domain::types::{AutomationClass, Direction, MetricKind};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Remedy - 调节措施
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Remedy {
    Heating,              // 温度过低
    VentilationShading,   // 温度过高
    Humidification,       // 湿度过低
    Dehumidification,     // 湿度过高
    Co2Enrichment,        // CO₂ 过低
    Co2Venting,           // CO₂ 过高
    SupplementalLighting, // 光照不足
    ShadeScreen,          // 光照过强
    Irrigation,           // 土壤过干
    Drainage,             // 土壤过湿
    LimeApplication,      // pH 过低
    SulfurTreatment,      // pH 过高
}

impl Remedy {
    /// 查表
    pub fn for_deviation(metric: MetricKind, direction: Direction) -> Remedy {
        match (metric, direction) {
            (MetricKind::Temperature, Direction::TooLow) => Remedy::Heating,
            (MetricKind::Temperature, Direction::TooHigh) => Remedy::VentilationShading,
            (MetricKind::Humidity, Direction::TooLow) => Remedy::Humidification,
            (MetricKind::Humidity, Direction::TooHigh) => Remedy::Dehumidification,
            (MetricKind::Co2, Direction::TooLow) => Remedy::Co2Enrichment,
            (MetricKind::Co2, Direction::TooHigh) => Remedy::Co2Venting,
            (MetricKind::LightIntensity, Direction::TooLow) => Remedy::SupplementalLighting,
            (MetricKind::LightIntensity, Direction::TooHigh) => Remedy::ShadeScreen,
            (MetricKind::SoilMoisture, Direction::TooLow) => Remedy::Irrigation,
            (MetricKind::SoilMoisture, Direction::TooHigh) => Remedy::Drainage,
            (MetricKind::SoilPh, Direction::TooLow) => Remedy::LimeApplication,
            (MetricKind::SoilPh, Direction::TooHigh) => Remedy::SulfurTreatment,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Remedy::Heating => "heating",
            Remedy::VentilationShading => "ventilation_shading",
            Remedy::Humidification => "humidification",
            Remedy::Dehumidification => "dehumidification",
            Remedy::Co2Enrichment => "co2_enrichment",
            Remedy::Co2Venting => "co2_venting",
            Remedy::SupplementalLighting => "supplemental_lighting",
            Remedy::ShadeScreen => "shade_screen",
            Remedy::Irrigation => "irrigation",
            Remedy::Drainage => "drainage",
            Remedy::LimeApplication => "lime_application",
            Remedy::SulfurTreatment => "sulfur_treatment",
        }
    }

    pub fn automation(&self) -> AutomationClass {
        match self {
            Remedy::Drainage | Remedy::LimeApplication | Remedy::SulfurTreatment => {
                AutomationClass::Manual
            }
            _ => AutomationClass::Full,
        }
    }

    /// 预计耗时 (分钟)
    pub fn duration_minutes(&self) -> u32 {
        match self {
            Remedy::Heating => 180,
            Remedy::VentilationShading => 120,
            Remedy::Humidification => 45,
            Remedy::Dehumidification => 90,
            Remedy::Co2Enrichment => 5,
            Remedy::Co2Venting => 30,
            Remedy::SupplementalLighting => 5,
            Remedy::ShadeScreen => 30,
            Remedy::Irrigation => 30,
            Remedy::Drainage => 360,
            Remedy::LimeApplication | Remedy::SulfurTreatment => 60,
        }
    }

    /// 预计成本 (원)
    pub fn cost(&self) -> f64 {
        match self {
            Remedy::Heating => 25000.0,
            Remedy::VentilationShading => 8000.0,
            Remedy::Humidification => 5000.0,
            Remedy::Dehumidification => 12000.0,
            Remedy::Co2Enrichment => 15000.0,
            Remedy::Co2Venting => 3000.0,
            Remedy::SupplementalLighting => 20000.0,
            Remedy::ShadeScreen => 5000.0,
            Remedy::Irrigation => 3000.0,
            Remedy::Drainage => 2000.0,
            Remedy::LimeApplication | Remedy::SulfurTreatment => 10000.0,
        }
    }

    /// 计划执行时刻
    pub fn scheduled_time(&self) -> NaiveTime {
        let hour = match self {
            Remedy::Heating | Remedy::VentilationShading => 6,
            Remedy::Humidification | Remedy::Dehumidification => 7,
            Remedy::Irrigation | Remedy::Drainage => 8,
            Remedy::Co2Enrichment | Remedy::Co2Venting => 9,
            Remedy::SupplementalLighting | Remedy::ShadeScreen => 10,
            Remedy::LimeApplication | Remedy::SulfurTreatment => 13,
        };
        NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN)
    }
}
