// ==========================================
// 温室预测排程核心 - 作物与市场领域模型
// ==========================================
// 职责: 作物产量模型 / 生育阶段日历 / 市场价格模型
// 红线: 静态配置数据,注入引擎,不做全局单例
// ==========================================

use crate::domain::types::{GrowthPhase, MetricKind, QualityGrade};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// WeekRange - 周区间 (闭区间)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekRange {
    pub start: u32,
    pub end: u32,
}

impl WeekRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// 单周区间
    pub fn single(week: u32) -> Self {
        Self {
            start: week,
            end: week,
        }
    }

    pub fn contains(&self, week: u32) -> bool {
        week >= self.start && week <= self.end
    }
}

// ==========================================
// EnvironmentFactor - 环境因子权重
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentFactor {
    pub optimal_low: f64,
    pub optimal_high: f64,
    pub weight: f64,
}

impl EnvironmentFactor {
    pub fn new(optimal_low: f64, optimal_high: f64, weight: f64) -> Self {
        Self {
            optimal_low,
            optimal_high,
            weight,
        }
    }
}

// ==========================================
// CropModel - 作物产量模型
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropModel {
    pub crop_type: String,
    pub base_yield_per_sqm: f64,   // kg/㎡ (整个采收期)
    pub harvest_period_days: u32,  // 采收期天数
    pub peak_weeks: WeekRange,     // 盛产周区间
    pub environment_factors: BTreeMap<MetricKind, EnvironmentFactor>,
    pub quality_factors: Vec<String>,
}

impl CropModel {
    /// 采收期周数
    pub fn harvest_period_weeks(&self) -> f64 {
        self.harvest_period_days as f64 / 7.0
    }
}

// ==========================================
// GrowthStage - 生育阶段
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthStage {
    pub name: String,
    pub phase: GrowthPhase,
    pub weeks: WeekRange,
    pub key_metrics: Vec<MetricKind>,
    /// 阶段作业类别名 (未登记排期的类别被忽略)
    pub target_interventions: Vec<String>,
}

/// 生育阶段日历 (区间互不重叠,按顺序首个命中)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthCalendar {
    pub crop_type: String,
    pub stages: Vec<GrowthStage>,
}

impl GrowthCalendar {
    pub fn stage_for_week(&self, week: u32) -> Option<&GrowthStage> {
        self.stages.iter().find(|s| s.weeks.contains(week))
    }
}

// ==========================================
// MarketModel - 市场价格模型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityPremium {
    pub premium: f64,
    pub standard: f64,
    pub economy: f64,
}

impl QualityPremium {
    pub fn for_grade(&self, grade: QualityGrade) -> f64 {
        match grade {
            QualityGrade::Premium => self.premium,
            QualityGrade::Standard => self.standard,
            QualityGrade::Economy => self.economy,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketModel {
    pub crop_type: String,
    pub base_price: f64,               // 원/kg
    pub month_multipliers: [f64; 12],  // 1月..12月
    pub quality_premium: QualityPremium,
}

impl MarketModel {
    /// 月度价格系数 (month: 1..=12, 越界按 1.0)
    pub fn month_multiplier(&self, month: u32) -> f64 {
        if (1..=12).contains(&month) {
            self.month_multipliers[(month - 1) as usize]
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_lookup_first_match() {
        let calendar = GrowthCalendar {
            crop_type: "strawberry".to_string(),
            stages: vec![
                GrowthStage {
                    name: "transplanting".to_string(),
                    phase: GrowthPhase::Transplanting,
                    weeks: WeekRange::new(1, 4),
                    key_metrics: vec![],
                    target_interventions: vec![],
                },
                GrowthStage {
                    name: "vegetative".to_string(),
                    phase: GrowthPhase::Vegetative,
                    weeks: WeekRange::new(5, 12),
                    key_metrics: vec![],
                    target_interventions: vec![],
                },
            ],
        };

        assert_eq!(calendar.stage_for_week(4).unwrap().phase, GrowthPhase::Transplanting);
        assert_eq!(calendar.stage_for_week(5).unwrap().phase, GrowthPhase::Vegetative);
        assert!(calendar.stage_for_week(13).is_none());
    }

    #[test]
    fn test_month_multiplier_bounds() {
        let market = MarketModel {
            crop_type: "tomato".to_string(),
            base_price: 8000.0,
            month_multipliers: [1.4, 1.5, 1.3, 1.1, 0.9, 0.8, 0.7, 0.8, 0.9, 1.1, 1.2, 1.3],
            quality_premium: QualityPremium {
                premium: 1.5,
                standard: 1.0,
                economy: 0.7,
            },
        };
        assert_eq!(market.month_multiplier(1), 1.4);
        assert_eq!(market.month_multiplier(12), 1.3);
        assert_eq!(market.month_multiplier(0), 1.0);
        assert_eq!(market.month_multiplier(13), 1.0);
    }
}
