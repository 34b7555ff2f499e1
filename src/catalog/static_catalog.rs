// ==========================================
// 温室预测排程核心 - 内存目录
// ==========================================
// 职责: CatalogReader 的内存实现 (不可变数据, 构造时注入)
// 数据: demo() 提供 5 个作物模型 / 3 个市场模型 / 草莓生育日历 / 4 个演示温室
// ==========================================

use crate::catalog::error::CatalogError;
use crate::catalog::reader::CatalogReader;
use crate::domain::crop::{
    CropModel, EnvironmentFactor, GrowthCalendar, GrowthStage, MarketModel, QualityPremium,
    WeekRange,
};
use crate::domain::snapshot::{
    EnvironmentSnapshot, GreenhouseProfile, GreenhouseState, MetricBand, MetricReading,
};
use crate::domain::types::{GrowthPhase, MetricKind};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

// ==========================================
// StaticCatalog - 内存目录
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    greenhouses: Vec<GreenhouseState>,
    crop_models: BTreeMap<String, CropModel>,
    market_models: BTreeMap<String, MarketModel>,
    stages: Vec<GrowthStage>,
}

impl StaticCatalog {
    pub fn new(
        greenhouses: Vec<GreenhouseState>,
        crop_models: Vec<CropModel>,
        market_models: Vec<MarketModel>,
        stages: Vec<GrowthStage>,
    ) -> Self {
        Self {
            greenhouses,
            crop_models: crop_models
                .into_iter()
                .map(|m| (m.crop_type.clone(), m))
                .collect(),
            market_models: market_models
                .into_iter()
                .map(|m| (m.crop_type.clone(), m))
                .collect(),
            stages,
        }
    }

    /// 追加或替换温室
    pub fn with_greenhouse(mut self, state: GreenhouseState) -> Self {
        self.greenhouses
            .retain(|g| g.profile.greenhouse_id != state.profile.greenhouse_id);
        self.greenhouses.push(state);
        self
    }

    /// 演示数据
    pub fn demo() -> Self {
        Self::new(
            demo_greenhouses(),
            demo_crop_models(),
            demo_market_models(),
            strawberry_stages(),
        )
    }

    /// 作物品种 → 基础市场 (tomato_organic → tomato)
    fn market_key(&self, crop_type: &str) -> Option<String> {
        if self.market_models.contains_key(crop_type) {
            return Some(crop_type.to_string());
        }
        self.market_models
            .keys()
            .find(|base| crop_type.contains(base.as_str()))
            .cloned()
    }

    fn find_state(&self, greenhouse_id: &str) -> Result<&GreenhouseState, CatalogError> {
        self.greenhouses
            .iter()
            .find(|g| g.profile.greenhouse_id == greenhouse_id)
            .ok_or_else(|| CatalogError::GreenhouseNotFound(greenhouse_id.to_string()))
    }
}

#[async_trait]
impl CatalogReader for StaticCatalog {
    async fn get_profile(&self, greenhouse_id: &str) -> Result<GreenhouseProfile, CatalogError> {
        Ok(self.find_state(greenhouse_id)?.profile.clone())
    }

    async fn get_snapshot(
        &self,
        greenhouse_id: &str,
    ) -> Result<EnvironmentSnapshot, CatalogError> {
        Ok(self.find_state(greenhouse_id)?.snapshot.clone())
    }

    async fn list_greenhouses(&self) -> Result<Vec<String>, CatalogError> {
        Ok(self
            .greenhouses
            .iter()
            .map(|g| g.profile.greenhouse_id.clone())
            .collect())
    }

    async fn get_crop_model(&self, crop_type: &str) -> Result<CropModel, CatalogError> {
        self.crop_models
            .get(crop_type)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownCropType(crop_type.to_string()))
    }

    async fn get_growth_calendar(&self, crop_type: &str) -> Result<GrowthCalendar, CatalogError> {
        if !self.crop_models.contains_key(crop_type) {
            return Err(CatalogError::UnknownCropType(crop_type.to_string()));
        }
        Ok(GrowthCalendar {
            crop_type: crop_type.to_string(),
            stages: self.stages.clone(),
        })
    }

    async fn get_market_model(&self, crop_type: &str) -> Result<MarketModel, CatalogError> {
        let key = self
            .market_key(crop_type)
            .ok_or_else(|| CatalogError::MarketDataNotFound(crop_type.to_string()))?;
        debug!(crop_type, market = %key, "市场模型映射");
        self.market_models
            .get(&key)
            .cloned()
            .ok_or(CatalogError::MarketDataNotFound(key))
    }
}

// ==========================================
// 演示数据
// ==========================================

/// 标准传感器区间 (最适低, 最适高, 临界低, 临界高)
pub fn standard_band(metric: MetricKind) -> MetricBand {
    match metric {
        MetricKind::Temperature => MetricBand::new(18.0, 25.0, 10.0, 35.0),
        MetricKind::Humidity => MetricBand::new(60.0, 75.0, 40.0, 85.0),
        MetricKind::Co2 => MetricBand::new(400.0, 800.0, 350.0, 1200.0),
        MetricKind::LightIntensity => MetricBand::new(20000.0, 40000.0, 15000.0, 45000.0),
        MetricKind::SoilMoisture => MetricBand::new(40.0, 65.0, 30.0, 75.0),
        MetricKind::SoilPh => MetricBand::new(6.0, 6.8, 5.5, 7.5),
    }
}

/// 以标准区间构造快照
///
/// values 顺序: 温度, 湿度, CO₂, 光照, 土壤含水率, pH
pub fn standard_snapshot(greenhouse_id: &str, values: [f64; 6]) -> EnvironmentSnapshot {
    MetricKind::ALL
        .iter()
        .zip(values)
        .fold(EnvironmentSnapshot::new(greenhouse_id), |snapshot, (metric, value)| {
            snapshot.with_reading(MetricReading::new(*metric, value, standard_band(*metric)))
        })
}

fn demo_greenhouse(
    id: &str,
    name: &str,
    crop_type: &str,
    area_sqm: f64,
    current_week: u32,
    season_start: (i32, u32, u32),
    values: [f64; 6],
) -> GreenhouseState {
    let (y, m, d) = season_start;
    GreenhouseState {
        profile: GreenhouseProfile {
            greenhouse_id: id.to_string(),
            name: name.to_string(),
            crop_type: crop_type.to_string(),
            area_sqm,
            current_week,
            season_start: NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default(),
        },
        snapshot: standard_snapshot(id, values),
    }
}

pub fn demo_greenhouses() -> Vec<GreenhouseState> {
    vec![
        demo_greenhouse(
            "GH-A",
            "A동 토마토",
            "tomato",
            500.0,
            15,
            (2025, 1, 15),
            [23.5, 68.0, 450.0, 28000.0, 58.0, 6.2],
        ),
        demo_greenhouse(
            "GH-B",
            "B동 딸기",
            "strawberry",
            400.0,
            12,
            (2025, 2, 1),
            [26.8, 82.0, 380.0, 22000.0, 45.0, 6.5],
        ),
        demo_greenhouse(
            "GH-C",
            "C동 프리미엄 딸기",
            "strawberry_premium",
            300.0,
            18,
            (2025, 1, 20),
            [21.2, 65.0, 520.0, 32000.0, 62.0, 6.1],
        ),
        demo_greenhouse(
            "GH-D",
            "D동 유기농 토마토",
            "tomato_organic",
            450.0,
            20,
            (2025, 1, 10),
            [18.5, 88.0, 320.0, 15000.0, 75.0, 5.8],
        ),
    ]
}

fn factors(entries: &[(MetricKind, f64, f64, f64)]) -> BTreeMap<MetricKind, EnvironmentFactor> {
    entries
        .iter()
        .map(|(metric, low, high, weight)| (*metric, EnvironmentFactor::new(*low, *high, *weight)))
        .collect()
}

fn quality(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

pub fn demo_crop_models() -> Vec<CropModel> {
    use MetricKind::{Co2, Humidity, LightIntensity, SoilMoisture, Temperature};

    vec![
        CropModel {
            crop_type: "tomato".to_string(),
            base_yield_per_sqm: 25.0,
            harvest_period_days: 60,
            peak_weeks: WeekRange::new(20, 35),
            environment_factors: factors(&[
                (Temperature, 22.0, 25.0, 0.25),
                (Humidity, 60.0, 70.0, 0.15),
                (LightIntensity, 25000.0, 35000.0, 0.30),
                (Co2, 600.0, 800.0, 0.20),
                (SoilMoisture, 50.0, 65.0, 0.10),
            ]),
            quality_factors: quality(&["size", "sugar", "firmness"]),
        },
        CropModel {
            crop_type: "strawberry".to_string(),
            base_yield_per_sqm: 4.5,
            harvest_period_days: 120,
            peak_weeks: WeekRange::new(25, 40),
            environment_factors: factors(&[
                (Temperature, 18.0, 23.0, 0.30),
                (Humidity, 65.0, 75.0, 0.20),
                (LightIntensity, 20000.0, 30000.0, 0.25),
                (Co2, 400.0, 600.0, 0.15),
                (SoilMoisture, 55.0, 70.0, 0.10),
            ]),
            quality_factors: quality(&["size", "sugar", "firmness"]),
        },
        CropModel {
            crop_type: "strawberry_premium".to_string(),
            base_yield_per_sqm: 3.8,
            harvest_period_days: 140,
            peak_weeks: WeekRange::new(28, 45),
            environment_factors: factors(&[
                (Temperature, 19.0, 22.0, 0.35),
                (Humidity, 60.0, 70.0, 0.25),
                (LightIntensity, 25000.0, 35000.0, 0.25),
                (Co2, 500.0, 700.0, 0.15),
            ]),
            quality_factors: quality(&["size", "sugar", "firmness"]),
        },
        CropModel {
            crop_type: "tomato_organic".to_string(),
            base_yield_per_sqm: 18.0,
            harvest_period_days: 70,
            peak_weeks: WeekRange::new(22, 38),
            environment_factors: factors(&[
                (Temperature, 20.0, 24.0, 0.30),
                (Humidity, 55.0, 65.0, 0.20),
                (LightIntensity, 20000.0, 30000.0, 0.25),
                (Co2, 400.0, 600.0, 0.15),
                (SoilMoisture, 45.0, 60.0, 0.10),
            ]),
            quality_factors: quality(&["size", "sugar", "organic"]),
        },
        CropModel {
            crop_type: "herbs".to_string(),
            base_yield_per_sqm: 2.2,
            harvest_period_days: 60,
            peak_weeks: WeekRange::new(8, 20),
            environment_factors: factors(&[
                (Temperature, 20.0, 26.0, 0.25),
                (Humidity, 50.0, 65.0, 0.20),
                (LightIntensity, 15000.0, 25000.0, 0.30),
                (Co2, 400.0, 600.0, 0.15),
                (SoilMoisture, 40.0, 55.0, 0.10),
            ]),
            quality_factors: quality(&["aroma", "freshness"]),
        },
    ]
}

pub fn demo_market_models() -> Vec<MarketModel> {
    vec![
        MarketModel {
            crop_type: "tomato".to_string(),
            base_price: 8000.0,
            month_multipliers: [1.4, 1.5, 1.3, 1.1, 0.9, 0.8, 0.7, 0.8, 0.9, 1.1, 1.2, 1.3],
            quality_premium: QualityPremium {
                premium: 1.5,
                standard: 1.0,
                economy: 0.7,
            },
        },
        MarketModel {
            crop_type: "strawberry".to_string(),
            base_price: 15000.0,
            month_multipliers: [1.8, 1.6, 1.4, 1.2, 1.0, 0.9, 0.8, 0.9, 1.0, 1.1, 1.3, 1.5],
            quality_premium: QualityPremium {
                premium: 2.0,
                standard: 1.0,
                economy: 0.6,
            },
        },
        MarketModel {
            crop_type: "herbs".to_string(),
            base_price: 25000.0,
            month_multipliers: [1.2, 1.3, 1.4, 1.5, 1.3, 1.1, 1.0, 1.0, 1.1, 1.2, 1.3, 1.2],
            quality_premium: QualityPremium {
                premium: 1.8,
                standard: 1.0,
                economy: 0.8,
            },
        },
    ]
}

fn stage(
    name: &str,
    phase: GrowthPhase,
    weeks: (u32, u32),
    key_metrics: Vec<MetricKind>,
    targets: &[&str],
) -> GrowthStage {
    GrowthStage {
        name: name.to_string(),
        phase,
        weeks: WeekRange::new(weeks.0, weeks.1),
        key_metrics,
        target_interventions: targets.iter().map(|s| s.to_string()).collect(),
    }
}

/// 草莓生育日历 (六个阶段, 周区间互不重叠)
pub fn strawberry_stages() -> Vec<GrowthStage> {
    use MetricKind::{Co2, Humidity, LightIntensity, SoilMoisture, Temperature};

    vec![
        stage(
            "transplanting",
            GrowthPhase::Transplanting,
            (1, 4),
            vec![SoilMoisture, Humidity],
            &["transplanting", "establishment", "soil_preparation"],
        ),
        stage(
            "vegetative",
            GrowthPhase::Vegetative,
            (5, 12),
            vec![Temperature, LightIntensity, Co2],
            &[
                "irrigation_management",
                "temperature_management",
                "disease_prevention",
                "foliar_feeding",
            ],
        ),
        stage(
            "flower_induction",
            GrowthPhase::FlowerInduction,
            (13, 20),
            vec![Temperature, LightIntensity],
            &[
                "chilling_treatment",
                "daylength_control",
                "nutrient_management",
                "pinching",
            ],
        ),
        stage(
            "flowering",
            GrowthPhase::Flowering,
            (21, 28),
            vec![Humidity, Temperature],
            &[
                "pollination_management",
                "temperature_adjustment",
                "ventilation_management",
                "flower_thinning",
            ],
        ),
        stage(
            "fruiting",
            GrowthPhase::Fruiting,
            (29, 40),
            vec![SoilMoisture, Temperature, LightIntensity],
            &[
                "fruit_management",
                "fruit_thinning",
                "quality_management",
                "calcium_supply",
            ],
        ),
        stage(
            "harvest",
            GrowthPhase::Harvest,
            (41, 52),
            vec![Humidity, Temperature],
            &[
                "harvesting",
                "quality_sorting",
                "storage_management",
                "next_crop_preparation",
            ],
        ),
    ]
}
