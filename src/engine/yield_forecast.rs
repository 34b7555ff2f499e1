// ==========================================
// 温室预测排程核心 - 产量预测引擎
// ==========================================
// 职责: 环境评分 → 周产量轨迹 / 品质分布 / 风险因素 / 采收计划
// 模型: 周产量 = 周基准 · 采收曲线 · 环境系数 · 季节系数 · 随机系数
// 红线: 产量不得为负; 采收曲线 ∈ [0, 1]
// ==========================================

use crate::config::YieldModelConfig;
use crate::domain::crop::{CropModel, GrowthCalendar, WeekRange};
use crate::domain::snapshot::EnvironmentSnapshot;
use crate::domain::types::{round1, round2, GrowthPhase, MetricKind, MetricStatus, RiskSeverity};
use crate::domain::yield_forecast::{
    CultivationContext, HarvestDifficulty, HarvestLaborCost, HarvestTask, HarvestWorkload,
    QualityDistribution, RiskFactor, RiskFactorKind, YieldForecast, YieldWeek,
};
use crate::engine::error::EngineError;
use crate::i18n::{t, t_with_args};
use chrono::{Duration, NaiveDate};
use rand::Rng;
use std::f64::consts::PI;
use tracing::{debug, info, instrument, warn};

/// 月份季节系数 (1月..12月)
const SEASONAL_MULTIPLIERS: [f64; 12] = [0.9, 0.95, 1.1, 1.2, 1.3, 1.1, 0.9, 0.8, 0.9, 1.0, 1.1, 1.0];

/// 周 → 月 换算 (近似值)
pub const WEEKS_PER_MONTH: f64 = 4.33;

/// 栽培周 → 月份 (1..=12)
pub fn month_of_week(week: u32) -> u32 {
    ((week as f64 / WEEKS_PER_MONTH).ceil() as u32).clamp(1, 12)
}

/// 环境评分结果
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentScore {
    pub score: f64,
    pub missing_metrics: Vec<MetricKind>,
}

// ==========================================
// YieldForecaster - 产量预测引擎
// ==========================================
pub struct YieldForecaster {
    config: YieldModelConfig,
}

impl YieldForecaster {
    pub fn new(config: YieldModelConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &YieldModelConfig {
        &self.config
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 产量预测
    ///
    /// # 参数
    /// - snapshot: 当前环境快照
    /// - crop_model: 作物模型
    /// - calendar: 生育阶段日历 (周 → 阶段名)
    /// - context: 面积 / 当前周 / 栽培起始日
    /// - horizon_days: 预测天数 (> 0)
    /// - rng: 随机源
    ///
    /// # 返回
    /// - 周区间 current_week ..= min(52, current_week + ceil(horizon_days / 7))
    #[instrument(skip(self, snapshot, crop_model, calendar, rng), fields(crop = %crop_model.crop_type, week = context.current_week))]
    pub fn predict_yield<R: Rng + ?Sized>(
        &self,
        snapshot: &EnvironmentSnapshot,
        crop_model: &CropModel,
        calendar: &GrowthCalendar,
        context: &CultivationContext,
        horizon_days: i64,
        rng: &mut R,
    ) -> Result<YieldForecast, EngineError> {
        if horizon_days <= 0 {
            return Err(EngineError::InvalidHorizon(horizon_days));
        }
        if context.area_sqm < 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "栽培面积不能为负: {}",
                context.area_sqm
            )));
        }

        // 1) 环境评分
        let environment = self.environment_score(snapshot, crop_model);
        for metric in &environment.missing_metrics {
            warn!(metric = %metric, "快照缺少作物模型加权指标,降低置信度");
        }

        // 2) 逐周产量
        let base_confidence = self.confidence(
            environment.score,
            context.current_week,
            environment.missing_metrics.len(),
        );
        // 周序号上限为 52, 超长预测期按 52 周截断
        let horizon_weeks = (horizon_days as f64 / 7.0).ceil().min(52.0) as u32;
        let last_week = context.current_week.saturating_add(horizon_weeks).min(52);
        let weekly_base = if crop_model.harvest_period_days == 0 {
            0.0
        } else {
            crop_model.base_yield_per_sqm * context.area_sqm / crop_model.harvest_period_weeks()
        };
        let environment_multiplier = environment.score / 100.0;

        let mut weekly_yields = Vec::new();
        for week in context.current_week..=last_week {
            let harvest_curve = Self::harvest_curve(week, crop_model.peak_weeks);
            let seasonal_multiplier = Self::seasonal_multiplier(week);
            let random_factor = 1.0 - self.config.random_variation
                + rng.gen::<f64>() * self.config.random_variation * 2.0;

            let raw = weekly_base
                * harvest_curve
                * environment_multiplier
                * seasonal_multiplier
                * random_factor;

            weekly_yields.push(YieldWeek {
                week,
                date: Self::week_date(context.season_start, week),
                yield_kg: round1(raw.max(0.0)),
                harvest_curve: round2(harvest_curve),
                environment_multiplier: round2(environment_multiplier),
                seasonal_multiplier,
                stage_name: calendar.stage_for_week(week).map(|s| s.name.clone()),
                confidence: self.weekly_confidence(base_confidence, week - context.current_week),
            });
        }

        let total_yield = round1(weekly_yields.iter().map(|w| w.yield_kg).sum());
        let yield_per_sqm = if context.area_sqm > 0.0 {
            round2(total_yield / context.area_sqm)
        } else {
            0.0
        };

        // 3) 品质 / 风险 / 采收计划
        let quality_distribution = Self::quality_distribution(environment.score);
        let risk_factors = self.risk_factors(snapshot, calendar, context.current_week, environment.score);
        let harvest_schedule = self.build_harvest_schedule(&weekly_yields);

        info!(
            weeks = weekly_yields.len(),
            total_yield,
            score = environment.score,
            confidence = base_confidence,
            risks = risk_factors.len(),
            "产量预测完成"
        );

        Ok(YieldForecast {
            crop_type: crop_model.crop_type.clone(),
            area_sqm: context.area_sqm,
            current_week: context.current_week,
            weekly_yields,
            total_yield,
            yield_per_sqm,
            quality_distribution,
            environment_score: environment.score,
            confidence: base_confidence,
            risk_factors,
            harvest_schedule,
            missing_metrics: environment.missing_metrics,
        })
    }

    // ==========================================
    // 环境评分
    // ==========================================

    /// 加权环境评分 (0..100, 取整)
    ///
    /// 只对快照中存在的指标加权; 缺失指标记录在 missing_metrics
    pub fn environment_score(
        &self,
        snapshot: &EnvironmentSnapshot,
        crop_model: &CropModel,
    ) -> EnvironmentScore {
        let mut weighted = 0.0;
        let mut total_weight = 0.0;
        let mut missing_metrics = Vec::new();

        for (metric, factor) in &crop_model.environment_factors {
            match snapshot.value(*metric) {
                Some(value) => {
                    weighted += Self::metric_score(value, factor.optimal_low, factor.optimal_high)
                        * factor.weight;
                    total_weight += factor.weight;
                }
                None => missing_metrics.push(*metric),
            }
        }

        let score = if total_weight > 0.0 {
            (weighted / total_weight).round()
        } else {
            debug!(crop = %crop_model.crop_type, "无可评分指标,环境评分记为0");
            0.0
        };

        EnvironmentScore {
            score,
            missing_metrics,
        }
    }

    /// 单指标评分: 区间内 100; 区间外按偏离量 / 容差线性衰减
    pub fn metric_score(value: f64, optimal_low: f64, optimal_high: f64) -> f64 {
        if value >= optimal_low && value <= optimal_high {
            return 100.0;
        }
        let deviation = (value - optimal_low).abs().min((value - optimal_high).abs());
        let tolerance = (optimal_low * 0.3).max(optimal_high * 0.3);
        if tolerance <= 0.0 {
            return 0.0;
        }
        (100.0 - deviation / tolerance * 100.0).max(0.0)
    }

    // ==========================================
    // 曲线与系数
    // ==========================================

    /// 采收曲线 h(week) ∈ [0, 1]
    ///
    /// - 盛产前5周之前: 0
    /// - 盛产前5周: 0 → 0.3 线性爬升
    /// - 盛产期: 0.3 + 0.7·sin(π·progress)
    /// - 盛产后8周: 1.0 → 0.1 线性衰减 (不低于 0.1)
    /// - 其后: 0
    pub fn harvest_curve(week: u32, peak: WeekRange) -> f64 {
        let week = week as f64;
        let start = peak.start as f64;
        let end = peak.end as f64;

        let value = if week < start - 5.0 {
            0.0
        } else if week < start {
            (week - (start - 5.0)) / 5.0 * 0.3
        } else if week <= end {
            let progress = if end > start {
                (week - start) / (end - start)
            } else {
                0.5
            };
            0.3 + 0.7 * (PI * progress).sin()
        } else if week < end + 8.0 {
            (1.0 - (week - end) / 8.0 * 0.9).max(0.1)
        } else {
            0.0
        };

        value.clamp(0.0, 1.0)
    }

    /// 季节系数 (按周换算月份)
    pub fn seasonal_multiplier(week: u32) -> f64 {
        SEASONAL_MULTIPLIERS[(month_of_week(week) - 1) as usize]
    }

    /// 第 week 周对应日期 (第1周 = 栽培起始日)
    pub fn week_date(season_start: NaiveDate, week: u32) -> NaiveDate {
        season_start + Duration::days(week.saturating_sub(1) as i64 * 7)
    }

    // ==========================================
    // 置信度
    // ==========================================

    /// 整体置信度
    ///
    /// 基准 0.8; 评分 ≥90 +0.15 / ≥80 +0.1 / ≥70 +0.05 / 其他 -0.1;
    /// 周次 ≥30 +0.1 / ≥20 +0.05 / <10 -0.05; 每个缺失指标扣罚
    pub fn confidence(&self, score: f64, current_week: u32, missing_count: usize) -> f64 {
        let mut confidence = 0.8;

        confidence += if score >= 90.0 {
            0.15
        } else if score >= 80.0 {
            0.1
        } else if score >= 70.0 {
            0.05
        } else {
            -0.1
        };

        if current_week >= 30 {
            confidence += 0.1;
        } else if current_week >= 20 {
            confidence += 0.05;
        } else if current_week < 10 {
            confidence -= 0.05;
        }

        confidence -= self.config.missing_metric_penalty * missing_count as f64;

        round2(confidence.clamp(self.config.confidence_min, self.config.confidence_max))
    }

    /// 周置信度随距离递减
    fn weekly_confidence(&self, base: f64, weeks_ahead: u32) -> f64 {
        round2(
            (base - self.config.weekly_confidence_decay * weeks_ahead as f64)
                .max(self.config.weekly_confidence_floor),
        )
    }

    // ==========================================
    // 品质与风险
    // ==========================================

    /// 品质分布 (premium / standard / economy, %)
    pub fn quality_distribution(score: f64) -> QualityDistribution {
        if score >= 90.0 {
            QualityDistribution::new(60.0, 35.0, 5.0)
        } else if score >= 80.0 {
            QualityDistribution::new(45.0, 45.0, 10.0)
        } else if score >= 70.0 {
            QualityDistribution::new(25.0, 55.0, 20.0)
        } else {
            QualityDistribution::new(10.0, 40.0, 50.0)
        }
    }

    fn risk_factors(
        &self,
        snapshot: &EnvironmentSnapshot,
        calendar: &GrowthCalendar,
        current_week: u32,
        score: f64,
    ) -> Vec<RiskFactor> {
        let mut risks = Vec::new();

        if score < self.config.poor_environment_threshold {
            let score_text = format!("{}", score);
            risks.push(RiskFactor {
                kind: RiskFactorKind::PoorEnvironment,
                severity: RiskSeverity::High,
                description: t_with_args(
                    "yield_risk.poor_environment.description",
                    &[("score", score_text.as_str())],
                ),
                impact: t("yield_risk.poor_environment.impact"),
            });
        }

        for reading in snapshot.readings.values() {
            if reading.status() != MetricStatus::Critical {
                continue;
            }
            let metric_name = t(&format!("metric.{}", reading.metric.as_str()));
            let value_text = format!("{}", reading.current_value);
            risks.push(RiskFactor {
                kind: RiskFactorKind::CriticalMetric(reading.metric),
                severity: RiskSeverity::Critical,
                description: t_with_args(
                    "yield_risk.critical_metric.description",
                    &[
                        ("metric", metric_name.as_str()),
                        ("value", value_text.as_str()),
                        ("unit", reading.unit.as_str()),
                    ],
                ),
                impact: t("yield_risk.critical_metric.impact"),
            });
        }

        let flowering = calendar
            .stage_for_week(current_week)
            .map(|s| s.phase == GrowthPhase::Flowering)
            .unwrap_or(false);
        if flowering {
            if let Some(humidity) = snapshot.value(MetricKind::Humidity) {
                if humidity > self.config.flowering_humidity_threshold {
                    let value_text = format!("{}", humidity);
                    risks.push(RiskFactor {
                        kind: RiskFactorKind::FloweringHumidity,
                        severity: RiskSeverity::Medium,
                        description: t_with_args(
                            "yield_risk.flowering_humidity.description",
                            &[("value", value_text.as_str())],
                        ),
                        impact: t("yield_risk.flowering_humidity.impact"),
                    });
                }
            }
        }

        risks
    }

    // ==========================================
    // 采收计划
    // ==========================================

    /// 由周产量生成采收计划 (仅产量 > 0 的周)
    pub fn build_harvest_schedule(&self, weekly_yields: &[YieldWeek]) -> Vec<HarvestTask> {
        weekly_yields
            .iter()
            .filter(|w| w.yield_kg > 0.0)
            .map(|w| {
                let minutes = w.yield_kg * self.config.harvest_minutes_per_kg;
                let hours = round1(minutes / 60.0);
                let workers = (minutes / self.config.worker_minutes_per_day).ceil() as u32;
                let difficulty = if w.yield_kg > 50.0 {
                    HarvestDifficulty::High
                } else if w.yield_kg > 20.0 {
                    HarvestDifficulty::Medium
                } else {
                    HarvestDifficulty::Low
                };

                let harvest_cost = (hours * self.config.hourly_wage).round();
                let packaging_cost = (w.yield_kg * self.config.packaging_cost_per_kg).round();

                HarvestTask {
                    week: w.week,
                    date: w.date,
                    yield_kg: w.yield_kg,
                    stage_name: w.stage_name.clone(),
                    workload: HarvestWorkload {
                        total_minutes: minutes.round() as u32,
                        hours,
                        workers,
                        difficulty,
                    },
                    labor_cost: HarvestLaborCost {
                        harvest_cost,
                        packaging_cost,
                        total_labor_cost: harvest_cost + packaging_cost,
                    },
                }
            })
            .collect()
    }
}

impl Default for YieldForecaster {
    fn default() -> Self {
        Self::new(YieldModelConfig::default())
    }
}
