// ==========================================
// 温室预测排程核心 - 运营风险与分析引擎
// ==========================================
// 职责: 7日排程的汇总分析 / 趋势 / 建议 / 风险评估
// 输入: 逐日预测 + 指标区间 + 日排程
// 输出: ComprehensiveAnalysis / Recommendation / OperationalRisk
// ==========================================

use crate::config::OrchestratorConfig;
use crate::domain::action::DaySchedule;
use crate::domain::forecast::ForecastDay;
use crate::domain::scenario::{
    AnalysisSummary, ComprehensiveAnalysis, ExtremeCondition, ExtremeDirection,
    OperationalRisk, Recommendation, RecommendationKind, TrendAnalysis,
};
use crate::domain::snapshot::MetricBand;
use crate::domain::types::{round1, MetricKind, RiskSeverity, Trend, Urgency};
use crate::i18n::{t, t_with_args};
use std::collections::BTreeMap;
use tracing::debug;

// ==========================================
// RiskEngine - 运营风险与分析引擎
// ==========================================
pub struct RiskEngine {
    config: OrchestratorConfig,
}

impl RiskEngine {
    pub fn new(config: OrchestratorConfig) -> Self {
        Self { config }
    }

    // ==========================================
    // 汇总分析
    // ==========================================

    pub fn analyze(&self, days: &[ForecastDay], schedules: &[DaySchedule]) -> ComprehensiveAnalysis {
        ComprehensiveAnalysis {
            summary: self.summarize(schedules),
            trends: TrendAnalysis {
                temperature: self.metric_trend(days, MetricKind::Temperature),
                humidity: self.metric_trend(days, MetricKind::Humidity),
                risk: self.risk_trend(schedules),
            },
        }
    }

    /// 汇总统计: 作业数 / 成本 / 平均置信度 / 临界日数 / 峰值作业量
    pub fn summarize(&self, schedules: &[DaySchedule]) -> AnalysisSummary {
        let avg_confidence_percent = if schedules.is_empty() {
            0.0
        } else {
            (schedules.iter().map(|s| s.confidence).sum::<f64>() / schedules.len() as f64 * 100.0)
                .round()
        };

        AnalysisSummary {
            total_actions: schedules.iter().map(|s| s.total_count).sum(),
            total_cost: schedules.iter().map(|s| s.total_cost).sum(),
            avg_confidence_percent,
            critical_days: schedules.iter().filter(|s| s.has_critical()).count(),
            workload_peak_hours: schedules
                .iter()
                .map(|s| s.workload_hours())
                .fold(0.0, f64::max),
        }
    }

    /// 指标趋势: 首日 vs 末日变化率超过阈值 (%)
    fn metric_trend(&self, days: &[ForecastDay], metric: MetricKind) -> Trend {
        let first = days.first().and_then(|d| d.value(metric));
        let last = days.last().and_then(|d| d.value(metric));

        match (first, last) {
            (Some(first), Some(last)) if first.abs() > f64::EPSILON => {
                let change_percent = (last - first) / first.abs() * 100.0;
                if change_percent > self.config.trend_threshold_percent {
                    Trend::Increasing
                } else if change_percent < -self.config.trend_threshold_percent {
                    Trend::Decreasing
                } else {
                    Trend::Stable
                }
            }
            _ => Trend::Stable,
        }
    }

    /// 风险趋势: 日风险分 = 3·critical + 2·high
    fn risk_trend(&self, schedules: &[DaySchedule]) -> Trend {
        let score = |s: &DaySchedule| {
            s.actions
                .iter()
                .map(|a| match a.urgency {
                    Urgency::Critical => 3.0,
                    Urgency::High => 2.0,
                    _ => 0.0,
                })
                .sum::<f64>()
        };

        match (schedules.first(), schedules.last()) {
            (Some(first), Some(last)) => {
                let diff = score(last) - score(first);
                if diff > self.config.risk_trend_threshold {
                    Trend::Increasing
                } else if diff < -self.config.risk_trend_threshold {
                    Trend::Decreasing
                } else {
                    Trend::Stable
                }
            }
            _ => Trend::Stable,
        }
    }

    // ==========================================
    // 建议
    // ==========================================

    /// 规则:
    /// - 临界日数 > 阈值 → 紧急应对 (High)
    /// - 总成本 > 阈值 → 成本优化 (Medium)
    /// - 平均置信度 < 阈值 → 加强监测 (Medium)
    pub fn recommend(&self, summary: &AnalysisSummary) -> Vec<Recommendation> {
        let mut recommendations = Vec::new();

        if summary.critical_days > self.config.critical_days_threshold {
            let days_text = summary.critical_days.to_string();
            recommendations.push(Recommendation {
                kind: RecommendationKind::Urgent,
                priority: Urgency::High,
                title: t("recommendation.urgent.title"),
                description: t_with_args(
                    "recommendation.urgent.description",
                    &[("days", days_text.as_str())],
                ),
            });
        }

        if summary.total_cost > self.config.cost_threshold {
            let cost_text = format!("{}", summary.total_cost.round());
            recommendations.push(Recommendation {
                kind: RecommendationKind::Economic,
                priority: Urgency::Medium,
                title: t("recommendation.economic.title"),
                description: t_with_args(
                    "recommendation.economic.description",
                    &[("cost", cost_text.as_str())],
                ),
            });
        }

        if summary.avg_confidence_percent < self.config.confidence_threshold_percent {
            let confidence_text = format!("{}", summary.avg_confidence_percent);
            recommendations.push(Recommendation {
                kind: RecommendationKind::Monitoring,
                priority: Urgency::Medium,
                title: t("recommendation.monitoring.title"),
                description: t_with_args(
                    "recommendation.monitoring.description",
                    &[("confidence", confidence_text.as_str())],
                ),
            });
        }

        recommendations
    }

    // ==========================================
    // 风险评估
    // ==========================================

    /// 逐日临界环境 + 高作业量日
    pub fn assess(
        &self,
        days: &[ForecastDay],
        bands: &BTreeMap<MetricKind, MetricBand>,
        schedules: &[DaySchedule],
    ) -> Vec<OperationalRisk> {
        let mut risks = Vec::new();

        for day in days {
            let conditions = Self::extreme_conditions(day, bands);
            if conditions.is_empty() {
                continue;
            }
            let level = match conditions.len() {
                n if n >= 3 => RiskSeverity::Critical,
                2 => RiskSeverity::High,
                _ => RiskSeverity::Medium,
            };
            let count_text = conditions.len().to_string();
            risks.push(OperationalRisk::Environment {
                day_index: day.day_index,
                date: day.date,
                level,
                conditions,
                impact: t_with_args(
                    "operational_risk.environment.impact",
                    &[("count", count_text.as_str())],
                ),
            });
        }

        let heavy_days: Vec<u32> = schedules
            .iter()
            .filter(|s| s.workload_hours() > self.config.workload_threshold_hours)
            .map(|s| s.day_index)
            .collect();
        if !heavy_days.is_empty() {
            let hours_text = format!("{}", round1(self.config.workload_threshold_hours));
            risks.push(OperationalRisk::Workload {
                level: RiskSeverity::Medium,
                day_indexes: heavy_days,
                impact: t_with_args(
                    "operational_risk.workload.impact",
                    &[("hours", hours_text.as_str())],
                ),
            });
        }

        debug!(risks = risks.len(), "运营风险评估完成");
        risks
    }

    /// 超出临界区间的指标
    pub fn extreme_conditions(
        day: &ForecastDay,
        bands: &BTreeMap<MetricKind, MetricBand>,
    ) -> Vec<ExtremeCondition> {
        day.predictions
            .iter()
            .filter_map(|(metric, value)| {
                let band = bands.get(metric)?;
                if !band.is_critical(*value) {
                    return None;
                }
                let direction = if *value < band.critical_low {
                    ExtremeDirection::CriticallyLow
                } else {
                    ExtremeDirection::CriticallyHigh
                };
                Some(ExtremeCondition {
                    metric: *metric,
                    value: *value,
                    direction,
                })
            })
            .collect()
    }
}

impl Default for RiskEngine {
    fn default() -> Self {
        Self::new(OrchestratorConfig::default())
    }
}
