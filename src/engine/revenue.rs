// ==========================================
// 温室预测排程核心 - 收益预测引擎
// ==========================================
// 职责: 产量轨迹 + 市场模型 → 月收入 / 成本 / 利润 / ROI / 盈亏平衡 / 风险调整
// 说明: 财务汇总每次整体重算,不做局部更新
// ==========================================

use crate::config::RevenueConfig;
use crate::domain::crop::MarketModel;
use crate::domain::revenue::{
    AdjustmentConfidence, BreakEven, CostBreakdown, FinancialSummary, FixedCosts,
    MonthlyRevenue, RevenueForecast, RiskAdjustment, VariableCosts,
};
use crate::domain::types::{round1, QualityGrade, RiskSeverity};
use crate::domain::yield_forecast::{QualityDistribution, RiskFactor, YieldForecast};
use crate::engine::yield_forecast::month_of_week;
use crate::i18n::t_with_args;
use std::collections::BTreeMap;
use tracing::{info, instrument};

// ==========================================
// 纯函数
// ==========================================

/// 盈亏平衡产量 = 总成本 / 代表价格
pub fn break_even_yield(total_cost: f64, representative_price: f64) -> f64 {
    if representative_price <= 0.0 {
        return 0.0;
    }
    round1(total_cost / representative_price)
}

/// 综合风险等级
///
/// 规则（顺序执行，命中即返回）:
/// 1) 存在 critical → Critical
/// 2) 存在 high → High
/// 3) 风险数 > 2 → Medium
/// 4) 其他 → Low
pub fn overall_risk(risks: &[RiskFactor]) -> RiskSeverity {
    if risks.iter().any(|r| r.severity == RiskSeverity::Critical) {
        RiskSeverity::Critical
    } else if risks.iter().any(|r| r.severity == RiskSeverity::High) {
        RiskSeverity::High
    } else if risks.len() > 2 {
        RiskSeverity::Medium
    } else {
        RiskSeverity::Low
    }
}

// ==========================================
// RevenueForecaster - 收益预测引擎
// ==========================================
pub struct RevenueForecaster {
    config: RevenueConfig,
}

impl RevenueForecaster {
    pub fn new(config: RevenueConfig) -> Self {
        Self { config }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 收益预测
    #[instrument(skip(self, yield_forecast, market), fields(crop = %yield_forecast.crop_type, weeks = yield_forecast.weekly_yields.len()))]
    pub fn predict_revenue(
        &self,
        yield_forecast: &YieldForecast,
        market: &MarketModel,
    ) -> RevenueForecast {
        // 1) 月收入
        let monthly_revenue = self.monthly_revenue(yield_forecast, market);
        let total_revenue: f64 = monthly_revenue.iter().map(|m| m.revenue).sum();

        // 2) 成本
        let costs = self.cost_breakdown(yield_forecast);

        // 3) 利润与比率
        let net_profit = total_revenue - costs.total_cost;
        let profit_margin_percent = if total_revenue > 0.0 {
            round1(net_profit / total_revenue * 100.0)
        } else {
            0.0
        };
        let roi_percent = if costs.total_cost > 0.0 {
            round1(net_profit / costs.total_cost * 100.0)
        } else {
            0.0
        };

        // 4) 盈亏平衡 / 风险调整
        let break_even = self.break_even(costs.total_cost, market);
        let risk_adjustment = self.risk_adjustment(net_profit, &yield_forecast.risk_factors);
        let overall_risk = overall_risk(&yield_forecast.risk_factors);

        info!(
            total_revenue,
            total_cost = costs.total_cost,
            net_profit,
            roi_percent,
            overall_risk = %overall_risk,
            "收益预测完成"
        );

        RevenueForecast {
            crop_type: yield_forecast.crop_type.clone(),
            monthly_revenue,
            summary: FinancialSummary {
                total_revenue,
                total_costs: costs.total_cost,
                net_profit,
                profit_margin_percent,
                roi_percent,
                break_even_yield: break_even.yield_kg,
                risk_adjusted_profit: risk_adjustment.adjusted_profit,
            },
            costs,
            break_even,
            risk_adjustment,
            overall_risk,
        }
    }

    // ==========================================
    // 收入
    // ==========================================

    /// 品质加权平均价格
    pub fn average_price(
        market: &MarketModel,
        month: u32,
        quality: &QualityDistribution,
    ) -> f64 {
        let quality_factor: f64 = [QualityGrade::Premium, QualityGrade::Standard, QualityGrade::Economy]
            .iter()
            .map(|grade| quality.share(*grade) * market.quality_premium.for_grade(*grade))
            .sum();
        market.base_price * market.month_multiplier(month) * quality_factor
    }

    /// 按月汇总 (产量为 0 的周跳过)
    fn monthly_revenue(&self, yield_forecast: &YieldForecast, market: &MarketModel) -> Vec<MonthlyRevenue> {
        // month → (产量, 收入)
        let mut months: BTreeMap<u32, (f64, f64)> = BTreeMap::new();

        for week in &yield_forecast.weekly_yields {
            if week.yield_kg <= 0.0 {
                continue;
            }
            let month = month_of_week(week.week);
            let price = Self::average_price(market, month, &yield_forecast.quality_distribution);
            let entry = months.entry(month).or_insert((0.0, 0.0));
            entry.0 += week.yield_kg;
            entry.1 += week.yield_kg * price;
        }

        months
            .into_iter()
            .map(|(month, (total_yield, revenue))| MonthlyRevenue {
                month,
                total_yield: round1(total_yield),
                revenue: revenue.round(),
                average_price: if total_yield > 0.0 {
                    (revenue / total_yield).round()
                } else {
                    0.0
                },
            })
            .collect()
    }

    // ==========================================
    // 成本
    // ==========================================

    /// 成本明细
    ///
    /// - 固定成本: 按面积的月度费用 + 基础人工,按预测周数折算
    /// - 变动成本: 按面积 (种苗/农药) 与产量 (肥料/包装/运输) 计, 外加采收人工
    pub fn cost_breakdown(&self, yield_forecast: &YieldForecast) -> CostBreakdown {
        let area = yield_forecast.area_sqm;
        let total_yield = yield_forecast.total_yield;
        let c = &self.config;

        let facility_maintenance = area * c.facility_per_sqm;
        let insurance = area * c.insurance_per_sqm;
        let utilities = area * c.utilities_per_sqm;
        let monthly_total = facility_maintenance + insurance + utilities + c.base_labor_monthly;
        let months = yield_forecast.weekly_yields.len() as f64 / c.weeks_per_month;
        let fixed = FixedCosts {
            facility_maintenance,
            insurance,
            utilities,
            base_labor: c.base_labor_monthly,
            monthly_total,
            period_total: (monthly_total * months).round(),
        };

        let seeds = area * c.seeds_per_sqm;
        let fertilizer = (total_yield * c.fertilizer_per_kg).round();
        let pesticide = area * c.pesticide_per_sqm;
        let packaging = (total_yield * c.packaging_per_kg).round();
        let transport = (total_yield * c.transport_per_kg).round();
        let harvest_labor = yield_forecast.harvest_labor_total();
        let variable = VariableCosts {
            seeds,
            fertilizer,
            pesticide,
            packaging,
            transport,
            harvest_labor,
            total: seeds + fertilizer + pesticide + packaging + transport + harvest_labor,
        };

        let total_cost = fixed.period_total + variable.total;
        let cost_per_kg = if total_yield > 0.0 {
            (total_cost / total_yield).round()
        } else {
            0.0
        };

        CostBreakdown {
            fixed,
            variable,
            total_cost,
            cost_per_kg,
        }
    }

    // ==========================================
    // 盈亏平衡与风险调整
    // ==========================================

    pub fn break_even(&self, total_cost: f64, market: &MarketModel) -> BreakEven {
        let representative_price = market.base_price * self.config.representative_price_factor;
        let yield_kg = break_even_yield(total_cost, representative_price);
        let yield_text = format!("{}", yield_kg);
        let price_text = format!("{}", representative_price.round());

        BreakEven {
            yield_kg,
            revenue: (yield_kg * representative_price).round(),
            representative_price,
            description: t_with_args(
                "revenue.break_even",
                &[("yield", yield_text.as_str()), ("price", price_text.as_str())],
            ),
        }
    }

    /// 风险调整利润 = 净利润 · Π(1 - 折扣)
    pub fn risk_adjustment(&self, net_profit: f64, risks: &[RiskFactor]) -> RiskAdjustment {
        let retained_factor: f64 = risks
            .iter()
            .map(|r| 1.0 - self.discount_for(r.severity))
            .product();

        let confidence = if retained_factor > 0.9 {
            AdjustmentConfidence::High
        } else if retained_factor > 0.8 {
            AdjustmentConfidence::Medium
        } else {
            AdjustmentConfidence::Low
        };

        RiskAdjustment {
            original_profit: net_profit,
            adjusted_profit: (net_profit * retained_factor).round(),
            retained_factor,
            discount_percent: ((1.0 - retained_factor) * 100.0).round(),
            confidence,
        }
    }

    fn discount_for(&self, severity: RiskSeverity) -> f64 {
        match severity {
            RiskSeverity::Critical => self.config.critical_discount,
            RiskSeverity::High => self.config.high_discount,
            RiskSeverity::Medium => self.config.medium_discount,
            RiskSeverity::Low => 0.0,
        }
    }
}

impl Default for RevenueForecaster {
    fn default() -> Self {
        Self::new(RevenueConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::crop::QualityPremium;
    use crate::domain::yield_forecast::RiskFactorKind;
    use crate::domain::types::MetricKind;

    fn risk(severity: RiskSeverity) -> RiskFactor {
        RiskFactor {
            kind: RiskFactorKind::CriticalMetric(MetricKind::Temperature),
            severity,
            description: String::new(),
            impact: String::new(),
        }
    }

    fn market() -> MarketModel {
        MarketModel {
            crop_type: "tomato".to_string(),
            base_price: 3500.0,
            month_multipliers: [1.3, 1.4, 1.2, 1.0, 0.8, 0.7, 0.6, 0.7, 0.9, 1.1, 1.2, 1.3],
            quality_premium: QualityPremium {
                premium: 1.5,
                standard: 1.0,
                economy: 0.7,
            },
        }
    }

    #[test]
    fn test_break_even_yield() {
        assert_eq!(break_even_yield(10_000_000.0, 8000.0), 1250.0);
        assert_eq!(break_even_yield(10_000_000.0, 0.0), 0.0);
    }

    #[test]
    fn test_single_critical_discount() {
        let engine = RevenueForecaster::default();
        let adjustment = engine.risk_adjustment(1_000_000.0, &[risk(RiskSeverity::Critical)]);
        assert_eq!(adjustment.adjusted_profit, 700_000.0);
        assert_eq!(adjustment.discount_percent, 30.0);
        assert_eq!(adjustment.confidence, AdjustmentConfidence::Low);
    }

    #[test]
    fn test_discounts_stack_multiplicatively() {
        let engine = RevenueForecaster::default();
        let adjustment = engine.risk_adjustment(
            1_000_000.0,
            &[risk(RiskSeverity::High), risk(RiskSeverity::Medium)],
        );
        // 0.85 · 0.95 = 0.8075
        assert_eq!(adjustment.adjusted_profit, 807_500.0);
        assert_eq!(adjustment.confidence, AdjustmentConfidence::Medium);

        let none = engine.risk_adjustment(1_000_000.0, &[]);
        assert_eq!(none.adjusted_profit, 1_000_000.0);
        assert_eq!(none.confidence, AdjustmentConfidence::High);
    }

    #[test]
    fn test_overall_risk_levels() {
        assert_eq!(overall_risk(&[]), RiskSeverity::Low);
        assert_eq!(
            overall_risk(&[
                risk(RiskSeverity::Medium),
                risk(RiskSeverity::Medium),
                risk(RiskSeverity::Medium)
            ]),
            RiskSeverity::Medium
        );
        assert_eq!(
            overall_risk(&[risk(RiskSeverity::Medium), risk(RiskSeverity::High)]),
            RiskSeverity::High
        );
    }

    #[test]
    fn test_average_price_quality_weighted() {
        // 0.6·1.5 + 0.35·1.0 + 0.05·0.7 = 1.285
        let quality = QualityDistribution::new(60.0, 35.0, 5.0);
        let price = RevenueForecaster::average_price(&market(), 4, &quality);
        assert!((price - 3500.0 * 1.285).abs() < 1e-6);
    }
}
