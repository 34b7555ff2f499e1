// ==========================================
// 温室预测排程核心 - 收益预测领域模型
// ==========================================
// 职责: 月度收益 / 成本明细 / 财务汇总 / 风险调整
// 红线: 财务汇总每次整体重算,不做局部更新
// ==========================================

use crate::domain::types::RiskSeverity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRevenue {
    pub month: u32,
    pub total_yield: f64,
    pub revenue: f64,
    pub average_price: f64,
}

// ==========================================
// CostBreakdown - 成本明细
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedCosts {
    pub facility_maintenance: f64, // 设施维护 (月)
    pub insurance: f64,            // 保险 (月)
    pub utilities: f64,            // 水电 (月)
    pub base_labor: f64,           // 基础人工 (月)
    pub monthly_total: f64,
    pub period_total: f64,         // 按预测期折算
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableCosts {
    pub seeds: f64,
    pub fertilizer: f64,
    pub pesticide: f64,
    pub packaging: f64,
    pub transport: f64,
    pub harvest_labor: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub fixed: FixedCosts,
    pub variable: VariableCosts,
    pub total_cost: f64,
    pub cost_per_kg: f64,
}

// ==========================================
// FinancialSummary - 财务汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub total_revenue: f64,
    pub total_costs: f64,
    pub net_profit: f64,
    pub profit_margin_percent: f64,
    pub roi_percent: f64,
    pub break_even_yield: f64,
    pub risk_adjusted_profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakEven {
    pub yield_kg: f64,
    pub revenue: f64,
    pub representative_price: f64,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentConfidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAdjustment {
    pub original_profit: f64,
    pub adjusted_profit: f64,
    pub retained_factor: f64,   // 保留系数 Π(1 - discount)
    pub discount_percent: f64,
    pub confidence: AdjustmentConfidence,
}

// ==========================================
// RevenueForecast - 收益预测结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueForecast {
    pub crop_type: String,
    pub monthly_revenue: Vec<MonthlyRevenue>,
    pub costs: CostBreakdown,
    pub summary: FinancialSummary,
    pub break_even: BreakEven,
    pub risk_adjustment: RiskAdjustment,
    pub overall_risk: RiskSeverity,
}
