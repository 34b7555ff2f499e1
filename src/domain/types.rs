// ==========================================
// 温室预测排程核心 - 领域类型定义
// ==========================================
// 职责: 闭合枚举（指标/紧急度/自动化等级/状态）
// 红线: 紧急度是"等级制",不是评分制
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 环境指标 (Metric Kind)
// ==========================================
// 闭合枚举: 调整措施表按 (指标, 方向) 穷举匹配
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Temperature,    // 温度
    Humidity,       // 相对湿度
    Co2,            // 二氧化碳浓度
    LightIntensity, // 光照强度
    SoilMoisture,   // 土壤含水率
    SoilPh,         // 土壤酸碱度
}

impl MetricKind {
    /// 全部跟踪指标（固定顺序）
    pub const ALL: [MetricKind; 6] = [
        MetricKind::Temperature,
        MetricKind::Humidity,
        MetricKind::Co2,
        MetricKind::LightIntensity,
        MetricKind::SoilMoisture,
        MetricKind::SoilPh,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Temperature => "temperature",
            MetricKind::Humidity => "humidity",
            MetricKind::Co2 => "co2",
            MetricKind::LightIntensity => "light_intensity",
            MetricKind::SoilMoisture => "soil_moisture",
            MetricKind::SoilPh => "soil_ph",
        }
    }

    /// 默认计量单位
    pub fn unit(&self) -> &'static str {
        match self {
            MetricKind::Temperature => "°C",
            MetricKind::Humidity => "%",
            MetricKind::Co2 => "ppm",
            MetricKind::LightIntensity => "lux",
            MetricKind::SoilMoisture => "%",
            MetricKind::SoilPh => "pH",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "temperature" => Ok(MetricKind::Temperature),
            "humidity" => Ok(MetricKind::Humidity),
            "co2" => Ok(MetricKind::Co2),
            "light_intensity" | "lightintensity" | "light" => Ok(MetricKind::LightIntensity),
            "soil_moisture" | "soilmoisture" => Ok(MetricKind::SoilMoisture),
            "soil_ph" | "soilph" => Ok(MetricKind::SoilPh),
            other => Err(format!("未知环境指标: {}", other)),
        }
    }
}

// ==========================================
// 偏离方向 (Deviation Direction)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    TooLow,
    TooHigh,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::TooLow => "low",
            Direction::TooHigh => "high",
        }
    }
}

// ==========================================
// 紧急度 (Urgency)
// ==========================================
// 顺序: Low < Medium < High < Critical
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Critical,
}

impl Urgency {
    /// 排序用等级值 (critical=4 ... low=1)
    pub fn rank(&self) -> u8 {
        match self {
            Urgency::Critical => 4,
            Urgency::High => 3,
            Urgency::Medium => 2,
            Urgency::Low => 1,
        }
    }

    /// 是否计入"紧急作业"统计 (critical + high)
    pub fn is_urgent(&self) -> bool {
        matches!(self, Urgency::Critical | Urgency::High)
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Urgency::Low => write!(f, "low"),
            Urgency::Medium => write!(f, "medium"),
            Urgency::High => write!(f, "high"),
            Urgency::Critical => write!(f, "critical"),
        }
    }
}

// ==========================================
// 自动化等级 (Automation Class)
// ==========================================
// Full: 无需人工确认即可执行
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutomationClass {
    Full,
    Semi,
    Manual,
}

impl AutomationClass {
    /// 自动化率计分 (full=1, semi=0.5, manual=0)
    pub fn score(&self) -> f64 {
        match self {
            AutomationClass::Full => 1.0,
            AutomationClass::Semi => 0.5,
            AutomationClass::Manual => 0.0,
        }
    }
}

impl fmt::Display for AutomationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutomationClass::Full => write!(f, "full"),
            AutomationClass::Semi => write!(f, "semi"),
            AutomationClass::Manual => write!(f, "manual"),
        }
    }
}

// ==========================================
// 作业状态 (Action Status)
// ==========================================
// 状态机: Pending -> InProgress -> {Completed | Failed}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl ActionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ActionStatus::Completed | ActionStatus::Failed)
    }
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionStatus::Pending => write!(f, "pending"),
            ActionStatus::InProgress => write!(f, "in_progress"),
            ActionStatus::Completed => write!(f, "completed"),
            ActionStatus::Failed => write!(f, "failed"),
        }
    }
}

// ==========================================
// 日负荷状态 (Day Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    Light,
    Normal,
    Busy,
    Critical,
}

impl fmt::Display for DayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayStatus::Light => write!(f, "light"),
            DayStatus::Normal => write!(f, "normal"),
            DayStatus::Busy => write!(f, "busy"),
            DayStatus::Critical => write!(f, "critical"),
        }
    }
}

// ==========================================
// 风险严重度 (Risk Severity)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for RiskSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskSeverity::Low => write!(f, "low"),
            RiskSeverity::Medium => write!(f, "medium"),
            RiskSeverity::High => write!(f, "high"),
            RiskSeverity::Critical => write!(f, "critical"),
        }
    }
}

// ==========================================
// 指标状态 (Metric Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricStatus {
    Optimal,  // 最适区间内
    Warning,  // 最适区间外, 临界区间内
    Critical, // 临界区间外
}

// ==========================================
// 趋势 (Trend)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

// ==========================================
// 天气预报类别 (Weather Forecast)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherForecast {
    Sunny,
    Cloudy,
    Rainy,
    Storm,
    #[default]
    Normal,
}

impl WeatherForecast {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherForecast::Sunny => "sunny",
            WeatherForecast::Cloudy => "cloudy",
            WeatherForecast::Rainy => "rainy",
            WeatherForecast::Storm => "storm",
            WeatherForecast::Normal => "normal",
        }
    }
}

impl FromStr for WeatherForecast {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sunny" => Ok(WeatherForecast::Sunny),
            "cloudy" => Ok(WeatherForecast::Cloudy),
            "rainy" => Ok(WeatherForecast::Rainy),
            "storm" => Ok(WeatherForecast::Storm),
            "normal" | "" => Ok(WeatherForecast::Normal),
            other => Err(format!("未知天气类别: {}", other)),
        }
    }
}

// ==========================================
// 品质等级 (Quality Grade)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityGrade {
    Premium,
    Standard,
    Economy,
}

// ==========================================
// 生育阶段类型 (Growth Phase)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthPhase {
    Transplanting,   // 定植期
    Vegetative,      // 营养生长期
    FlowerInduction, // 花芽分化期
    Flowering,       // 开花期
    Fruiting,        // 结果期
    Harvest,         // 采收期
}

impl GrowthPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrowthPhase::Transplanting => "transplanting",
            GrowthPhase::Vegetative => "vegetative",
            GrowthPhase::FlowerInduction => "flower_induction",
            GrowthPhase::Flowering => "flowering",
            GrowthPhase::Fruiting => "fruiting",
            GrowthPhase::Harvest => "harvest",
        }
    }
}

// ==========================================
// 数值取整
// ==========================================

/// 保留一位小数
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// 保留两位小数
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
