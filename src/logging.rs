// ==========================================
// 温室预测排程核心 - 日志初始化
// ==========================================
// 输出: 文本 (默认) / JSON (LOG_FORMAT=json, 供日志采集)
// 过滤: RUST_LOG, 未设置时为 info
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 输出格式环境变量
pub const FORMAT_ENV_VAR: &str = "LOG_FORMAT";

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// 解析 LOG_FORMAT 取值 (大小写不敏感, 未识别时为 Text)
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }

    pub fn from_env() -> Self {
        std::env::var(FORMAT_ENV_VAR)
            .map(|raw| Self::parse(&raw))
            .unwrap_or(LogFormat::Text)
    }
}

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// 按 LOG_FORMAT 选择输出格式并初始化
///
/// # 示例
/// ```no_run
/// use greenhouse_forecast::logging;
/// logging::init_from_env();
/// ```
pub fn init_from_env() {
    match LogFormat::from_env() {
        LogFormat::Json => init_json(),
        LogFormat::Text => init(),
    }
}

/// 文本格式 (带 target 与行号)
///
/// # 环境变量
/// - RUST_LOG: 例如 `RUST_LOG=greenhouse_forecast::engine::scheduler=debug`
pub fn init() {
    fmt()
        .with_env_filter(default_filter())
        .with_target(true)
        .with_line_number(true)
        .init();
}

/// JSON 格式 (每行一个事件, 含当前 span 字段如 greenhouse_id)
pub fn init_json() {
    fmt()
        .json()
        .with_env_filter(default_filter())
        .with_target(true)
        .with_current_span(true)
        .init();
}

/// 测试用: debug 级别写入测试输出, 重复调用无副作用
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
