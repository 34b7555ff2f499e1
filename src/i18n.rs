// ==========================================
// 温室预测排程核心 - 国际化
// ==========================================
// 语言: zh-CN (回退) / en / ko, 词条位于 locales/*.yml
// 占位符: %{name}, 由 t_with_args 替换
// 注意: rust_i18n::i18n! 在 lib.rs 中声明
// ==========================================

use tracing::warn;

/// 回退语言
pub const DEFAULT_LOCALE: &str = "zh-CN";

/// 已提供词条的语言
pub const SUPPORTED_LOCALES: [&str; 3] = ["zh-CN", "en", "ko"];

/// 语言环境变量
pub const LOCALE_ENV_VAR: &str = "GREENHOUSE_FORECAST_LOCALE";

pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 切换语言
///
/// # 返回
/// - true: 已切换
/// - false: 不支持的语言, 改用 DEFAULT_LOCALE
pub fn set_locale(locale: &str) -> bool {
    if SUPPORTED_LOCALES.contains(&locale) {
        rust_i18n::set_locale(locale);
        true
    } else {
        warn!(locale, fallback = DEFAULT_LOCALE, "不支持的语言,使用回退语言");
        rust_i18n::set_locale(DEFAULT_LOCALE);
        false
    }
}

/// 按 GREENHOUSE_FORECAST_LOCALE 设置语言 (未设置时保持默认)
pub fn init_from_env() {
    if let Ok(locale) = std::env::var(LOCALE_ENV_VAR) {
        set_locale(locale.trim());
    }
}

/// 翻译 (无参数)
///
/// # 示例
/// ```no_run
/// use greenhouse_forecast::i18n::t;
/// let name = t("baseline.monitoring.name");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译并替换 %{k} 占位符
///
/// # 示例
/// ```no_run
/// use greenhouse_forecast::i18n::t_with_args;
/// let msg = t_with_args("execution.completed", &[("name", "灌溉系统运行")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    args.iter().fold(t(key), |text, (name, value)| {
        text.replace(&format!("%{{{}}}", name), value)
    })
}
