// ==========================================
// 温室预测排程核心 - 配置管理器
// ==========================================
// 职责: 配置加载 (文件 / 环境变量 / 默认值) 与校验
// 加载顺序: 显式路径 → GREENHOUSE_FORECAST_CONFIG → 默认值
// ==========================================

use crate::config::forecast_config::{ConfigError, ForecastConfig};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// 配置来源
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum ConfigSource {
    File(PathBuf),
    Env(PathBuf),
    Defaults,
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: Arc<ForecastConfig>,
    source: ConfigSource,
}

impl ConfigManager {
    /// 配置文件路径环境变量
    pub const ENV_VAR: &'static str = "GREENHOUSE_FORECAST_CONFIG";

    /// 加载配置
    ///
    /// # 参数
    /// - path: 显式配置文件路径 (优先级最高)
    ///
    /// # 返回
    /// - Ok(ConfigManager): 已校验的配置
    /// - Err(ConfigError): 文件读取 / 解析 / 校验失败
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            let config = Self::read_file(path)?;
            return Self::build(config, ConfigSource::File(path.to_path_buf()));
        }

        if let Ok(raw) = std::env::var(Self::ENV_VAR) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                let env_path = PathBuf::from(trimmed);
                let config = Self::read_file(&env_path)?;
                return Self::build(config, ConfigSource::Env(env_path));
            }
        }

        debug!("未指定配置文件,使用默认配置");
        Self::build(ForecastConfig::default(), ConfigSource::Defaults)
    }

    /// 从文件加载
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::load(Some(path))
    }

    /// 使用给定配置 (校验后)
    pub fn with_config(config: ForecastConfig) -> Result<Self, ConfigError> {
        Self::build(config, ConfigSource::Defaults)
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// 共享配置 (注入多个引擎)
    pub fn shared(&self) -> Arc<ForecastConfig> {
        Arc::clone(&self.config)
    }

    pub fn source(&self) -> &ConfigSource {
        &self.source
    }

    /// 获取当前配置快照 (JSON)
    pub fn snapshot_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self.config.as_ref())?)
    }

    // ==========================================
    // 内部方法
    // ==========================================

    fn read_file(path: &Path) -> Result<ForecastConfig, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ForecastConfig = serde_json::from_str(&raw)?;
        Ok(config)
    }

    fn build(config: ForecastConfig, source: ConfigSource) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(source = ?source, "配置加载完成");
        Ok(Self {
            config: Arc::new(config),
            source,
        })
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self {
            config: Arc::new(ForecastConfig::default()),
            source: ConfigSource::Defaults,
        }
    }
}
