// ==========================================
// 温室预测排程核心 - 演示入口
// ==========================================
// 用法: greenhouse-forecast [温室ID] [配置文件路径]
// 环境变量: RUST_LOG / LOG_FORMAT=json / GREENHOUSE_FORECAST_CONFIG / GREENHOUSE_FORECAST_LOCALE
// ==========================================

use anyhow::Context;
use greenhouse_forecast::api::{ExecutionApi, FinancialApi, ForecastApi};
use greenhouse_forecast::catalog::StaticCatalog;
use greenhouse_forecast::config::ConfigManager;
use greenhouse_forecast::domain::{ExogenousFactors, WeatherForecast};
use greenhouse_forecast::{i18n, logging, APP_NAME, VERSION};
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_from_env();
    i18n::init_from_env();

    tracing::info!("==================================================");
    tracing::info!("{} v{}", APP_NAME, VERSION);
    tracing::info!("==================================================");

    let mut args = std::env::args().skip(1);
    let greenhouse_id = args.next().unwrap_or_else(|| "GH-A".to_string());
    let config_path = args.next().map(PathBuf::from);

    let manager = ConfigManager::load(config_path.as_deref()).context("加载配置失败")?;
    tracing::info!(source = ?manager.source(), "配置已加载");
    let config = manager.config().clone();

    let catalog = Arc::new(StaticCatalog::demo());

    // 运营视图
    let forecast_api = ForecastApi::new(catalog.clone(), &config);
    let exogenous = ExogenousFactors::new(WeatherForecast::Normal, 18.0);
    let prediction = forecast_api
        .run_comprehensive_prediction(&greenhouse_id, &exogenous)
        .await?;
    println!("{}", serde_json::to_string_pretty(&prediction)?);

    // 执行首日全部自动作业
    let execution_api = ExecutionApi::from_prediction(&prediction, config.scheduler.clone(), None);
    if let Some(first_day) = prediction.action_schedule.first() {
        let outcomes = execution_api.execute_automated(first_day.date).await?;
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
        tracing::info!(
            progress = execution_api.day_progress(first_day.date)?,
            "首日自动作业执行完毕"
        );
    }

    // 经济视图
    let financial_api = FinancialApi::new(catalog, &config);
    let complete = financial_api
        .generate_complete_prediction(&greenhouse_id)
        .await?;
    println!("{}", serde_json::to_string_pretty(&complete)?);

    let farm = financial_api.predict_farm_total().await?;
    println!("{}", serde_json::to_string_pretty(&farm.summary)?);

    Ok(())
}
