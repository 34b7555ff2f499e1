// ==========================================
// 温室预测排程核心 - 目录层
// ==========================================
// 职责: 温室快照 / 作物模型 / 生育日历 / 市场数据 的读取接口
// 红线: 目录数据对单次预测不可变
// ==========================================

pub mod error;
pub mod reader;
pub mod static_catalog;

pub use error::CatalogError;
pub use reader::CatalogReader;
pub use static_catalog::{standard_band, standard_snapshot, StaticCatalog};
