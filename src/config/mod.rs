// ==========================================
// 面粉厂计划看板 - 配置层
// ==========================================
// 职责: 看板计划配置加载、校验、覆写
// 来源: JSON 配置文件 + 查询参数
// ==========================================

pub mod error;
pub mod planning_config;

pub use error::{ConfigError, ConfigResult};
pub use planning_config::{config_keys, PlanningConfig};
