// ==========================================
// 面粉厂计划看板 - API 层
// ==========================================
// 职责: 对看板前端暴露的同步接口
// ==========================================

pub mod dashboard_api;
pub mod error;

pub use dashboard_api::{DashboardApi, EntityTrend};
pub use error::{ApiError, ApiResult};
