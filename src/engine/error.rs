// ==========================================
// 面粉厂计划看板 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 空输入不是错误，引擎一律降级为空结果
// ==========================================

use chrono::NaiveDate;
use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("无效的时间粒度: {0}（仅支持 day/week/month/year）")]
    InvalidGranularity(String),

    #[error("无效的日期区间: start={start} > end={end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("无效的周期键 (granularity={granularity}): {key}")]
    InvalidPeriodKey { granularity: String, key: String },
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
