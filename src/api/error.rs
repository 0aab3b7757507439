// ==========================================
// 面粉厂计划看板 - API 层错误类型
// ==========================================
// 职责: 汇总引擎/导入/配置错误，对外给出带原因的错误消息
// ==========================================

use crate::config::error::ConfigError;
use crate::engine::error::EngineError;
use crate::importer::error::ImportError;
use thiserror::Error;

/// API 层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("引擎错误: {0}")]
    Engine(#[from] EngineError),

    #[error("导入失败: {0}")]
    Import(#[from] ImportError),

    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// API 层 Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
