// ==========================================
// 面粉厂计划看板 - 配置层错误类型
// ==========================================

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("配置解析失败: {0}")]
    ParseError(String),

    #[error("配置值非法 ({key} = {value}): {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },

    #[error("未知配置键: {0}")]
    UnknownKey(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
