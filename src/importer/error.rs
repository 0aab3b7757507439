// ==========================================
// 面粉厂计划看板 - 导入层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 任一行出错整批拒绝，不静默跳过（跳行会污染聚合合计且难以察觉）
// ==========================================

use thiserror::Error;

/// 导入层错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("JSON 解析失败: {0}")]
    JsonParseError(String),

    // ===== 数据映射错误 =====
    #[error("必填字段缺失 (行 {row}, 字段 {field})")]
    MissingField { row: usize, field: String },

    #[error("日期格式错误 (行 {row}, 字段 {field}): {value}")]
    MalformedDate {
        row: usize,
        field: String,
        value: String,
    },

    #[error("类型转换失败 (行 {row}, 字段 {field}): {message}")]
    TypeConversionError {
        row: usize,
        field: String,
        message: String,
    },
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::JsonParseError(err.to_string())
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
