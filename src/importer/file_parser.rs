// ==========================================
// 面粉厂计划看板 - 行解析器
// ==========================================
// 职责: 外部数据（JSON 数组 / CSV 文本）→ 字段名 → 字符串值 的行
// 支持: JSON (`[...]` 或 `{"data": [...]}`) / CSV (.csv)
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use csv::ReaderBuilder;
use serde_json::Value;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// 解析后的一行（列名 → 去空白后的值）
pub type RawRow = HashMap<String, String>;

// ==========================================
// CSV Parser
// ==========================================
pub struct CsvParser;

impl CsvParser {
    /// 从任意读取器解析 CSV（首行为表头）
    pub fn parse_reader<R: Read>(&self, reader: R) -> ImportResult<Vec<RawRow>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let mut row = RawRow::new();

            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    row.insert(header.clone(), value.trim().to_string());
                }
            }

            // 跳过完全空白的行
            if row.values().all(|v| v.is_empty()) {
                continue;
            }

            rows.push(row);
        }

        Ok(rows)
    }

    /// 从文件路径解析 CSV
    pub fn parse_path(&self, path: &Path) -> ImportResult<Vec<RawRow>> {
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => {}
            Some(ext) => {
                return Err(ImportError::UnsupportedFormat(
                    ext.to_string_lossy().to_string(),
                ))
            }
            None => return Err(ImportError::UnsupportedFormat(path.display().to_string())),
        }

        let file = File::open(path)?;
        self.parse_reader(file)
    }
}

// ==========================================
// JSON Parser
// ==========================================
pub struct JsonParser;

impl JsonParser {
    /// 解析 API 响应体
    ///
    /// 接受顶层数组，或带 `data` 数组的对象（看板接口的返回格式）
    pub fn parse_str(&self, json: &str) -> ImportResult<Vec<RawRow>> {
        let value: Value = serde_json::from_str(json)?;
        match value {
            Value::Array(items) => self.parse_values(&items),
            Value::Object(mut obj) => match obj.remove("data") {
                Some(Value::Array(items)) => self.parse_values(&items),
                _ => Err(ImportError::JsonParseError(
                    "期望 JSON 数组或包含 data 数组的对象".to_string(),
                )),
            },
            _ => Err(ImportError::JsonParseError(
                "期望 JSON 数组或包含 data 数组的对象".to_string(),
            )),
        }
    }

    /// 解析已反序列化的 JSON 值列表
    pub fn parse_values(&self, values: &[Value]) -> ImportResult<Vec<RawRow>> {
        values
            .iter()
            .enumerate()
            .map(|(idx, value)| match value {
                Value::Object(obj) => Ok(obj
                    .iter()
                    .filter_map(|(k, v)| scalar_to_string(v).map(|s| (k.clone(), s)))
                    .collect()),
                other => Err(ImportError::JsonParseError(format!(
                    "第 {} 行不是对象: {}",
                    idx + 1,
                    other
                ))),
            })
            .collect()
    }
}

/// JSON 标量 → 字符串（null 视为缺失，嵌套结构不参与映射）
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}
