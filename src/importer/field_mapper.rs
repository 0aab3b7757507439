// ==========================================
// 面粉厂计划看板 - 字段映射器
// ==========================================
// 职责: 源字段 → 标准字段映射 + 类型转换
// 输入: RawRow（列名 → 字符串值）
// 输出: RawRecord / Assignment / MillLoadRecord
// ==========================================
// 规则:
// - 列名支持别名（原名 / camelCase）
// - 实体、日期缺失 → MissingField；日期无法解析 → MalformedDate
// - 度量缺失或 null → NaN（聚合时按 0 贡献）；非数值 → TypeConversionError
// ==========================================

use crate::domain::record::{Assignment, MillLoadRecord, RawRecord};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawRow;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// 支持的纯日期格式
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];

/// 支持的日期时间格式（丢弃时分秒，取本地日历日）
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

// ==========================================
// FieldMapping - 观测行列名配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMapping {
    pub entity: String,
    pub category: String,
    pub date: String,
    pub measure: String,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            entity: "entity_id".to_string(),
            category: "category_key".to_string(),
            date: "date".to_string(),
            measure: "measure".to_string(),
        }
    }
}

impl FieldMapping {
    /// SKU 需求预测接口
    pub fn sku_forecast() -> Self {
        Self {
            entity: "sku_id".to_string(),
            category: "flour_type".to_string(),
            date: "date".to_string(),
            measure: "forecast_tons".to_string(),
        }
    }

    /// 原料（小麦）采购价格接口
    pub fn raw_material_price() -> Self {
        Self {
            entity: "country".to_string(),
            category: "wheat_type".to_string(),
            date: "date".to_string(),
            measure: "price".to_string(),
        }
    }
}

// ==========================================
// AssignmentMapping - 排产分配列名配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignmentMapping {
    pub entity: String,
    pub date: String,
    pub category: String,
}

impl Default for AssignmentMapping {
    fn default() -> Self {
        Self {
            entity: "mill_id".to_string(),
            date: "date".to_string(),
            category: "recipe_id".to_string(),
        }
    }
}

// ==========================================
// FieldMapper
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldMapper;

impl FieldMapper {
    pub fn new() -> Self {
        Self
    }

    /// 映射一行观测
    ///
    /// `row_number` 从 1 开始，仅用于错误定位
    pub fn map_record(
        &self,
        row: &RawRow,
        mapping: &FieldMapping,
        row_number: usize,
    ) -> ImportResult<RawRecord> {
        let entity_id = self.require_string(row, &mapping.entity, row_number)?;
        let category_key = self.get_string(row, &mapping.category).unwrap_or_default();
        let timestamp = self.parse_date(row, &mapping.date, row_number)?;
        let measure = self
            .parse_f64(row, &mapping.measure, row_number)?
            .unwrap_or(f64::NAN);

        Ok(RawRecord {
            entity_id,
            category_key,
            timestamp,
            measure,
        })
    }

    /// 映射一行排产分配
    pub fn map_assignment(
        &self,
        row: &RawRow,
        mapping: &AssignmentMapping,
        row_number: usize,
    ) -> ImportResult<Assignment> {
        Ok(Assignment {
            entity_id: self.require_string(row, &mapping.entity, row_number)?,
            date: self.parse_date(row, &mapping.date, row_number)?,
            category: self.require_string(row, &mapping.category, row_number)?,
        })
    }

    /// 映射一行机组日负荷
    ///
    /// 工时缺失按 0；超负荷工时缺失时取 max(需求 - 可用, 0)
    pub fn map_mill_load(&self, row: &RawRow, row_number: usize) -> ImportResult<MillLoadRecord> {
        let required_hours = self
            .parse_f64(row, "required_hours", row_number)?
            .unwrap_or(0.0);
        let available_hours = self
            .parse_f64(row, "available_hours", row_number)?
            .unwrap_or(0.0);
        let overload_hours = match self.parse_f64(row, "overload_hours", row_number)? {
            Some(v) => v,
            None => (required_hours - available_hours).max(0.0),
        };

        Ok(MillLoadRecord {
            mill_id: self.require_string(row, "mill_id", row_number)?,
            date: self.parse_date(row, "date", row_number)?,
            required_hours,
            available_hours,
            overload_hours,
        })
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    /// 提取字符串字段，依次尝试原列名与 camelCase 别名
    fn get_string(&self, row: &RawRow, key: &str) -> Option<String> {
        let camel = to_camel_case(key);
        let found = [key, camel.as_str()]
            .into_iter()
            .filter_map(|alias| row.get(alias))
            .map(|v| v.trim())
            .find(|v| !v.is_empty() && !v.eq_ignore_ascii_case("null"))
            .map(str::to_string);
        found
    }

    fn require_string(&self, row: &RawRow, key: &str, row_number: usize) -> ImportResult<String> {
        self.get_string(row, key)
            .ok_or_else(|| ImportError::MissingField {
                row: row_number,
                field: key.to_string(),
            })
    }

    /// 解析浮点数（缺失返回 None）
    fn parse_f64(&self, row: &RawRow, key: &str, row_number: usize) -> ImportResult<Option<f64>> {
        match self.get_string(row, key) {
            None => Ok(None),
            Some(value) => value
                .parse::<f64>()
                .map(Some)
                .map_err(|_| ImportError::TypeConversionError {
                    row: row_number,
                    field: key.to_string(),
                    message: format!("无法解析为浮点数: {}", value),
                }),
        }
    }

    /// 解析日期（必填）
    fn parse_date(&self, row: &RawRow, key: &str, row_number: usize) -> ImportResult<NaiveDate> {
        let value = self.require_string(row, key, row_number)?;
        parse_date_str(&value).ok_or(ImportError::MalformedDate {
            row: row_number,
            field: key.to_string(),
            value,
        })
    }
}

/// 日期字符串 → 本地日历日
pub fn parse_date_str(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            // RFC 3339 带时区偏移，取其本地日期部分
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// snake_case → camelCase（"sku_id" → "skuId"）
fn to_camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;
    for ch in key.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}
