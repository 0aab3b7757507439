// ==========================================
// 面粉厂计划看板 - 记录导入流程
// ==========================================
// 流程: 解析（JSON / CSV）→ 映射 → 整批返回
// 红线: 任一行映射失败即整批拒绝
// ==========================================

use crate::domain::record::{Assignment, MillLoadRecord, RawRecord};
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::{AssignmentMapping, FieldMapper, FieldMapping};
use crate::importer::file_parser::{CsvParser, JsonParser, RawRow};
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use tracing::{info, instrument, warn};

/// 逐行映射，行号从 1 开始；首个错误即中止
fn map_rows<T>(
    rows: &[RawRow],
    source: &str,
    mut map: impl FnMut(&RawRow, usize) -> ImportResult<T>,
) -> ImportResult<Vec<T>> {
    let mapped: ImportResult<Vec<T>> = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| map(row, idx + 1))
        .collect();

    match &mapped {
        Ok(items) => info!(source, rows = items.len(), "导入完成"),
        Err(e) => warn!(source, error = %e, "导入失败，整批拒绝"),
    }
    mapped
}

// ==========================================
// 观测行
// ==========================================

pub fn records_from_rows(rows: &[RawRow], mapping: &FieldMapping) -> ImportResult<Vec<RawRecord>> {
    let mapper = FieldMapper::new();
    map_rows(rows, "records", |row, n| mapper.map_record(row, mapping, n))
}

/// 从 API 响应体（JSON）导入观测行
#[instrument(skip(json, mapping), fields(bytes = json.len()))]
pub fn records_from_json(json: &str, mapping: &FieldMapping) -> ImportResult<Vec<RawRecord>> {
    let rows = JsonParser.parse_str(json)?;
    records_from_rows(&rows, mapping)
}

pub fn records_from_values(values: &[Value], mapping: &FieldMapping) -> ImportResult<Vec<RawRecord>> {
    let rows = JsonParser.parse_values(values)?;
    records_from_rows(&rows, mapping)
}

pub fn records_from_csv_reader<R: Read>(
    reader: R,
    mapping: &FieldMapping,
) -> ImportResult<Vec<RawRecord>> {
    let rows = CsvParser.parse_reader(reader)?;
    records_from_rows(&rows, mapping)
}

/// 从 CSV 文件导入观测行（校验存在性与扩展名）
#[instrument(skip(path, mapping), fields(path = %path.display()))]
pub fn records_from_csv_path(path: &Path, mapping: &FieldMapping) -> ImportResult<Vec<RawRecord>> {
    let rows = CsvParser.parse_path(path)?;
    records_from_rows(&rows, mapping)
}

// ==========================================
// 排产分配
// ==========================================

pub fn assignments_from_rows(
    rows: &[RawRow],
    mapping: &AssignmentMapping,
) -> ImportResult<Vec<Assignment>> {
    let mapper = FieldMapper::new();
    map_rows(rows, "assignments", |row, n| mapper.map_assignment(row, mapping, n))
}

pub fn assignments_from_json(
    json: &str,
    mapping: &AssignmentMapping,
) -> ImportResult<Vec<Assignment>> {
    let rows = JsonParser.parse_str(json)?;
    assignments_from_rows(&rows, mapping)
}

// ==========================================
// 机组负荷
// ==========================================

pub fn mill_load_from_rows(rows: &[RawRow]) -> ImportResult<Vec<MillLoadRecord>> {
    let mapper = FieldMapper::new();
    map_rows(rows, "mill_load", |row, n| mapper.map_mill_load(row, n))
}

pub fn mill_load_from_json(json: &str) -> ImportResult<Vec<MillLoadRecord>> {
    let rows = JsonParser.parse_str(json)?;
    mill_load_from_rows(&rows)
}
