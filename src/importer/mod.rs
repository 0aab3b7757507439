// ==========================================
// 面粉厂计划看板 - 导入层
// ==========================================
// 职责: 外部行数据（API JSON / CSV 导出）→ 领域记录
// 支持: JSON, CSV
// ==========================================

// 模块声明
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod record_importer;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use field_mapper::{parse_date_str, AssignmentMapping, FieldMapper, FieldMapping};
pub use file_parser::{CsvParser, JsonParser, RawRow};
pub use record_importer::{
    assignments_from_json, assignments_from_rows, mill_load_from_json, mill_load_from_rows,
    records_from_csv_path, records_from_csv_reader, records_from_json, records_from_rows,
    records_from_values,
};
