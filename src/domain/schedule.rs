// ==========================================
// 面粉厂计划看板 - 排产甘特对象
// ==========================================
// 职责: 合并后的连续运行块（机组 × 配方）
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// RunBlock - 连续运行块
// ==========================================
/// 某实体连续分配给同一类别的区间
///
/// offset 为相对全体最早日期的 1 起始天序号。
/// 不变量: start_offset ≤ end_offset；同一实体的块互不重叠且按起点升序。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunBlock {
    pub entity_id: String,
    pub category: String,
    pub start_offset: i64,
    pub end_offset: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl RunBlock {
    /// 块覆盖的天数（含缺口容忍天）
    pub fn span_days(&self) -> i64 {
        self.end_offset - self.start_offset + 1
    }
}

// ==========================================
// GanttSchedule - 甘特图数据
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GanttSchedule {
    /// day1（offset = 1 对应的日期），无分配时为 None
    pub origin: Option<NaiveDate>,
    /// 横轴长度（天）
    pub horizon_days: i64,
    pub blocks: Vec<RunBlock>,
}
