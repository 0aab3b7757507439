// ==========================================
// 面粉厂计划看板 - 原始记录
// ==========================================
// 职责: 外部 API 返回的行级数据（已完成类型转换）
// 红线: 核心只读不改，调用方拥有所有权
// ==========================================

use crate::engine::aggregator::finite_or_zero;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// RawRecord - 原始观测行
// ==========================================
/// 一行观测（如: 某 SKU 某日某面粉类型的预测吨数）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    /// 实体 ID（SKU / 机组）
    pub entity_id: String,
    /// 类别键（面粉类型 / 配方）
    pub category_key: String,
    /// 观测日期（本地日历日）
    pub timestamp: NaiveDate,
    /// 数值度量（非有限值按 0 贡献）
    pub measure: f64,
}

impl RawRecord {
    pub fn new(
        entity_id: impl Into<String>,
        category_key: impl Into<String>,
        timestamp: NaiveDate,
        measure: f64,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            category_key: category_key.into(),
            timestamp,
            measure,
        }
    }

    /// 参与求和的有效贡献（NaN / ±inf → 0）
    pub fn contribution(&self) -> f64 {
        finite_or_zero(self.measure)
    }
}

// ==========================================
// Assignment - 排产分配（机组-日-配方）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub entity_id: String,
    pub date: NaiveDate,
    pub category: String,
}

impl Assignment {
    pub fn new(entity_id: impl Into<String>, date: NaiveDate, category: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            date,
            category: category.into(),
        }
    }
}

// ==========================================
// Stage - 转化漏斗阶段
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub label: String,
    pub value: f64,
}

impl Stage {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

// ==========================================
// MillLoadRecord - 机组日负荷
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MillLoadRecord {
    pub mill_id: String,
    pub date: NaiveDate,
    /// 需求工时
    pub required_hours: f64,
    /// 可用工时
    pub available_hours: f64,
    /// 超负荷工时
    pub overload_hours: f64,
}

impl MillLoadRecord {
    /// 当日是否超负荷（超负荷工时为有限正数）
    pub fn is_overloaded(&self) -> bool {
        self.overload_hours.is_finite() && self.overload_hours > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 10).unwrap()
    }

    #[test]
    fn test_contribution_non_finite_is_zero() {
        assert_eq!(RawRecord::new("E1", "", day(), 2.5).contribution(), 2.5);
        assert_eq!(RawRecord::new("E1", "", day(), f64::NAN).contribution(), 0.0);
        assert_eq!(RawRecord::new("E1", "", day(), f64::NEG_INFINITY).contribution(), 0.0);
    }

    #[test]
    fn test_mill_load_is_overloaded() {
        let load = |overload: f64| MillLoadRecord {
            mill_id: "M1".into(),
            date: day(),
            required_hours: 24.0,
            available_hours: 24.0,
            overload_hours: overload,
        };

        assert!(load(4.0).is_overloaded());
        assert!(!load(0.0).is_overloaded());
        assert!(!load(-4.0).is_overloaded());
        assert!(!load(f64::NAN).is_overloaded());
        assert!(!load(f64::INFINITY).is_overloaded());
    }
}
