// ==========================================
// 面粉厂计划看板 - 产能与 KPI 对象
// ==========================================
// 职责: 机组产能汇总行、超负荷告警、经营总览 KPI
// ==========================================

use crate::domain::series::PeriodKey;
use crate::domain::types::AlertSeverity;
use serde::{Deserialize, Serialize};

// ==========================================
// MillCapacityRow - 机组周期产能汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MillCapacityRow {
    pub period: PeriodKey,
    pub mill_id: String,
    pub required_hours: f64,
    pub available_hours: f64,
    pub overload_hours: f64,
    /// 需求 / 可用 × 100，保留两位小数
    pub utilization_pct: f64,
}

// ==========================================
// CapacityAlert - 超负荷告警
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityAlert {
    pub mill_id: String,
    pub period: PeriodKey,
    pub overload_hours: f64,
    pub severity: AlertSeverity,
}

// ==========================================
// ExecutiveKpis - 经营总览
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutiveKpis {
    pub period: PeriodKey,
    pub demand_tons: f64,
    /// 环比增长（%），无上期或上期 ≤ 0 时为 0
    pub demand_growth_pct: f64,
    pub required_hours: f64,
    pub available_hours: f64,
    pub utilization_pct: f64,
    /// 本期存在超负荷的机组数
    pub overload_mills: usize,
    /// 本期小麦采购均价（无价格数据为 0）
    pub avg_wheat_price: f64,
}
