// ==========================================
// 面粉厂计划看板 - 瀑布图步骤
// ==========================================

use crate::domain::types::StepKind;
use serde::{Deserialize, Serialize};

/// 归一化瀑布步骤
///
/// percent 只用于柱高；raw_value 是提示框显示的原始数值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterfallStep {
    pub label: String,
    pub raw_value: f64,
    pub percent: f64,
    pub kind: StepKind,
}
