// ==========================================
// 面粉厂计划看板 - 时间序列对象
// ==========================================
// 职责: PeriodKey / 聚合点 / 历史-预测分割结果
// 红线: None 表示"无观测"，不是 0，任何环节不得按 0 求和
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ==========================================
// PeriodKey - 周期键
// ==========================================
/// 某一粒度下唯一标识一个时间桶的字符串
///
/// 格式零填充，固定粒度下字典序 = 时间序。
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeriodKey(String);

impl PeriodKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeriodKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for PeriodKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// 单条序列: 周期 → 合计值
pub type AggregatedSeries = BTreeMap<PeriodKey, f64>;

/// 多条序列: 序列键（实体或类别） → 单条序列
pub type SeriesMap = BTreeMap<String, AggregatedSeries>;

// ==========================================
// AggregatedPoint - 聚合点
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedPoint {
    pub period: PeriodKey,
    /// None = 无观测
    pub value: Option<f64>,
}

impl AggregatedPoint {
    pub fn new(period: PeriodKey, value: Option<f64>) -> Self {
        Self { period, value }
    }

    pub fn present(period: PeriodKey, value: f64) -> Self {
        Self {
            period,
            value: Some(value),
        }
    }

    pub fn gap(period: PeriodKey) -> Self {
        Self {
            period,
            value: None,
        }
    }
}

// ==========================================
// SplitSeries - 历史/预测分割结果
// ==========================================
/// 历史段与预测段
///
/// 同一周期至多在一侧出现；例外: 月/年粒度下包含分割日的桶两侧都有，
/// 值相同，用于折线在粗粒度边界处连续。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitSeries {
    pub historical: Vec<AggregatedPoint>,
    pub forecasted: Vec<AggregatedPoint>,
    /// 图表上的分割线位置（输入为空时为 None）
    pub divider_period: Option<PeriodKey>,
}

/// 对齐后的图表行（折线图数据源）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRow {
    pub period: PeriodKey,
    pub historical: Option<f64>,
    pub forecasted: Option<f64>,
}

impl SplitSeries {
    pub fn is_empty(&self) -> bool {
        self.historical.is_empty() && self.forecasted.is_empty()
    }

    /// 按周期对齐两段，生成图表行（按周期升序）
    pub fn chart_rows(&self) -> Vec<ChartRow> {
        let mut rows: BTreeMap<&PeriodKey, (Option<f64>, Option<f64>)> = BTreeMap::new();
        for point in &self.historical {
            rows.entry(&point.period).or_default().0 = point.value;
        }
        for point in &self.forecasted {
            rows.entry(&point.period).or_default().1 = point.value;
        }

        rows.into_iter()
            .map(|(period, (historical, forecasted))| ChartRow {
                period: period.clone(),
                historical,
                forecasted,
            })
            .collect()
    }
}
