// ==========================================
// 面粉厂计划看板 - 聚合引擎
// ==========================================
// 职责: 原始行按 (序列键, 周期键) 分桶求和/求均值
// 输入: RawRecord 列表 + 粒度
// 输出: 序列键 → (周期键 → 值)
// ==========================================
// 红线: 结果与输入顺序无关（桶内先排序再求和）
// 红线: 非有限度量按 0 贡献，但实体仍须出现在结果中
// ==========================================

use crate::domain::record::RawRecord;
use crate::domain::series::{AggregatedSeries, PeriodKey, SeriesMap};
use crate::domain::types::{AggregateMode, Granularity, GroupBy};
use crate::engine::period_key::PeriodKeyResolver;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// 非有限值（NaN / ±inf）按 0 处理
pub(crate) fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// 桶内贡献值 → 桶值
///
/// 按 total_cmp 排序后顺序累加，保证同一多重集合得到逐位相同的结果。
pub(crate) fn reduce_bucket(mut values: Vec<f64>, mode: AggregateMode) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let sum: f64 = values.iter().sum();
    match mode {
        AggregateMode::Sum => sum,
        AggregateMode::Mean => sum / values.len() as f64,
    }
}

// ==========================================
// Aggregator - 聚合引擎
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator {
    resolver: PeriodKeyResolver,
}

impl Aggregator {
    pub fn new() -> Self {
        Self {
            resolver: PeriodKeyResolver::new(),
        }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 按实体聚合求和
    ///
    /// # 参数
    /// - `rows`: 原始行（只读）
    /// - `granularity`: 时间粒度
    ///
    /// # 返回
    /// entity_id → (周期键 → 合计)
    pub fn aggregate(&self, rows: &[RawRecord], granularity: Granularity) -> SeriesMap {
        self.aggregate_with(rows, granularity, GroupBy::Entity, AggregateMode::Sum)
    }

    /// 按指定维度与方式聚合
    ///
    /// # 参数
    /// - `group_by`: 实体（SKU/机组）或类别（面粉类型/配方）
    /// - `mode`: 求和或求均值
    #[instrument(skip(self, rows), fields(rows = rows.len(), granularity = %granularity))]
    pub fn aggregate_with(
        &self,
        rows: &[RawRecord],
        granularity: Granularity,
        group_by: GroupBy,
        mode: AggregateMode,
    ) -> SeriesMap {
        let mut buckets: BTreeMap<String, BTreeMap<PeriodKey, Vec<f64>>> = BTreeMap::new();
        let mut non_finite = 0usize;

        for row in rows {
            if !row.measure.is_finite() {
                non_finite += 1;
            }
            let series_key = match group_by {
                GroupBy::Entity => &row.entity_id,
                GroupBy::Category => &row.category_key,
            };
            let period = self.resolver.resolve(row.timestamp, granularity);

            buckets
                .entry(series_key.clone())
                .or_default()
                .entry(period)
                .or_default()
                .push(row.contribution());
        }

        let result: SeriesMap = buckets
            .into_iter()
            .map(|(key, periods)| {
                let series: AggregatedSeries = periods
                    .into_iter()
                    .map(|(period, values)| (period, reduce_bucket(values, mode)))
                    .collect();
                (key, series)
            })
            .collect();

        debug!(
            series = result.len(),
            non_finite_rows = non_finite,
            mode = %mode,
            "聚合完成"
        );

        result
    }

    /// 全部实体合并为一条序列（经营总览口径）
    pub fn total_by_period(
        &self,
        rows: &[RawRecord],
        granularity: Granularity,
        mode: AggregateMode,
    ) -> AggregatedSeries {
        let mut buckets: BTreeMap<PeriodKey, Vec<f64>> = BTreeMap::new();
        for row in rows {
            buckets
                .entry(self.resolver.resolve(row.timestamp, granularity))
                .or_default()
                .push(row.contribution());
        }

        buckets
            .into_iter()
            .map(|(period, values)| (period, reduce_bucket(values, mode)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(entity: &str, category: &str, date: &str, measure: f64) -> RawRecord {
        RawRecord::new(
            entity,
            category,
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            measure,
        )
    }

    #[test]
    fn test_aggregate_sums_same_bucket() {
        let aggregator = Aggregator::new();
        let rows = vec![
            row("SKU1", "Bakery", "2026-02-10", 5.0),
            row("SKU1", "Bakery", "2026-02-20", 7.0),
            row("SKU2", "Patent", "2026-03-01", 3.0),
        ];

        let result = aggregator.aggregate(&rows, Granularity::Month);

        assert_eq!(result.len(), 2);
        assert_eq!(result["SKU1"][&PeriodKey::from("2026-02")], 12.0);
        assert_eq!(result["SKU2"][&PeriodKey::from("2026-03")], 3.0);
    }

    #[test]
    fn test_non_finite_counts_as_zero_but_entity_present() {
        let aggregator = Aggregator::new();
        let rows = vec![
            row("SKU1", "Bakery", "2026-02-10", f64::NAN),
            row("SKU1", "Bakery", "2026-02-10", f64::NEG_INFINITY),
            row("SKU2", "Bakery", "2026-02-10", 4.0),
            row("SKU2", "Bakery", "2026-02-10", f64::INFINITY),
        ];

        let result = aggregator.aggregate(&rows, Granularity::Day);

        assert_eq!(result["SKU1"][&PeriodKey::from("2026-02-10")], 0.0);
        assert_eq!(result["SKU2"][&PeriodKey::from("2026-02-10")], 4.0);
    }

    #[test]
    fn test_group_by_category() {
        let aggregator = Aggregator::new();
        let rows = vec![
            row("SKU1", "Bakery", "2026-02-10", 5.0),
            row("SKU2", "Bakery", "2026-02-11", 2.0),
            row("SKU3", "Whole", "2026-02-12", 1.0),
        ];

        let result = aggregator.aggregate_with(
            &rows,
            Granularity::Week,
            GroupBy::Category,
            AggregateMode::Sum,
        );

        assert_eq!(result["Bakery"][&PeriodKey::from("2026-W07")], 7.0);
        assert_eq!(result["Whole"][&PeriodKey::from("2026-W07")], 1.0);
    }

    #[test]
    fn test_mean_mode() {
        let aggregator = Aggregator::new();
        let rows = vec![
            row("SA", "wheat", "2026-01-05", 1000.0),
            row("SA", "wheat", "2026-01-20", 1100.0),
        ];

        let result =
            aggregator.aggregate_with(&rows, Granularity::Month, GroupBy::Entity, AggregateMode::Mean);

        assert_eq!(result["SA"][&PeriodKey::from("2026-01")], 1050.0);
    }

    #[test]
    fn test_total_by_period() {
        let aggregator = Aggregator::new();
        let rows = vec![
            row("SKU1", "Bakery", "2026-02-10", 5.0),
            row("SKU2", "Bakery", "2026-02-11", 2.0),
            row("SKU2", "Bakery", "2027-01-11", 2.0),
        ];

        let total = aggregator.total_by_period(&rows, Granularity::Year, AggregateMode::Sum);
        assert_eq!(total[&PeriodKey::from("2026")], 7.0);
        assert_eq!(total[&PeriodKey::from("2027")], 2.0);
    }

    #[test]
    fn test_empty_rows() {
        let aggregator = Aggregator::new();
        assert!(aggregator.aggregate(&[], Granularity::Day).is_empty());
    }

    #[test]
    fn test_reduce_bucket_order_independent() {
        let a = reduce_bucket(vec![0.1, 0.2, 0.3, 1e16, -1e16], AggregateMode::Sum);
        let b = reduce_bucket(vec![-1e16, 0.3, 1e16, 0.2, 0.1], AggregateMode::Sum);
        assert_eq!(a.to_bits(), b.to_bits());
    }
}
