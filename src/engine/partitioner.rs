// ==========================================
// 面粉厂计划看板 - 历史/预测分割引擎
// ==========================================
// 职责: 按分割日把聚合序列拆成历史段与预测段，并给出分割线周期
// 输入: 聚合序列 + 分割日 + 粒度
// 输出: SplitSeries
// ==========================================
// 规则:
// - 日/周: 周期 ≤ 分割周期 → 历史；> 分割周期 → 预测；不复制边界
// - 月/年: 包含分割日的桶同时进入两段且值相同，折线在粗粒度边界处不断开
// ==========================================

use crate::domain::series::{AggregatedPoint, AggregatedSeries, SplitSeries};
use crate::domain::types::Granularity;
use crate::engine::period_key::PeriodKeyResolver;
use chrono::NaiveDate;
use std::cmp::Ordering;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy, Default)]
pub struct ForecastPartitioner {
    resolver: PeriodKeyResolver,
}

impl ForecastPartitioner {
    pub fn new() -> Self {
        Self {
            resolver: PeriodKeyResolver::new(),
        }
    }

    /// 分割聚合序列
    ///
    /// # 参数
    /// - `series`: 周期键 → 合计
    /// - `cutover`: 分割日（已观测 / 预测的分界）
    /// - `granularity`: 时间粒度
    ///
    /// # 返回
    /// 分割结果；分割日落在观测范围之外时其中一段可能为空
    pub fn partition(
        &self,
        series: &AggregatedSeries,
        cutover: NaiveDate,
        granularity: Granularity,
    ) -> SplitSeries {
        let points: Vec<AggregatedPoint> = series
            .iter()
            .map(|(period, value)| AggregatedPoint::present(period.clone(), *value))
            .collect();
        self.partition_points(&points, cutover, granularity)
    }

    /// 分割点列表（保留 None 缺口）
    #[instrument(skip(self, points), fields(points = points.len(), cutover = %cutover, granularity = %granularity))]
    pub fn partition_points(
        &self,
        points: &[AggregatedPoint],
        cutover: NaiveDate,
        granularity: Granularity,
    ) -> SplitSeries {
        if points.is_empty() {
            return SplitSeries::default();
        }

        let cutover_period = self.resolver.resolve(cutover, granularity);
        let duplicate_boundary = !granularity.is_fine();

        let mut sorted: Vec<&AggregatedPoint> = points.iter().collect();
        sorted.sort_by(|a, b| a.period.cmp(&b.period));

        let mut historical = Vec::new();
        let mut forecasted = Vec::new();

        for point in sorted {
            match point.period.cmp(&cutover_period) {
                Ordering::Less => historical.push(point.clone()),
                Ordering::Greater => forecasted.push(point.clone()),
                Ordering::Equal => {
                    historical.push(point.clone());
                    if duplicate_boundary {
                        forecasted.push(point.clone());
                    }
                }
            }
        }

        debug!(
            historical = historical.len(),
            forecasted = forecasted.len(),
            divider = %cutover_period,
            "分割完成"
        );

        SplitSeries {
            historical,
            forecasted,
            divider_period: Some(cutover_period),
        }
    }
}
