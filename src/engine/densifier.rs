// ==========================================
// 面粉厂计划看板 - 序列补齐引擎
// ==========================================
// 职责: 日/周粒度下把稀疏序列展开为区间内每个周期一个点，缺失处显式 None
// 输入: 周期键 → 值（可缺失） + 区间 + 粒度
// 输出: 按周期升序的 AggregatedPoint 列表
// ==========================================
// 说明: 月/年粒度不补齐，只按区间过滤
// 零值: ZeroPolicy::AsGap 时合计恰好为 0 的桶输出 None
//       （无行与合计为 0 无法区分，看板依赖此行为避免画出虚假的 0 点）
// ==========================================

use crate::domain::series::{AggregatedPoint, AggregatedSeries, PeriodKey};
use crate::domain::types::{Granularity, ZeroPolicy};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::period_key::PeriodKeyResolver;
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct Densifier {
    resolver: PeriodKeyResolver,
    zero_policy: ZeroPolicy,
}

impl Densifier {
    pub fn new(zero_policy: ZeroPolicy) -> Self {
        Self {
            resolver: PeriodKeyResolver::new(),
            zero_policy,
        }
    }

    pub fn zero_policy(&self) -> ZeroPolicy {
        self.zero_policy
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 补齐序列
    ///
    /// # 参数
    /// - `series`: 周期键 → 值（None 为无观测）
    /// - `range_start` / `range_end`: 闭区间
    /// - `granularity`: 时间粒度
    ///
    /// # 返回
    /// - 日/周: 长度 = 区间内日历日数 / ISO 周数
    /// - 月/年: 区间内已有周期
    /// - 区间颠倒: 空列表
    #[instrument(skip(self, series), fields(entries = series.len(), granularity = %granularity))]
    pub fn densify(
        &self,
        series: &BTreeMap<PeriodKey, Option<f64>>,
        range_start: NaiveDate,
        range_end: NaiveDate,
        granularity: Granularity,
    ) -> Vec<AggregatedPoint> {
        if !granularity.is_fine() {
            return self.filter_coarse(series, range_start, range_end, granularity);
        }

        let keys = match self.period_range(range_start, range_end, granularity) {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "补齐区间无效，返回空序列");
                return Vec::new();
            }
        };

        let points: Vec<AggregatedPoint> = keys
            .into_iter()
            .map(|period| {
                let value = series.get(&period).copied().flatten();
                AggregatedPoint::new(period, self.apply_zero_policy(value))
            })
            .collect();

        debug!(
            points = points.len(),
            gaps = points.iter().filter(|p| p.value.is_none()).count(),
            "补齐完成"
        );

        points
    }

    /// 补齐聚合引擎输出（值均存在）
    pub fn densify_series(
        &self,
        series: &AggregatedSeries,
        range_start: NaiveDate,
        range_end: NaiveDate,
        granularity: Granularity,
    ) -> Vec<AggregatedPoint> {
        let optional: BTreeMap<PeriodKey, Option<f64>> = series
            .iter()
            .map(|(period, value)| (period.clone(), Some(*value)))
            .collect();
        self.densify(&optional, range_start, range_end, granularity)
    }

    /// 枚举区间内每个周期键（闭区间，升序）
    ///
    /// # 错误
    /// - `InvalidRange`: range_start > range_end
    pub fn period_range(
        &self,
        range_start: NaiveDate,
        range_end: NaiveDate,
        granularity: Granularity,
    ) -> EngineResult<Vec<PeriodKey>> {
        if range_start > range_end {
            return Err(EngineError::InvalidRange {
                start: range_start,
                end: range_end,
            });
        }

        let mut keys = Vec::new();
        let mut cursor = self.resolver.bucket_start(range_start, granularity);
        while cursor <= range_end {
            keys.push(self.resolver.resolve(cursor, granularity));
            cursor = match self.next_bucket_start(cursor, granularity) {
                Some(next) => next,
                None => break,
            };
        }
        Ok(keys)
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    fn next_bucket_start(&self, current: NaiveDate, granularity: Granularity) -> Option<NaiveDate> {
        match granularity {
            Granularity::Day => current.checked_add_signed(Duration::days(1)),
            Granularity::Week => current.checked_add_signed(Duration::days(7)),
            Granularity::Month => current.checked_add_months(chrono::Months::new(1)),
            Granularity::Year => current.checked_add_months(chrono::Months::new(12)),
        }
    }

    fn apply_zero_policy(&self, value: Option<f64>) -> Option<f64> {
        match value {
            Some(v) if !v.is_finite() => None,
            Some(v) if v == 0.0 && self.zero_policy == ZeroPolicy::AsGap => None,
            other => other,
        }
    }

    fn filter_coarse(
        &self,
        series: &BTreeMap<PeriodKey, Option<f64>>,
        range_start: NaiveDate,
        range_end: NaiveDate,
        granularity: Granularity,
    ) -> Vec<AggregatedPoint> {
        if range_start > range_end {
            return Vec::new();
        }
        let first = self.resolver.resolve(range_start, granularity);
        let last = self.resolver.resolve(range_end, granularity);

        series
            .range(first..=last)
            .map(|(period, value)| AggregatedPoint::new(period.clone(), self.apply_zero_policy(*value)))
            .collect()
    }
}
