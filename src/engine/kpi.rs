// ==========================================
// 面粉厂计划看板 - 经营总览 KPI 引擎
// ==========================================
// 职责: 本期需求总量、环比增长、产能利用率、超负荷机组数、小麦均价
// 输入: 需求原始行 + 机组负荷行 + 原料价格行 + 周期
// 输出: ExecutiveKpis
// ==========================================

use crate::domain::capacity::ExecutiveKpis;
use crate::domain::record::{MillLoadRecord, RawRecord};
use crate::domain::series::{AggregatedSeries, PeriodKey};
use crate::domain::types::{AggregateMode, Granularity};
use crate::engine::aggregator::{finite_or_zero, reduce_bucket, Aggregator};
use crate::engine::period_key::PeriodKeyResolver;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use tracing::{info, instrument};

/// 保留两位小数
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 利用率（%）
///
/// 可用工时 ≤ 0 或结果非有限时返回 0
pub fn utilization_pct(required: f64, available: f64) -> f64 {
    if available <= 0.0 {
        return 0.0;
    }
    let pct = required / available * 100.0;
    if pct.is_finite() {
        round2(pct)
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct KpiEngine {
    aggregator: Aggregator,
    resolver: PeriodKeyResolver,
}

impl KpiEngine {
    pub fn new() -> Self {
        Self {
            aggregator: Aggregator::new(),
            resolver: PeriodKeyResolver::new(),
        }
    }

    /// 调用方未指定周期时的默认周期（今天所在的桶）
    pub fn current_period(&self, today: NaiveDate, granularity: Granularity) -> PeriodKey {
        self.resolver.resolve(today, granularity)
    }

    /// 本期合计（无数据为 0）
    pub fn period_total(&self, series: &AggregatedSeries, period: &PeriodKey) -> f64 {
        series.get(period).copied().unwrap_or(0.0)
    }

    /// 环比增长（%）
    ///
    /// 上期 = 序列中早于本期的最近周期。
    /// 本期不在序列中、没有上期、上期 ≤ 0 时返回 0。
    pub fn growth_pct(&self, series: &AggregatedSeries, period: &PeriodKey) -> f64 {
        let Some(current) = series.get(period) else {
            return 0.0;
        };
        match series.range(..period.clone()).next_back() {
            Some((_, previous)) if *previous > 0.0 => round2((current - previous) / previous * 100.0),
            _ => 0.0,
        }
    }

    /// 本期均价（非有限价格不计入；无数据为 0）
    pub fn average_price(
        &self,
        price_rows: &[RawRecord],
        period: &PeriodKey,
        granularity: Granularity,
    ) -> f64 {
        let prices: Vec<f64> = price_rows
            .iter()
            .filter(|r| r.measure.is_finite())
            .filter(|r| &self.resolver.resolve(r.timestamp, granularity) == period)
            .map(|r| r.measure)
            .collect();
        round2(reduce_bucket(prices, AggregateMode::Mean))
    }

    /// 经营总览 KPI
    #[instrument(skip(self, demand_rows, mill_load, price_rows), fields(
        demand_rows = demand_rows.len(),
        mill_load_rows = mill_load.len(),
        price_rows = price_rows.len(),
        period = %period
    ))]
    pub fn executive_kpis(
        &self,
        demand_rows: &[RawRecord],
        mill_load: &[MillLoadRecord],
        price_rows: &[RawRecord],
        period: &PeriodKey,
        granularity: Granularity,
    ) -> ExecutiveKpis {
        let demand = self
            .aggregator
            .total_by_period(demand_rows, granularity, AggregateMode::Sum);

        let mut required = Vec::new();
        let mut available = Vec::new();
        let mut overloaded: BTreeSet<&str> = BTreeSet::new();

        for row in mill_load
            .iter()
            .filter(|r| &self.resolver.resolve(r.date, granularity) == period)
        {
            required.push(finite_or_zero(row.required_hours));
            available.push(finite_or_zero(row.available_hours));
            if row.is_overloaded() {
                overloaded.insert(row.mill_id.as_str());
            }
        }

        let required_hours = reduce_bucket(required, AggregateMode::Sum);
        let available_hours = reduce_bucket(available, AggregateMode::Sum);

        let kpis = ExecutiveKpis {
            period: period.clone(),
            demand_tons: self.period_total(&demand, period),
            demand_growth_pct: self.growth_pct(&demand, period),
            required_hours: round2(required_hours),
            available_hours: round2(available_hours),
            utilization_pct: utilization_pct(required_hours, available_hours),
            overload_mills: overloaded.len(),
            avg_wheat_price: self.average_price(price_rows, period, granularity),
        };

        info!(
            demand_tons = kpis.demand_tons,
            utilization_pct = kpis.utilization_pct,
            overload_mills = kpis.overload_mills,
            avg_wheat_price = kpis.avg_wheat_price,
            "经营总览 KPI 计算完成"
        );

        kpis
    }
}
