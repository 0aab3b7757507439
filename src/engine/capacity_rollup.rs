// ==========================================
// 面粉厂计划看板 - 机组产能汇总引擎
// ==========================================
// 职责: 机组日负荷 → (周期, 机组) 汇总 + 利用率 + 超负荷告警
// 输入: MillLoadRecord 列表 + 粒度 + 可选过滤
// 输出: MillCapacityRow / CapacityAlert
// ==========================================

use crate::domain::capacity::{CapacityAlert, MillCapacityRow};
use crate::domain::record::MillLoadRecord;
use crate::domain::series::PeriodKey;
use crate::domain::types::{AggregateMode, AlertSeverity, Granularity};
use crate::engine::aggregator::{finite_or_zero, reduce_bucket};
use crate::engine::kpi::{round2, utilization_pct};
use crate::engine::period_key::PeriodKeyResolver;
use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

#[derive(Default)]
struct HoursBucket {
    required: Vec<f64>,
    available: Vec<f64>,
    overload: Vec<f64>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CapacityRollup {
    resolver: PeriodKeyResolver,
}

impl CapacityRollup {
    pub fn new() -> Self {
        Self {
            resolver: PeriodKeyResolver::new(),
        }
    }

    /// 按 (周期, 机组) 汇总工时
    ///
    /// # 参数
    /// - `period`: 仅保留该周期（None 为全部）
    /// - `mill_id`: 仅保留该机组（None 为全部）
    ///
    /// # 返回
    /// 按 (周期, 机组) 升序
    #[instrument(skip(self, records), fields(records = records.len(), granularity = %granularity))]
    pub fn rollup(
        &self,
        records: &[MillLoadRecord],
        granularity: Granularity,
        period: Option<&PeriodKey>,
        mill_id: Option<&str>,
    ) -> Vec<MillCapacityRow> {
        let mut buckets: BTreeMap<(PeriodKey, &str), HoursBucket> = BTreeMap::new();

        for record in records {
            if mill_id.is_some_and(|m| m != record.mill_id) {
                continue;
            }
            let key = self.resolver.resolve(record.date, granularity);
            if period.is_some_and(|p| p != &key) {
                continue;
            }

            let bucket = buckets.entry((key, record.mill_id.as_str())).or_default();
            bucket.required.push(finite_or_zero(record.required_hours));
            bucket.available.push(finite_or_zero(record.available_hours));
            bucket.overload.push(finite_or_zero(record.overload_hours));
        }

        let rows: Vec<MillCapacityRow> = buckets
            .into_iter()
            .map(|((period, mill), bucket)| {
                let required = reduce_bucket(bucket.required, AggregateMode::Sum);
                let available = reduce_bucket(bucket.available, AggregateMode::Sum);
                MillCapacityRow {
                    period,
                    mill_id: mill.to_string(),
                    required_hours: round2(required),
                    available_hours: round2(available),
                    overload_hours: round2(reduce_bucket(bucket.overload, AggregateMode::Sum)),
                    utilization_pct: utilization_pct(required, available),
                }
            })
            .collect();

        debug!(rows = rows.len(), "产能汇总完成");
        rows
    }

    /// 超负荷告警
    ///
    /// 只累计超负荷工时 > 0 的日记录（欠负荷日不抵消超负荷），
    /// 每个 (周期, 机组) 合计 > 0 时出一条 High 告警
    #[instrument(skip(self, records), fields(records = records.len(), granularity = %granularity))]
    pub fn overload_alerts(
        &self,
        records: &[MillLoadRecord],
        granularity: Granularity,
        period: Option<&PeriodKey>,
    ) -> Vec<CapacityAlert> {
        let mut overloads: BTreeMap<(PeriodKey, &str), Vec<f64>> = BTreeMap::new();

        for record in records {
            if !record.is_overloaded() {
                continue;
            }
            let key = self.resolver.resolve(record.date, granularity);
            if period.is_some_and(|p| p != &key) {
                continue;
            }
            overloads
                .entry((key, record.mill_id.as_str()))
                .or_default()
                .push(record.overload_hours);
        }

        let alerts: Vec<CapacityAlert> = overloads
            .into_iter()
            .map(|((period, mill), hours)| CapacityAlert {
                mill_id: mill.to_string(),
                period,
                overload_hours: round2(reduce_bucket(hours, AggregateMode::Sum)),
                severity: AlertSeverity::High,
            })
            .collect();

        if !alerts.is_empty() {
            warn!(alerts = alerts.len(), "存在超负荷机组");
        }
        alerts
    }
}
