// ==========================================
// 面粉厂计划看板 - 看板 API
// ==========================================
// 职责: 按配置串联导入与引擎，输出各图表所需的数据结构
// 图表: 趋势折线（历史/预测）、排产甘特、转化瀑布、经营总览、机组产能
// 红线: 每次调用全量重算，不缓存
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::PlanningConfig;
use crate::domain::capacity::{CapacityAlert, ExecutiveKpis, MillCapacityRow};
use crate::domain::record::{Assignment, MillLoadRecord, RawRecord, Stage};
use crate::domain::schedule::GanttSchedule;
use crate::domain::series::{AggregatedPoint, PeriodKey, SplitSeries};
use crate::domain::waterfall::WaterfallStep;
use crate::engine::{
    Aggregator, CapacityRollup, Densifier, ForecastPartitioner, KpiEngine, PeriodKeyResolver,
    RunMerger, WaterfallNormalizer,
};
use crate::importer::{records_from_json, FieldMapping};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

// ==========================================
// EntityTrend - 单条趋势序列
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityTrend {
    /// 序列键（实体或类别，取决于 group_by）
    pub entity_id: String,
    pub split: SplitSeries,
    pub densified: Vec<AggregatedPoint>,
}

// ==========================================
// DashboardApi - 看板 API
// ==========================================
pub struct DashboardApi {
    config: PlanningConfig,
    resolver: PeriodKeyResolver,
    aggregator: Aggregator,
    partitioner: ForecastPartitioner,
    densifier: Densifier,
    run_merger: RunMerger,
    waterfall: WaterfallNormalizer,
    kpi_engine: KpiEngine,
    capacity: CapacityRollup,
}

impl DashboardApi {
    /// 创建看板 API（配置先校验）
    pub fn new(config: PlanningConfig) -> ApiResult<Self> {
        config.validate()?;

        Ok(Self {
            resolver: PeriodKeyResolver::new(),
            aggregator: Aggregator::new(),
            partitioner: ForecastPartitioner::new(),
            densifier: Densifier::new(config.zero_policy),
            run_merger: RunMerger::new(config.gap_tolerance_days),
            waterfall: WaterfallNormalizer::new(),
            kpi_engine: KpiEngine::new(),
            capacity: CapacityRollup::new(),
            config,
        })
    }

    pub fn config(&self) -> &PlanningConfig {
        &self.config
    }

    // ==========================================
    // 趋势折线
    // ==========================================

    /// 趋势序列（每个序列键一条：分割结果 + 补齐结果）
    ///
    /// 补齐区间未配置时取全部观测的最早/最晚日期，各序列共用同一时间轴
    #[instrument(skip(self, rows), fields(rows = rows.len(), granularity = %self.config.granularity))]
    pub fn trend_series(&self, rows: &[RawRecord]) -> ApiResult<Vec<EntityTrend>> {
        let granularity = self.config.granularity;

        let observed_start = rows.iter().map(|r| r.timestamp).min();
        let observed_end = rows.iter().map(|r| r.timestamp).max();
        let (Some(range_start), Some(range_end)) = (
            self.config.range_start.or(observed_start),
            self.config.range_end.or(observed_end),
        ) else {
            return Ok(Vec::new());
        };

        let series_map = self.aggregator.aggregate_with(
            rows,
            granularity,
            self.config.group_by,
            self.config.aggregate_mode,
        );

        let trends: Vec<EntityTrend> = series_map
            .into_iter()
            .map(|(entity_id, series)| EntityTrend {
                split: self
                    .partitioner
                    .partition(&series, self.config.cutover, granularity),
                densified: self
                    .densifier
                    .densify_series(&series, range_start, range_end, granularity),
                entity_id,
            })
            .collect();

        info!(series = trends.len(), "趋势序列生成完成");
        Ok(trends)
    }

    /// 趋势序列（直接接收 API 响应体）
    pub fn trend_series_from_json(
        &self,
        json: &str,
        mapping: &FieldMapping,
    ) -> ApiResult<Vec<EntityTrend>> {
        let rows = records_from_json(json, mapping)?;
        self.trend_series(&rows)
    }

    // ==========================================
    // 排产甘特
    // ==========================================

    pub fn schedule(&self, assignments: &[Assignment]) -> ApiResult<GanttSchedule> {
        Ok(self.run_merger.build_schedule(assignments))
    }

    // ==========================================
    // 转化瀑布
    // ==========================================

    pub fn conversion_waterfall(&self, stages: &[Stage]) -> ApiResult<Vec<WaterfallStep>> {
        if let Some(stage) = stages.iter().find(|s| s.label.trim().is_empty()) {
            return Err(ApiError::InvalidInput(format!(
                "瀑布阶段名称不能为空 (value={})",
                stage.value
            )));
        }
        Ok(self.waterfall.normalize(stages))
    }

    // ==========================================
    // 经营总览
    // ==========================================

    /// 经营总览 KPI
    ///
    /// `period` 为 None 时取分界日所在周期；`price_rows` 为原料价格行
    pub fn executive_kpis(
        &self,
        demand_rows: &[RawRecord],
        mill_load: &[MillLoadRecord],
        price_rows: &[RawRecord],
        period: Option<&str>,
    ) -> ApiResult<ExecutiveKpis> {
        let period = self.resolve_period(period)?;
        Ok(self.kpi_engine.executive_kpis(
            demand_rows,
            mill_load,
            price_rows,
            &period,
            self.config.granularity,
        ))
    }

    // ==========================================
    // 机组产能
    // ==========================================

    pub fn mill_capacity(
        &self,
        mill_load: &[MillLoadRecord],
        period: Option<&str>,
        mill_id: Option<&str>,
    ) -> ApiResult<Vec<MillCapacityRow>> {
        let period = period.map(|p| self.parse_period(p)).transpose()?;
        let mill_id = mill_id.map(str::trim).filter(|m| !m.is_empty());

        Ok(self
            .capacity
            .rollup(mill_load, self.config.granularity, period.as_ref(), mill_id))
    }

    pub fn alerts(
        &self,
        mill_load: &[MillLoadRecord],
        period: Option<&str>,
    ) -> ApiResult<Vec<CapacityAlert>> {
        let period = period.map(|p| self.parse_period(p)).transpose()?;
        Ok(self
            .capacity
            .overload_alerts(mill_load, self.config.granularity, period.as_ref()))
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    fn resolve_period(&self, period: Option<&str>) -> ApiResult<PeriodKey> {
        match period {
            Some(p) => self.parse_period(p),
            None => Ok(self
                .kpi_engine
                .current_period(self.config.cutover, self.config.granularity)),
        }
    }

    /// 校验调用方传入的周期键与当前粒度一致
    fn parse_period(&self, raw: &str) -> ApiResult<PeriodKey> {
        let key = PeriodKey::new(raw.trim());
        self.resolver
            .period_start(&key, self.config.granularity)?;
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Granularity;
    use crate::engine::EngineError;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn api(granularity: Granularity) -> DashboardApi {
        let mut config = PlanningConfig::new(date("2026-02-14"));
        config.granularity = granularity;
        DashboardApi::new(config).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = PlanningConfig::new(date("2026-02-14"));
        config.range_start = Some(date("2026-03-01"));
        config.range_end = Some(date("2026-01-01"));

        assert!(matches!(DashboardApi::new(config), Err(ApiError::Config(_))));
    }

    #[test]
    fn test_trend_series_empty_rows() {
        assert!(api(Granularity::Day).trend_series(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_period_must_match_granularity() {
        let api = api(Granularity::Month);
        let err = api.mill_capacity(&[], Some("2026-W07"), None).unwrap_err();
        assert!(matches!(
            err,
            ApiError::Engine(EngineError::InvalidPeriodKey { .. })
        ));
    }

    #[test]
    fn test_waterfall_rejects_blank_label() {
        let err = api(Granularity::Month)
            .conversion_waterfall(&[Stage::new("需求", 10.0), Stage::new(" ", 5.0)])
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[test]
    fn test_default_kpi_period_is_cutover_bucket() {
        let kpis = api(Granularity::Week).executive_kpis(&[], &[], &[], None).unwrap();
        assert_eq!(kpis.period.as_str(), "2026-W07");
        assert_eq!(kpis.demand_tons, 0.0);
        assert_eq!(kpis.avg_wheat_price, 0.0);
    }
}
