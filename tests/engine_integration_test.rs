// ==========================================
// 引擎间集成测试
// ==========================================
// 职责: 验证多个引擎之间的协作和数据流转
// 场景: Aggregator → ForecastPartitioner → Densifier
//       RunMerger（甘特）、WaterfallNormalizer（瀑布）
// ==========================================

mod helpers;

use helpers::test_data_builder::*;
use mill_planning_core::domain::series::{AggregatedPoint, PeriodKey};
use mill_planning_core::domain::types::{Granularity, StepKind, ZeroPolicy};
use mill_planning_core::engine::{
    Aggregator, Densifier, ForecastPartitioner, RunMerger, WaterfallNormalizer,
};

fn points(entries: &[(&str, f64)]) -> Vec<AggregatedPoint> {
    entries
        .iter()
        .map(|(k, v)| AggregatedPoint::present(PeriodKey::from(*k), *v))
        .collect()
}

// ==========================================
// 趋势折线
// ==========================================

#[test]
fn test_sku_daily_split_scenario() {
    let rows = vec![
        RecordBuilder::new("SKU1")
            .category("Bakery")
            .on("2026-02-10")
            .measure(5.0)
            .build(),
        RecordBuilder::new("SKU1")
            .category("Bakery")
            .on("2026-02-20")
            .measure(7.0)
            .build(),
    ];

    let series = Aggregator::new().aggregate(&rows, Granularity::Day);
    let split = ForecastPartitioner::new().partition(&series["SKU1"], date("2026-02-14"), Granularity::Day);

    assert_eq!(split.historical, points(&[("2026-02-10", 5.0)]));
    assert_eq!(split.forecasted, points(&[("2026-02-20", 7.0)]));
    assert_eq!(split.divider_period, Some(PeriodKey::from("2026-02-14")));
}

#[test]
fn test_monthly_boundary_bridges_both_lines() {
    let rows = vec![
        record("SKU1", "2026-01-15", 10.0),
        record("SKU1", "2026-02-03", 4.0),
        record("SKU1", "2026-02-25", 6.0),
        record("SKU1", "2026-03-10", 8.0),
    ];

    let series = Aggregator::new().aggregate(&rows, Granularity::Month);
    let split = ForecastPartitioner::new().partition(&series["SKU1"], date("2026-02-14"), Granularity::Month);

    assert_eq!(split.historical, points(&[("2026-01", 10.0), ("2026-02", 10.0)]));
    assert_eq!(split.forecasted, points(&[("2026-02", 10.0), ("2026-03", 8.0)]));

    // 图表行: 边界周期两条线都有值，连成一条不断开的折线
    let chart = split.chart_rows();
    assert_eq!(chart.len(), 3);
    assert_eq!(chart[1].historical, Some(10.0));
    assert_eq!(chart[1].forecasted, Some(10.0));
    assert_eq!(chart[0].forecasted, None);
}

#[test]
fn test_weekly_densify_after_aggregate() {
    let rows = vec![
        record("SKU1", "2026-02-02", 3.0), // W06
        record("SKU1", "2026-02-20", 2.0), // W08
        record("SKU1", "2026-02-21", -2.0), // W08 合计为 0
        record("SKU1", "2026-03-02", 1.0), // W10
    ];
    let series = Aggregator::new().aggregate(&rows, Granularity::Week);

    let gap = Densifier::new(ZeroPolicy::AsGap).densify_series(
        &series["SKU1"],
        date("2026-02-02"),
        date("2026-03-02"),
        Granularity::Week,
    );
    let periods: Vec<&str> = gap.iter().map(|p| p.period.as_str()).collect();
    assert_eq!(periods, vec!["2026-W06", "2026-W07", "2026-W08", "2026-W09", "2026-W10"]);
    let values: Vec<Option<f64>> = gap.iter().map(|p| p.value).collect();
    assert_eq!(values, vec![Some(3.0), None, None, None, Some(1.0)]);

    let kept = Densifier::new(ZeroPolicy::AsValue).densify_series(
        &series["SKU1"],
        date("2026-02-02"),
        date("2026-03-02"),
        Granularity::Week,
    );
    assert_eq!(kept[2].value, Some(0.0));
}

#[test]
fn test_densify_year_boundary_iso_weeks() {
    let densifier = Densifier::default();
    let keys = densifier
        .period_range(date("2020-12-28"), date("2021-01-11"), Granularity::Week)
        .unwrap();
    let keys: Vec<&str> = keys.iter().map(|k| k.as_str()).collect();
    assert_eq!(keys, vec!["2020-W53", "2021-W01", "2021-W02"]);
}

// ==========================================
// 排产甘特
// ==========================================

#[test]
fn test_category_change_not_gap_rule() {
    let merger = RunMerger::default();
    let assignments = vec![
        assignment("A", "2026-02-01", "r1"),
        assignment("A", "2026-02-02", "r1"),
        assignment("A", "2026-02-05", "r2"),
    ];

    let blocks = merger.merge_runs(&assignments);

    let summary: Vec<(&str, i64, i64)> = blocks
        .iter()
        .map(|b| (b.category.as_str(), b.start_offset, b.end_offset))
        .collect();
    assert_eq!(summary, vec![("r1", 1, 2), ("r2", 5, 5)]);
}

#[test]
fn test_gap_tolerance_extension() {
    let merger = RunMerger::default();

    let within = merger.merge_runs(&[
        assignment("A", "2026-02-01", "r1"),
        assignment("A", "2026-02-04", "r1"),
    ]);
    assert_eq!(within.len(), 1);
    assert_eq!((within[0].start_offset, within[0].end_offset), (1, 4));

    let beyond = merger.merge_runs(&[
        assignment("A", "2026-02-01", "r1"),
        assignment("A", "2026-02-05", "r1"),
    ]);
    assert_eq!(beyond.len(), 2);
}

#[test]
fn test_multi_mill_schedule() {
    let mut assignments = assignment_run("M2", "2026-02-01", &["R1", "R1", "", "R2", "R2"]);
    assignments.extend(assignment_run("M1", "2026-02-03", &["R3", "R3", "R3"]));

    let schedule = RunMerger::default().build_schedule(&assignments);

    assert_eq!(schedule.origin, Some(date("2026-02-01")));
    assert_eq!(schedule.horizon_days, 5);
    let summary: Vec<(&str, &str, i64, i64)> = schedule
        .blocks
        .iter()
        .map(|b| (b.entity_id.as_str(), b.category.as_str(), b.start_offset, b.end_offset))
        .collect();
    assert_eq!(
        summary,
        vec![("M1", "R3", 3, 5), ("M2", "R1", 1, 2), ("M2", "R2", 4, 5)]
    );
}

// ==========================================
// 转化瀑布
// ==========================================

#[test]
fn test_waterfall_monotonic_scale() {
    let steps = WaterfallNormalizer::new().normalize(&stages(&[
        ("需求", 100.0),
        ("排产", 80.0),
        ("交付", 40.0),
    ]));

    let bars: Vec<(f64, f64)> = steps
        .iter()
        .filter(|s| s.kind != StepKind::Drop)
        .map(|s| (s.percent, s.raw_value))
        .collect();
    assert_eq!(bars, vec![(100.0, 100.0), (80.0, 80.0), (40.0, 40.0)]);

    let drops: Vec<f64> = steps
        .iter()
        .filter(|s| s.kind == StepKind::Drop)
        .map(|s| s.percent)
        .collect();
    assert_eq!(drops, vec![-20.0, -40.0]);
}
