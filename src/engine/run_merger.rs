// ==========================================
// 面粉厂计划看板 - 甘特运行块合并引擎
// ==========================================
// 职责: 机组逐日配方分配 → 连续运行块
// 输入: 分配流（不要求有序） + 缺口容忍天数
// 输出: RunBlock 列表（按实体、起点升序）
// ==========================================
// 规则:
// - day1 = 全部分配中最早日期，offset = 距 day1 天数 + 1
// - 类别相同且两次观测间缺失天数 ≤ 容忍天数 → 延伸当前块
// - 类别变化或缺口超限 → 关闭当前块，开新块
// - 同一实体同一天出现多个类别: 只保留一个（优先延续当前块），块互不重叠
// - 容忍天数对应未登记的检修/换产日，默认 2
// ==========================================

use crate::domain::record::Assignment;
use crate::domain::schedule::{GanttSchedule, RunBlock};
use chrono::NaiveDate;
use tracing::{debug, instrument, warn};

/// 默认缺口容忍天数
pub const DEFAULT_GAP_TOLERANCE_DAYS: u32 = 2;

#[derive(Debug, Clone, Copy)]
pub struct RunMerger {
    gap_tolerance_days: u32,
}

impl RunMerger {
    /// 构造函数
    ///
    /// # 参数
    /// - `gap_tolerance_days`: 同一运行块内允许的最大缺失天数
    pub fn new(gap_tolerance_days: u32) -> Self {
        Self { gap_tolerance_days }
    }

    pub fn gap_tolerance_days(&self) -> u32 {
        self.gap_tolerance_days
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 合并运行块
    ///
    /// # 返回
    /// 空输入返回空列表
    pub fn merge_runs(&self, assignments: &[Assignment]) -> Vec<RunBlock> {
        self.build_schedule(assignments).blocks
    }

    /// 生成甘特图数据（运行块 + 横轴原点与长度）
    #[instrument(skip(self, assignments), fields(assignments = assignments.len(), tolerance = self.gap_tolerance_days))]
    pub fn build_schedule(&self, assignments: &[Assignment]) -> GanttSchedule {
        let Some(day1) = assignments.iter().map(|a| a.date).min() else {
            return GanttSchedule::default();
        };
        let last_day = assignments.iter().map(|a| a.date).max().unwrap_or(day1);

        let mut sorted: Vec<&Assignment> = assignments.iter().collect();
        sorted.sort_by(|a, b| {
            a.entity_id
                .cmp(&b.entity_id)
                .then(a.date.cmp(&b.date))
                .then(a.category.cmp(&b.category))
        });

        let mut blocks: Vec<RunBlock> = Vec::new();
        let mut current: Option<RunBlock> = None;
        let mut conflicts = 0usize;

        // 同一实体同一天只保留一个类别，保证块互不重叠
        for same_day in sorted.chunk_by(|x, y| x.entity_id == y.entity_id && x.date == y.date) {
            let assignment = pick_category(current.as_ref(), same_day);
            conflicts += same_day
                .iter()
                .filter(|a| a.category != assignment.category)
                .count();

            let offset = offset_of(day1, assignment.date);

            if let Some(run) = current.as_mut() {
                if self.extends(run, assignment, offset) {
                    run.end_offset = offset;
                    run.end_date = assignment.date;
                    continue;
                }
            }

            if let Some(done) = current.take() {
                blocks.push(done);
            }
            current = Some(RunBlock {
                entity_id: assignment.entity_id.clone(),
                category: assignment.category.clone(),
                start_offset: offset,
                end_offset: offset,
                start_date: assignment.date,
                end_date: assignment.date,
            });
        }

        if conflicts > 0 {
            warn!(conflicts, "同一机组同日存在多个配方，已按规则保留一个");
        }

        if let Some(done) = current.take() {
            blocks.push(done);
        }

        debug!(blocks = blocks.len(), origin = %day1, "运行块合并完成");

        GanttSchedule {
            origin: Some(day1),
            horizon_days: offset_of(day1, last_day),
            blocks,
        }
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    /// 判断分配能否并入当前运行块
    fn extends(&self, run: &RunBlock, assignment: &Assignment, offset: i64) -> bool {
        if run.entity_id != assignment.entity_id || run.category != assignment.category {
            return false;
        }
        let missing_days = offset - run.end_offset - 1;
        missing_days <= self.gap_tolerance_days as i64
    }
}

impl Default for RunMerger {
    fn default() -> Self {
        Self::new(DEFAULT_GAP_TOLERANCE_DAYS)
    }
}

/// 同日多类别时选定的分配
///
/// 优先延续当前运行块的类别，否则取类别名最小者（输入已按类别排序）
fn pick_category<'a>(current: Option<&RunBlock>, same_day: &[&'a Assignment]) -> &'a Assignment {
    let first = same_day[0];
    current
        .filter(|run| run.entity_id == first.entity_id)
        .and_then(|run| same_day.iter().find(|a| a.category == run.category))
        .copied()
        .unwrap_or(first)
}

/// 1 起始的天序号
fn offset_of(day1: NaiveDate, date: NaiveDate) -> i64 {
    (date - day1).num_days() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a(entity: &str, category: &str, day: u32) -> Assignment {
        Assignment::new(
            entity,
            NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
            category,
        )
    }

    fn spans(blocks: &[RunBlock]) -> Vec<(&str, &str, i64, i64)> {
        blocks
            .iter()
            .map(|b| {
                (
                    b.entity_id.as_str(),
                    b.category.as_str(),
                    b.start_offset,
                    b.end_offset,
                )
            })
            .collect()
    }

    #[test]
    fn test_category_change_closes_run() {
        let merger = RunMerger::default();
        let blocks = merger.merge_runs(&[a("A", "r1", 1), a("A", "r1", 2), a("A", "r2", 5)]);

        assert_eq!(spans(&blocks), vec![("A", "r1", 1, 2), ("A", "r2", 5, 5)]);
    }

    #[test]
    fn test_gap_within_tolerance_extends() {
        let merger = RunMerger::default();
        // 缺 2 天（day2, day3）
        let blocks = merger.merge_runs(&[a("A", "r1", 1), a("A", "r1", 4)]);

        assert_eq!(spans(&blocks), vec![("A", "r1", 1, 4)]);
    }

    #[test]
    fn test_gap_over_tolerance_splits() {
        let merger = RunMerger::default();
        // 缺 3 天（day2..day4）
        let blocks = merger.merge_runs(&[a("A", "r1", 1), a("A", "r1", 5)]);

        assert_eq!(spans(&blocks), vec![("A", "r1", 1, 1), ("A", "r1", 5, 5)]);
    }

    #[test]
    fn test_tolerance_is_configurable() {
        let strict = RunMerger::new(0);
        let blocks = strict.merge_runs(&[a("A", "r1", 1), a("A", "r1", 2), a("A", "r1", 4)]);
        assert_eq!(spans(&blocks), vec![("A", "r1", 1, 2), ("A", "r1", 4, 4)]);

        let loose = RunMerger::new(5);
        let blocks = loose.merge_runs(&[a("A", "r1", 1), a("A", "r1", 7)]);
        assert_eq!(spans(&blocks), vec![("A", "r1", 1, 7)]);
    }

    #[test]
    fn test_unsorted_multi_entity() {
        let merger = RunMerger::default();
        let blocks = merger.merge_runs(&[
            a("M2", "r3", 3),
            a("M1", "r1", 2),
            a("M2", "r3", 2),
            a("M1", "r1", 1),
        ]);

        // offset 相对全体最早日期（day1 = 3 月 1 日）
        assert_eq!(spans(&blocks), vec![("M1", "r1", 1, 2), ("M2", "r3", 2, 3)]);
    }

    #[test]
    fn test_duplicate_day_does_not_shrink() {
        let merger = RunMerger::default();
        let blocks = merger.merge_runs(&[a("A", "r1", 1), a("A", "r1", 3), a("A", "r1", 3)]);
        assert_eq!(spans(&blocks), vec![("A", "r1", 1, 3)]);
    }

    #[test]
    fn test_same_day_categories_stay_disjoint() {
        let merger = RunMerger::default();
        let blocks = merger.merge_runs(&[a("A", "r1", 1), a("A", "r2", 1), a("A", "r1", 2)]);
        assert_eq!(spans(&blocks), vec![("A", "r1", 1, 2)]);

        // 已有运行块时优先延续其类别，即使另一类别名更小
        let blocks = merger.merge_runs(&[a("A", "r2", 1), a("A", "r1", 2), a("A", "r2", 2)]);
        assert_eq!(spans(&blocks), vec![("A", "r2", 1, 2)]);

        // 首日冲突取类别名最小者
        let blocks = merger.merge_runs(&[a("B", "r9", 4), a("B", "r3", 4)]);
        assert_eq!(spans(&blocks), vec![("B", "r3", 1, 1)]);
    }

    #[test]
    fn test_empty_assignments() {
        let merger = RunMerger::default();
        assert!(merger.merge_runs(&[]).is_empty());

        let schedule = merger.build_schedule(&[]);
        assert_eq!(schedule.origin, None);
        assert_eq!(schedule.horizon_days, 0);
    }

    #[test]
    fn test_schedule_origin_and_horizon() {
        let merger = RunMerger::default();
        let schedule = merger.build_schedule(&[a("A", "r1", 3), a("B", "r2", 10)]);

        assert_eq!(schedule.origin, NaiveDate::from_ymd_opt(2026, 3, 3));
        assert_eq!(schedule.horizon_days, 8);
        assert_eq!(schedule.blocks[1].start_offset, 8);
        assert_eq!(schedule.blocks[1].span_days(), 1);
    }
}
