// ==========================================
// 面粉厂计划看板 - 瀑布图归一化引擎
// ==========================================
// 职责: 有序阶段合计 → 0~100 归一化瀑布步骤
// 输入: [(label, value)]
// 输出: start / (drop, subtotal)* / (drop, end)
// ==========================================
// 规则:
// - 首阶段 percent 固定 100（漏斗顶端）
// - 其余阶段 percent = 100 × value / max(value)，max 下限 1，截断到 [0, 100]
// - 相邻阶段之间插入 drop，percent = -(上一阶段 percent - 本阶段 percent)
// - raw_value 始终携带原始数值，percent 只决定柱高
// ==========================================

use crate::domain::record::Stage;
use crate::domain::types::StepKind;
use crate::domain::waterfall::WaterfallStep;
use crate::engine::aggregator::finite_or_zero;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct WaterfallNormalizer;

impl WaterfallNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// 归一化瀑布
    ///
    /// # 返回
    /// - 0 个阶段: 空列表
    /// - 1 个阶段: 仅 start
    pub fn normalize(&self, stages: &[Stage]) -> Vec<WaterfallStep> {
        let Some(first) = stages.first() else {
            return Vec::new();
        };

        let mut steps = Vec::with_capacity(stages.len() * 2);
        steps.push(WaterfallStep {
            label: first.label.clone(),
            raw_value: first.value,
            percent: 100.0,
            kind: StepKind::Start,
        });

        if stages.len() < 2 {
            return steps;
        }

        let max_val = stages
            .iter()
            .map(|s| finite_or_zero(s.value))
            .fold(f64::NEG_INFINITY, f64::max)
            .max(1.0);

        let last_index = stages.len() - 1;
        let mut running_percent = 100.0;

        for (index, pair) in stages.windows(2).enumerate() {
            let (prev, current) = (&pair[0], &pair[1]);
            let percent = (100.0 * finite_or_zero(current.value) / max_val).clamp(0.0, 100.0);

            steps.push(WaterfallStep {
                label: format!("{} → {}", prev.label, current.label),
                raw_value: prev.value - current.value,
                percent: -(running_percent - percent),
                kind: StepKind::Drop,
            });
            steps.push(WaterfallStep {
                label: current.label.clone(),
                raw_value: current.value,
                percent,
                kind: if index + 1 == last_index {
                    StepKind::End
                } else {
                    StepKind::Subtotal
                },
            });

            running_percent = percent;
        }

        debug!(stages = stages.len(), steps = steps.len(), max_val, "瀑布归一化完成");

        steps
    }
}
