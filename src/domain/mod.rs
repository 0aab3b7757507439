// ==========================================
// 面粉厂计划看板 - 领域模型层
// ==========================================
// 职责: 定义输入行、输出序列/块/步骤等纯数据类型
// 红线: 不含引擎逻辑，不含解析逻辑
// ==========================================

pub mod capacity;
pub mod record;
pub mod schedule;
pub mod series;
pub mod types;
pub mod waterfall;

// 重导出核心类型
pub use capacity::{CapacityAlert, ExecutiveKpis, MillCapacityRow};
pub use record::{Assignment, MillLoadRecord, RawRecord, Stage};
pub use schedule::{GanttSchedule, RunBlock};
pub use series::{AggregatedPoint, AggregatedSeries, ChartRow, PeriodKey, SeriesMap, SplitSeries};
pub use types::{AggregateMode, AlertSeverity, Granularity, GroupBy, StepKind, ZeroPolicy};
pub use waterfall::WaterfallStep;
