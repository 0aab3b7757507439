// ==========================================
// 面粉厂计划看板 - 引擎层
// ==========================================
// 职责: 把已取回的行级数据整形为图表可用的序列、块与步骤
// 红线: 纯函数、同步、无 I/O，每次刷新全量重算
// 红线: 不做预测，不做排产优化
// ==========================================

pub mod aggregator;
pub mod capacity_rollup;
pub mod densifier;
pub mod error;
pub mod kpi;
pub mod partitioner;
pub mod period_key;
pub mod run_merger;
pub mod waterfall;

// 重导出核心引擎
pub use aggregator::Aggregator;
pub use capacity_rollup::CapacityRollup;
pub use densifier::Densifier;
pub use error::{EngineError, EngineResult};
pub use kpi::{round2, utilization_pct, KpiEngine};
pub use partitioner::ForecastPartitioner;
pub use period_key::PeriodKeyResolver;
pub use run_merger::{RunMerger, DEFAULT_GAP_TOLERANCE_DAYS};
pub use waterfall::WaterfallNormalizer;
