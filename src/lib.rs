// ==========================================
// 面粉厂计划看板 - 核心库
// ==========================================
// 职责: 行级数据 → 图表结构（趋势、甘特、瀑布、总览、产能）
// 系统定位: 纯计算核心，取数与渲染由宿主负责
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 记录与输出结构
pub mod domain;

// 引擎层 - 聚合/分割/补齐/合并/归一化
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 看板计划配置
pub mod config;

// 日志系统
pub mod logging;

// API 层 - 看板接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AggregateMode, AlertSeverity, Granularity, GroupBy, StepKind, ZeroPolicy};

// 领域实体
pub use domain::{
    AggregatedPoint, AggregatedSeries, Assignment, CapacityAlert, ChartRow, ExecutiveKpis,
    GanttSchedule, MillCapacityRow, MillLoadRecord, PeriodKey, RawRecord, RunBlock, SeriesMap,
    SplitSeries, Stage, WaterfallStep,
};

// 引擎
pub use engine::{
    Aggregator, CapacityRollup, Densifier, EngineError, EngineResult, ForecastPartitioner,
    KpiEngine, PeriodKeyResolver, RunMerger, WaterfallNormalizer,
};

// 配置
pub use config::{ConfigError, PlanningConfig};

// 导入
pub use importer::{FieldMapping, ImportError};

// API
pub use api::{ApiError, ApiResult, DashboardApi, EntityTrend};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "面粉厂计划看板";
