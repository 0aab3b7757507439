// ==========================================
// 面粉厂计划看板 - 领域类型定义
// ==========================================
// 职责: 时间粒度、分组维度、聚合方式等枚举
// 序列化格式: 小写 (与前端查询参数一致)
// ==========================================

use crate::engine::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 时间粒度 (Granularity)
// ==========================================
// 决定 PeriodKey 格式与桶宽度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,   // YYYY-MM-DD
    Week,  // YYYY-Www (ISO-8601)
    Month, // YYYY-MM
    Year,  // YYYY
}

impl Granularity {
    /// 是否为细粒度（日/周）
    ///
    /// 细粒度: 分割时不复制边界桶，且需要补齐缺口
    pub fn is_fine(&self) -> bool {
        matches!(self, Granularity::Day | Granularity::Week)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
            Granularity::Year => "year",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = EngineError;

    /// 解析粒度字符串
    ///
    /// 接受 day/week/month/year 及 daily/weekly/monthly/yearly（大小写不敏感）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "daily" => Ok(Granularity::Day),
            "week" | "weekly" => Ok(Granularity::Week),
            "month" | "monthly" => Ok(Granularity::Month),
            "year" | "yearly" => Ok(Granularity::Year),
            _ => Err(EngineError::InvalidGranularity(s.to_string())),
        }
    }
}

// ==========================================
// 分组维度 (Group By)
// ==========================================
// 同一批原始行可按实体（SKU/机组）或类别（面粉类型/配方）出多条序列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    Entity,
    Category,
}

// ==========================================
// 聚合方式 (Aggregate Mode)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateMode {
    #[default]
    Sum,  // 需求吨数、工时
    Mean, // 小麦价格等均值口径
}

impl fmt::Display for AggregateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateMode::Sum => write!(f, "sum"),
            AggregateMode::Mean => write!(f, "mean"),
        }
    }
}

// ==========================================
// 零值策略 (Zero Policy)
// ==========================================
// 补齐时如何对待合计恰好为 0 的桶
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroPolicy {
    /// 0 视为缺失（与看板现有行为一致，避免画出虚假的 0 点）
    #[default]
    AsGap,
    /// 0 作为真实值保留
    AsValue,
}

// ==========================================
// 瀑布步骤类型 (Step Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Start,
    Drop,
    Subtotal,
    End,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepKind::Start => write!(f, "start"),
            StepKind::Drop => write!(f, "drop"),
            StepKind::Subtotal => write!(f, "subtotal"),
            StepKind::End => write!(f, "end"),
        }
    }
}

// ==========================================
// 告警等级 (Alert Severity)
// ==========================================
/// 超负荷告警一律为 high
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    High,
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertSeverity::High => write!(f, "high"),
        }
    }
}
