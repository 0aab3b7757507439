// ==========================================
// 面粉厂计划看板 - 看板计划配置
// ==========================================
// 职责: 配置加载（JSON）、校验、按查询参数覆写、快照
// 来源: 配置文件 + 看板查询参数（key=value）
// 红线: 核心不读取环境变量
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::domain::types::{AggregateMode, Granularity, GroupBy, ZeroPolicy};
use crate::engine::run_merger::DEFAULT_GAP_TOLERANCE_DAYS;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, info};

/// 允许的最大间隔容忍天数
const MAX_GAP_TOLERANCE_DAYS: u32 = 366;

const DATE_FORMAT: &str = "%Y-%m-%d";

fn default_granularity() -> Granularity {
    Granularity::Month
}

fn default_gap_tolerance_days() -> u32 {
    DEFAULT_GAP_TOLERANCE_DAYS
}

// ==========================================
// PlanningConfig
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningConfig {
    #[serde(default = "default_granularity")]
    pub granularity: Granularity,

    /// 历史/预测分界日（必填）
    pub cutover: NaiveDate,

    #[serde(default = "default_gap_tolerance_days")]
    pub gap_tolerance_days: u32,

    /// 补齐区间起点（None 取观测最早日期）
    #[serde(default)]
    pub range_start: Option<NaiveDate>,

    /// 补齐区间终点（None 取观测最晚日期）
    #[serde(default)]
    pub range_end: Option<NaiveDate>,

    #[serde(default)]
    pub zero_policy: ZeroPolicy,

    #[serde(default)]
    pub aggregate_mode: AggregateMode,

    #[serde(default)]
    pub group_by: GroupBy,
}

impl PlanningConfig {
    pub fn new(cutover: NaiveDate) -> Self {
        Self {
            granularity: default_granularity(),
            cutover,
            gap_tolerance_days: default_gap_tolerance_days(),
            range_start: None,
            range_end: None,
            zero_policy: ZeroPolicy::default(),
            aggregate_mode: AggregateMode::default(),
            group_by: GroupBy::default(),
        }
    }

    /// 从 JSON 文本加载并校验
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: PlanningConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 文件加载并校验
    pub fn from_json_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&content)?;
        info!(path = %path.display(), granularity = %config.granularity, "配置加载完成");
        Ok(config)
    }

    /// 校验配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.gap_tolerance_days > MAX_GAP_TOLERANCE_DAYS {
            return Err(ConfigError::InvalidValue {
                key: config_keys::GAP_TOLERANCE_DAYS.to_string(),
                value: self.gap_tolerance_days.to_string(),
                message: format!("不得超过 {} 天", MAX_GAP_TOLERANCE_DAYS),
            });
        }

        if let (Some(start), Some(end)) = (self.range_start, self.range_end) {
            if start > end {
                return Err(ConfigError::InvalidValue {
                    key: config_keys::RANGE_START.to_string(),
                    value: start.to_string(),
                    message: format!("起点晚于终点 {}", end),
                });
            }
        }

        Ok(())
    }

    /// 按字符串键值覆写（看板查询参数）
    ///
    /// 任一键非法则整体不生效
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> ConfigResult<()> {
        let mut next = self.clone();

        for (key, value) in overrides {
            let value = value.trim();
            match key.as_str() {
                config_keys::GRANULARITY => {
                    next.granularity =
                        value
                            .parse::<Granularity>()
                            .map_err(|e| ConfigError::InvalidValue {
                                key: key.clone(),
                                value: value.to_string(),
                                message: e.to_string(),
                            })?;
                }
                config_keys::CUTOVER => next.cutover = parse_date(key, value)?,
                config_keys::GAP_TOLERANCE_DAYS => {
                    next.gap_tolerance_days =
                        value.parse::<u32>().map_err(|e| ConfigError::InvalidValue {
                            key: key.clone(),
                            value: value.to_string(),
                            message: e.to_string(),
                        })?;
                }
                config_keys::RANGE_START => next.range_start = parse_optional_date(key, value)?,
                config_keys::RANGE_END => next.range_end = parse_optional_date(key, value)?,
                config_keys::ZERO_POLICY => next.zero_policy = parse_enum(key, value)?,
                config_keys::AGGREGATE_MODE => next.aggregate_mode = parse_enum(key, value)?,
                config_keys::GROUP_BY => next.group_by = parse_enum(key, value)?,
                _ => return Err(ConfigError::UnknownKey(key.clone())),
            }
        }

        next.validate()?;
        debug!(overrides = overrides.len(), "配置覆写完成");
        *self = next;
        Ok(())
    }

    /// 配置快照（键 → 字符串值），可经 apply_overrides 还原
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert(
            config_keys::GRANULARITY.to_string(),
            self.granularity.to_string(),
        );
        map.insert(
            config_keys::CUTOVER.to_string(),
            self.cutover.format(DATE_FORMAT).to_string(),
        );
        map.insert(
            config_keys::GAP_TOLERANCE_DAYS.to_string(),
            self.gap_tolerance_days.to_string(),
        );
        map.insert(
            config_keys::RANGE_START.to_string(),
            format_optional_date(self.range_start),
        );
        map.insert(
            config_keys::RANGE_END.to_string(),
            format_optional_date(self.range_end),
        );
        map.insert(
            config_keys::ZERO_POLICY.to_string(),
            enum_to_string(&self.zero_policy),
        );
        map.insert(
            config_keys::AGGREGATE_MODE.to_string(),
            enum_to_string(&self.aggregate_mode),
        );
        map.insert(
            config_keys::GROUP_BY.to_string(),
            enum_to_string(&self.group_by),
        );
        map
    }
}

fn parse_date(key: &str, value: &str) -> ConfigResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        message: e.to_string(),
    })
}

/// 空串表示清除
fn parse_optional_date(key: &str, value: &str) -> ConfigResult<Option<NaiveDate>> {
    if value.is_empty() {
        Ok(None)
    } else {
        parse_date(key, value).map(Some)
    }
}

fn format_optional_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// 按 serde 名称解析枚举（与 JSON 配置写法一致）
fn parse_enum<T: DeserializeOwned>(key: &str, value: &str) -> ConfigResult<T> {
    serde_json::from_value(serde_json::Value::String(value.to_ascii_lowercase())).map_err(|e| {
        ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            message: e.to_string(),
        }
    })
}

fn enum_to_string<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        _ => String::new(),
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 时间轴
    pub const GRANULARITY: &str = "granularity";
    pub const CUTOVER: &str = "cutover";
    pub const RANGE_START: &str = "range_start";
    pub const RANGE_END: &str = "range_end";

    // 排产甘特
    pub const GAP_TOLERANCE_DAYS: &str = "gap_tolerance_days";

    // 聚合与补齐
    pub const ZERO_POLICY: &str = "zero_policy";
    pub const AGGREGATE_MODE: &str = "aggregate_mode";
    pub const GROUP_BY: &str = "group_by";
}
