// ==========================================
// 面粉厂计划看板 - 周期键解析器
// ==========================================
// 职责: 日期 + 粒度 → 规范周期键
// 输入: NaiveDate（本地日历日）
// 输出: PeriodKey (YYYY-MM-DD / YYYY-Www / YYYY-MM / YYYY)
// ==========================================
// 周编号: ISO-8601（周一为周首，第 1 周包含当年第一个周四），
//         年份取 ISO 年，因此 2024-12-30 属于 2025-W01。
// ==========================================

use crate::domain::series::PeriodKey;
use crate::domain::types::Granularity;
use crate::engine::error::{EngineError, EngineResult};
use chrono::{Datelike, NaiveDate, Weekday};

// ==========================================
// PeriodKeyResolver - 周期键解析器
// ==========================================
/// 无状态解析器，全函数、无副作用
#[derive(Debug, Clone, Copy, Default)]
pub struct PeriodKeyResolver;

impl PeriodKeyResolver {
    pub fn new() -> Self {
        Self
    }

    /// 计算日期所在桶的周期键
    ///
    /// # 参数
    /// - `date`: 观测日期
    /// - `granularity`: 时间粒度
    ///
    /// # 返回
    /// 零填充的周期键，固定粒度下字典序即时间序
    pub fn resolve(&self, date: NaiveDate, granularity: Granularity) -> PeriodKey {
        let key = match granularity {
            Granularity::Day => format!(
                "{:04}-{:02}-{:02}",
                date.year(),
                date.month(),
                date.day()
            ),
            Granularity::Week => {
                let week = date.iso_week();
                format!("{:04}-W{:02}", week.year(), week.week())
            }
            Granularity::Month => format!("{:04}-{:02}", date.year(), date.month()),
            Granularity::Year => format!("{:04}", date.year()),
        };
        PeriodKey::new(key)
    }

    /// 周期键所在桶的第一天（resolve 的逆运算）
    ///
    /// - day: 当天
    /// - week: ISO 周一
    /// - month: 当月 1 日
    /// - year: 1 月 1 日
    pub fn period_start(&self, key: &PeriodKey, granularity: Granularity) -> EngineResult<NaiveDate> {
        let invalid = || EngineError::InvalidPeriodKey {
            granularity: granularity.to_string(),
            key: key.to_string(),
        };
        let raw = key.as_str();

        match granularity {
            Granularity::Day => NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| invalid()),
            Granularity::Week => {
                let (year, week) = raw.split_once("-W").ok_or_else(invalid)?;
                let year: i32 = year.parse().map_err(|_| invalid())?;
                let week: u32 = week.parse().map_err(|_| invalid())?;
                NaiveDate::from_isoywd_opt(year, week, Weekday::Mon).ok_or_else(invalid)
            }
            Granularity::Month => {
                let (year, month) = raw.split_once('-').ok_or_else(invalid)?;
                let year: i32 = year.parse().map_err(|_| invalid())?;
                let month: u32 = month.parse().map_err(|_| invalid())?;
                NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)
            }
            Granularity::Year => {
                let year: i32 = raw.parse().map_err(|_| invalid())?;
                NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)
            }
        }
    }

    /// 日期所在桶的第一天
    pub fn bucket_start(&self, date: NaiveDate, granularity: Granularity) -> NaiveDate {
        match granularity {
            Granularity::Day => date,
            Granularity::Week => {
                date - chrono::Duration::days(date.weekday().num_days_from_monday() as i64)
            }
            Granularity::Month => date.with_day(1).unwrap_or(date),
            Granularity::Year => date.with_ordinal(1).unwrap_or(date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_resolve_day() {
        let resolver = PeriodKeyResolver::new();
        assert_eq!(
            resolver.resolve(d(2026, 2, 5), Granularity::Day).as_str(),
            "2026-02-05"
        );
    }

    #[test]
    fn test_resolve_month_and_year() {
        let resolver = PeriodKeyResolver::new();
        assert_eq!(
            resolver.resolve(d(2026, 2, 28), Granularity::Month).as_str(),
            "2026-02"
        );
        assert_eq!(resolver.resolve(d(2026, 2, 28), Granularity::Year).as_str(), "2026");
    }

    #[test]
    fn test_resolve_week_zero_padded() {
        let resolver = PeriodKeyResolver::new();
        // 2026-02-10 是周二，ISO 第 7 周
        assert_eq!(
            resolver.resolve(d(2026, 2, 10), Granularity::Week).as_str(),
            "2026-W07"
        );
    }

    #[test]
    fn test_resolve_week_year_boundary_uses_iso_year() {
        let resolver = PeriodKeyResolver::new();
        // 年末的周一属于下一 ISO 年的第 1 周
        assert_eq!(
            resolver.resolve(d(2024, 12, 30), Granularity::Week).as_str(),
            "2025-W01"
        );
        // 年初的周日属于上一 ISO 年的最后一周
        assert_eq!(
            resolver.resolve(d(2021, 1, 3), Granularity::Week).as_str(),
            "2020-W53"
        );
        assert_eq!(
            resolver.resolve(d(2021, 1, 4), Granularity::Week).as_str(),
            "2021-W01"
        );
    }

    #[test]
    fn test_week_keys_ordered_across_year() {
        let resolver = PeriodKeyResolver::new();
        let mut prev = resolver.resolve(d(2025, 12, 1), Granularity::Week);
        let mut date = d(2025, 12, 1);
        for _ in 0..60 {
            date = date + chrono::Duration::days(1);
            let key = resolver.resolve(date, Granularity::Week);
            assert!(key >= prev, "{} < {}", key, prev);
            prev = key;
        }
    }

    #[test]
    fn test_period_start_roundtrip() {
        let resolver = PeriodKeyResolver::new();
        let date = d(2026, 2, 11);

        for g in [
            Granularity::Day,
            Granularity::Week,
            Granularity::Month,
            Granularity::Year,
        ] {
            let key = resolver.resolve(date, g);
            let start = resolver.period_start(&key, g).unwrap();
            assert_eq!(start, resolver.bucket_start(date, g));
            assert_eq!(resolver.resolve(start, g), key);
        }
    }

    #[test]
    fn test_period_start_invalid_key() {
        let resolver = PeriodKeyResolver::new();
        let err = resolver
            .period_start(&PeriodKey::from("2026-13"), Granularity::Month)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidPeriodKey { .. }));

        assert!(resolver
            .period_start(&PeriodKey::from("2026-07"), Granularity::Week)
            .is_err());
    }

    #[test]
    fn test_bucket_start_week_is_monday() {
        let resolver = PeriodKeyResolver::new();
        // 2026-02-15 是周日
        assert_eq!(
            resolver.bucket_start(d(2026, 2, 15), Granularity::Week),
            d(2026, 2, 9)
        );
    }
}
