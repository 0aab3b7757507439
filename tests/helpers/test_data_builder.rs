// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

#![allow(dead_code)]

use chrono::NaiveDate;
use mill_planning_core::domain::record::{Assignment, MillLoadRecord, RawRecord, Stage};

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("测试日期格式应为 YYYY-MM-DD")
}

// ==========================================
// RawRecord 构建器
// ==========================================

pub struct RecordBuilder {
    entity_id: String,
    category_key: String,
    timestamp: NaiveDate,
    measure: f64,
}

impl RecordBuilder {
    pub fn new(entity_id: &str) -> Self {
        Self {
            entity_id: entity_id.to_string(),
            category_key: "Bakery".to_string(),
            timestamp: date("2026-02-01"),
            measure: 0.0,
        }
    }

    pub fn category(mut self, category: &str) -> Self {
        self.category_key = category.to_string();
        self
    }

    pub fn on(mut self, day: &str) -> Self {
        self.timestamp = date(day);
        self
    }

    pub fn measure(mut self, measure: f64) -> Self {
        self.measure = measure;
        self
    }

    pub fn build(self) -> RawRecord {
        RawRecord::new(
            self.entity_id,
            self.category_key,
            self.timestamp,
            self.measure,
        )
    }
}

/// 简写: (实体, 日期, 度量)
pub fn record(entity: &str, day: &str, measure: f64) -> RawRecord {
    RecordBuilder::new(entity).on(day).measure(measure).build()
}

// ==========================================
// 排产分配 / 机组负荷 / 瀑布阶段
// ==========================================

pub fn assignment(mill: &str, day: &str, recipe: &str) -> Assignment {
    Assignment::new(mill, date(day), recipe)
}

/// 从首日起按天生成同一机组的配方序列（"" 表示当天无分配）
pub fn assignment_run(mill: &str, start: &str, recipes: &[&str]) -> Vec<Assignment> {
    let start = date(start);
    recipes
        .iter()
        .enumerate()
        .filter(|(_, r)| !r.is_empty())
        .map(|(i, r)| Assignment::new(mill, start + chrono::Duration::days(i as i64), *r))
        .collect()
}

pub fn mill_load(mill: &str, day: &str, required: f64, available: f64) -> MillLoadRecord {
    MillLoadRecord {
        mill_id: mill.to_string(),
        date: date(day),
        required_hours: required,
        available_hours: available,
        overload_hours: (required - available).max(0.0),
    }
}

pub fn stages(values: &[(&str, f64)]) -> Vec<Stage> {
    values.iter().map(|(l, v)| Stage::new(*l, *v)).collect()
}
