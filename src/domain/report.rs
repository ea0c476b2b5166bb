// ==========================================
// 施工进度计划系统 - 周报表数据模型
// ==========================================
// 报表渲染为外部职责, 这里只定义聚合结果
// 周以周一开始, 键为周起始日期 (YYYY-MM-DD)
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::types::ReportRowType;

/// 周键日期格式
pub const WEEK_KEY_FORMAT: &str = "%Y-%m-%d";

// ==========================================
// ReportWeek - 报表周
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportWeek {
    pub start: NaiveDate, // 周一
    pub end: NaiveDate,   // 周日
}

impl ReportWeek {
    /// 周键 (周起始日期)
    pub fn key(&self) -> String {
        self.start.format(WEEK_KEY_FORMAT).to_string()
    }

    /// 日期是否落在本周内
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

// ==========================================
// ReportRow - 报表行
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub id: i64,
    pub row_type: ReportRowType,
    pub name: String,
    pub unit: Option<String>, // 仅工作类型行有值
    pub level: u8,            // 0/1/2
    pub weekly_values: BTreeMap<String, i64>,
}

impl ReportRow {
    /// 某周的汇总值 (缺失视为0)
    pub fn value_for(&self, week_key: &str) -> i64 {
        self.weekly_values.get(week_key).copied().unwrap_or(0)
    }

    /// 全部周的合计
    pub fn total(&self) -> i64 {
        self.weekly_values.values().sum()
    }
}

// ==========================================
// ReportHeader - 报表表头信息
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportHeader {
    pub plan_id: i64,
    pub plan_version: i32,
    pub plan_status: String,
    pub object_street: String,
    pub object_district: String,
    pub object_status: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub generated_at: NaiveDateTime,
}

// ==========================================
// WeeklyReport - 周报表
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyReport {
    pub header: ReportHeader,
    pub weeks: Vec<ReportWeek>,
    pub rows: Vec<ReportRow>,
}
