// ==========================================
// 施工进度计划系统 - 周度汇总引擎
// ==========================================
// 职责: 将方案结构按周汇总为报表行
// 规则:
// - 周从周一开始, 覆盖 [start, end] 所在的所有周
// - 周键为周一日期 (YYYY-MM-DD)
// - 仅统计日期在 [start, end] 内的工作计划
// - 章/节行为其下级行之和
// ==========================================

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};

use crate::domain::plan::PlanStructure;
use crate::domain::report::{ReportRow, ReportWeek};
use crate::domain::types::ReportRowType;

/// 日期所在周的周一
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday() as i64;
    date - Duration::days(offset)
}

/// 覆盖 [start, end] 的周数 (不构造周列表)
///
/// start > end 时为 0
pub fn week_count(start: NaiveDate, end: NaiveDate) -> usize {
    if start > end {
        return 0;
    }
    let days = (week_start(end) - week_start(start)).num_days();
    (days / 7 + 1) as usize
}

/// 覆盖 [start, end] 的周列表
///
/// start > end 时返回空列表
pub fn weeks_between(start: NaiveDate, end: NaiveDate) -> Vec<ReportWeek> {
    let mut weeks = Vec::new();
    let mut current = week_start(start);
    while current <= end {
        weeks.push(ReportWeek {
            start: current,
            end: current + Duration::days(6),
        });
        current += Duration::days(7);
    }
    weeks
}

/// 汇总方案结构为扁平报表行 (章 -> 节 -> 工作类型, 按序号)
pub fn aggregate_rows(
    structure: &PlanStructure,
    weeks: &[ReportWeek],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<ReportRow> {
    let mut rows = Vec::new();

    for chapter in &structure.chapters {
        let chapter_idx = rows.len();
        rows.push(empty_row(chapter.chapter_id, ReportRowType::Chapter, &chapter.name, None, weeks));

        for subchapter in structure.subchapters_of(chapter.chapter_id) {
            let subchapter_idx = rows.len();
            rows.push(empty_row(
                subchapter.subchapter_id,
                ReportRowType::Subchapter,
                &subchapter.name,
                None,
                weeks,
            ));

            for work_type in structure.work_types_of(subchapter.subchapter_id) {
                let mut row = empty_row(
                    work_type.work_type_id,
                    ReportRowType::WorkType,
                    &work_type.name,
                    Some(work_type.unit.clone()),
                    weeks,
                );

                for entry in structure
                    .work_plans_of(work_type.work_type_id)
                    .filter(|wp| wp.plan_date >= start && wp.plan_date <= end)
                {
                    if let Some(week) = weeks.iter().find(|w| w.contains(entry.plan_date)) {
                        let key = week.key();
                        let value = entry.value as i64;
                        add_value(&mut row, &key, value);
                        add_value(&mut rows[subchapter_idx], &key, value);
                        add_value(&mut rows[chapter_idx], &key, value);
                    }
                }

                rows.push(row);
            }
        }
    }

    rows
}

fn empty_row(
    id: i64,
    row_type: ReportRowType,
    name: &str,
    unit: Option<String>,
    weeks: &[ReportWeek],
) -> ReportRow {
    ReportRow {
        id,
        row_type,
        name: name.to_string(),
        unit,
        level: row_type.level(),
        weekly_values: weeks.iter().map(|w| (w.key(), 0)).collect::<BTreeMap<_, _>>(),
    }
}

fn add_value(row: &mut ReportRow, key: &str, value: i64) {
    *row.weekly_values.entry(key.to_string()).or_insert(0) += value;
}
