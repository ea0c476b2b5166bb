// ==========================================
// 施工进度计划系统 - 周报数据 API
// ==========================================
// 职责: 按周汇总方案计划量, 输出报表行及 CSV (交由外部渲染)
// 约束: 只读, 不受编辑锁影响
// ==========================================

use std::path::Path;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::{info, instrument, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::report::{ReportHeader, WeeklyReport};
use crate::engine::repositories::ScheduleRepositories;
use crate::engine::weekly_aggregation::{aggregate_rows, week_count, weeks_between};
use crate::i18n::t_with_args;

// ==========================================
// ReportApi - 周报数据 API
// ==========================================
pub struct ReportApi {
    repos: ScheduleRepositories,
    config_manager: Arc<ConfigManager>,
}

impl ReportApi {
    /// 创建新的ReportApi实例
    pub fn new(repos: ScheduleRepositories, config_manager: Arc<ConfigManager>) -> Self {
        Self {
            repos,
            config_manager,
        }
    }

    /// 生成周报数据
    ///
    /// # 错误
    /// - ValidationError: start > end, 或周数超过 report.max_weeks
    /// - NotFound: 方案不存在
    #[instrument(skip(self))]
    pub fn build_weekly_report(
        &self,
        plan_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ApiResult<WeeklyReport> {
        if start > end {
            warn!(%start, %end, "报表区间无效");
            return Err(ApiError::ValidationError(t_with_args(
                "error.report_range",
                &[("start", &start.to_string()), ("end", &end.to_string())],
            )));
        }

        // 先按日期算周数, 通过上限校验后再构造周列表
        let week_total = week_count(start, end);
        let max_weeks = self
            .config_manager
            .get_report_max_weeks()
            .map_err(|e| ApiError::InternalError(e.to_string()))?;
        if week_total > max_weeks {
            warn!(weeks = week_total, max_weeks, "报表跨度超过上限");
            return Err(ApiError::ValidationError(t_with_args(
                "error.report_too_wide",
                &[
                    ("weeks", &week_total.to_string()),
                    ("max", &max_weeks.to_string()),
                ],
            )));
        }
        let weeks = weeks_between(start, end);

        let structure = self
            .repos
            .load_structure(plan_id)?
            .ok_or_else(|| ApiError::not_found("SchedulePlan", plan_id))?;

        let rows = aggregate_rows(&structure, &weeks, start, end);

        let (street, district, object_status) = match &structure.object {
            Some(obj) => (obj.street.clone(), obj.district.clone(), obj.status.clone()),
            None => (String::new(), String::new(), String::new()),
        };
        let header = ReportHeader {
            plan_id,
            plan_version: structure.plan.version,
            plan_status: structure.plan.status.to_db_str().to_string(),
            object_street: street,
            object_district: district,
            object_status,
            period_start: start,
            period_end: end,
            generated_at: Local::now().naive_local(),
        };

        info!(plan_id, weeks = weeks.len(), rows = rows.len(), "周报数据已生成");
        Ok(WeeklyReport {
            header,
            weeks,
            rows,
        })
    }

    /// 导出周报为 CSV 文本
    ///
    /// 列: type, level, id, name, unit, 各周 (周一日期), total
    pub fn export_weekly_report_csv(
        &self,
        plan_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ApiResult<String> {
        let report = self.build_weekly_report(plan_id, start, end)?;
        let bytes = write_report_csv(&report, Vec::new())?;
        String::from_utf8(bytes).map_err(|e| ApiError::InternalError(e.to_string()))
    }

    /// 导出周报为 CSV 文件
    pub fn export_weekly_report_csv_to(
        &self,
        plan_id: i64,
        start: NaiveDate,
        end: NaiveDate,
        path: &Path,
    ) -> ApiResult<usize> {
        let report = self.build_weekly_report(plan_id, start, end)?;
        let file = std::fs::File::create(path)
            .map_err(|e| ApiError::InternalError(format!("无法创建文件 {}: {}", path.display(), e)))?;
        write_report_csv(&report, file)?;

        info!(plan_id, path = %path.display(), rows = report.rows.len(), "周报已导出");
        Ok(report.rows.len())
    }
}

/// 将报表行写入 CSV
fn write_report_csv<W: std::io::Write>(report: &WeeklyReport, sink: W) -> ApiResult<W> {
    let csv_err = |e: csv::Error| ApiError::InternalError(format!("CSV写入失败: {}", e));

    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(sink);

    let week_keys: Vec<String> = report.weeks.iter().map(|w| w.key()).collect();
    let mut header: Vec<String> = ["type", "level", "id", "name", "unit"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    header.extend(week_keys.iter().cloned());
    header.push("total".to_string());
    writer.write_record(&header).map_err(csv_err)?;

    for row in &report.rows {
        let mut record = vec![
            row.row_type.to_string(),
            row.level.to_string(),
            row.id.to_string(),
            row.name.clone(),
            row.unit.clone().unwrap_or_default(),
        ];
        record.extend(week_keys.iter().map(|k| row.value_for(k).to_string()));
        record.push(row.total().to_string());
        writer.write_record(&record).map_err(csv_err)?;
    }

    writer
        .into_inner()
        .map_err(|e| ApiError::InternalError(format!("CSV写入失败: {}", e)))
}
