use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use crate::app::state::AppState;

use super::common::{map_api_error, parse_args, to_json};

#[derive(Debug, Deserialize)]
struct ReportArgs {
    plan_id: i64,
    start: NaiveDate,
    end: NaiveDate,
    /// 指定时写入文件, 否则返回 CSV 文本
    #[serde(default)]
    output: Option<PathBuf>,
}

// ==========================================
// 周报相关命令
// ==========================================

/// 生成周报数据
pub(super) fn build_weekly_report(state: &AppState, args: Value) -> Result<String, String> {
    let args: ReportArgs = parse_args(args)?;
    let result = state
        .report_api
        .build_weekly_report(args.plan_id, args.start, args.end)
        .map_err(map_api_error)?;

    to_json(&result)
}

/// 导出周报 CSV
pub(super) fn export_weekly_report_csv(state: &AppState, args: Value) -> Result<String, String> {
    let args: ReportArgs = parse_args(args)?;

    match args.output {
        Some(path) => {
            let rows = state
                .report_api
                .export_weekly_report_csv_to(args.plan_id, args.start, args.end, &path)
                .map_err(map_api_error)?;

            to_json(&serde_json::json!({
                "path": path.to_string_lossy(),
                "rows": rows,
            }))
        }
        None => {
            let csv = state
                .report_api
                .export_weekly_report_csv(args.plan_id, args.start, args.end)
                .map_err(map_api_error)?;

            to_json(&serde_json::json!({ "csv": csv }))
        }
    }
}
