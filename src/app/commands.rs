// ==========================================
// 施工进度计划系统 - 命令分发（按域拆分）
// ==========================================
// 职责: 命令名 + JSON 参数 → JSON 结果 / JSON 错误
// 错误格式: {"code": "...", "message": "...", "details": {"status": 404|400|500}}
// ==========================================

mod common;
mod config;
mod hierarchy;
mod report;
mod schedule;

use serde_json::Value;

use crate::app::state::AppState;

type Handler = fn(&AppState, Value) -> Result<String, String>;

/// 命令表 (命令名, 处理函数)
const COMMANDS: &[(&str, Handler)] = &[
    // ==========================================
    // 施工对象 (3个)
    // ==========================================
    ("create_object", schedule::create_object),
    ("get_object", schedule::get_object),
    ("list_objects", schedule::list_objects),
    // ==========================================
    // 进度计划方案 (9个)
    // ==========================================
    ("create_work_schedule", schedule::create_work_schedule),
    ("list_plans", schedule::list_plans),
    ("list_plan_versions", schedule::list_plan_versions),
    ("get_plan", schedule::get_plan),
    ("get_plan_structure", schedule::get_plan_structure),
    ("get_current_schedule", schedule::get_current_schedule),
    ("set_active_plan", schedule::set_active_plan),
    ("delete_work_schedule", schedule::delete_work_schedule),
    ("delete_object_schedules", schedule::delete_object_schedules),
    // ==========================================
    // 编辑锁 (9个)
    // ==========================================
    ("lock_changes", schedule::lock_changes),
    ("unlock_changes", schedule::unlock_changes),
    ("is_changes_locked", schedule::is_changes_locked),
    ("lock_plan", schedule::lock_plan),
    ("unlock_plan", schedule::unlock_plan),
    ("is_plan_locked", schedule::is_plan_locked),
    ("lock_object", schedule::lock_object),
    ("unlock_object", schedule::unlock_object),
    ("is_object_locked", schedule::is_object_locked),
    // ==========================================
    // 章 (6个)
    // ==========================================
    ("list_chapters", hierarchy::list_chapters),
    ("get_chapter", hierarchy::get_chapter),
    ("add_chapter", hierarchy::add_chapter),
    ("update_chapter", hierarchy::update_chapter),
    ("delete_chapter", hierarchy::delete_chapter),
    ("reorder_chapters", hierarchy::reorder_chapters),
    // ==========================================
    // 节 (7个)
    // ==========================================
    ("list_subchapters", hierarchy::list_subchapters),
    ("get_subchapter", hierarchy::get_subchapter),
    ("add_subchapter", hierarchy::add_subchapter),
    ("update_subchapter", hierarchy::update_subchapter),
    ("delete_subchapter", hierarchy::delete_subchapter),
    ("reorder_subchapters", hierarchy::reorder_subchapters),
    ("move_subchapter", hierarchy::move_subchapter),
    // ==========================================
    // 工作类型 (5个)
    // ==========================================
    ("list_work_types", hierarchy::list_work_types),
    ("get_work_type", hierarchy::get_work_type),
    ("add_work_type", hierarchy::add_work_type),
    ("update_work_type", hierarchy::update_work_type),
    ("delete_work_type", hierarchy::delete_work_type),
    // ==========================================
    // 工作计划 (5个)
    // ==========================================
    ("list_work_plans", hierarchy::list_work_plans),
    ("get_work_plan", hierarchy::get_work_plan),
    ("add_work_plan", hierarchy::add_work_plan),
    ("update_work_plan", hierarchy::update_work_plan),
    ("delete_work_plan", hierarchy::delete_work_plan),
    // ==========================================
    // 周报 (2个)
    // ==========================================
    ("build_weekly_report", report::build_weekly_report),
    ("export_weekly_report_csv", report::export_weekly_report_csv),
    // ==========================================
    // 配置 (2个)
    // ==========================================
    ("get_config", config::get_config),
    ("update_config", config::update_config),
];

/// 全部命令名
pub fn command_names() -> impl Iterator<Item = &'static str> {
    COMMANDS.iter().map(|(name, _)| *name)
}

/// 分发命令
///
/// # 返回
/// - Ok(String): 结果 JSON
/// - Err(String): 错误 JSON (ErrorResponse)
pub fn dispatch(state: &AppState, command: &str, args: Value) -> Result<String, String> {
    let handler = COMMANDS
        .iter()
        .find(|(name, _)| *name == command)
        .map(|(_, handler)| *handler)
        .ok_or_else(|| common::unknown_command(command))?;

    tracing::debug!(command, "分发命令");
    let result = handler(state, args);
    if let Err(err) = &result {
        tracing::warn!(command, error = %err, "命令执行失败");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::NamedTempFile;

    fn setup() -> (NamedTempFile, AppState) {
        let temp = NamedTempFile::new().unwrap();
        let state = AppState::new(temp.path().to_str().unwrap().to_string()).unwrap();
        (temp, state)
    }

    fn error_code(err: &str) -> String {
        let value: Value = serde_json::from_str(err).unwrap();
        value["code"].as_str().unwrap().to_string()
    }

    #[test]
    fn test_command_names_are_unique() {
        let mut names: Vec<&str> = command_names().collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn test_unknown_command() {
        let _guard = crate::i18n::tests::LOCALE_TEST_LOCK
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        let (_temp, state) = setup();

        let err = dispatch(&state, "no_such_command", Value::Null).unwrap_err();
        assert_eq!(error_code(&err), "UNKNOWN_COMMAND");
    }

    #[test]
    fn test_invalid_args() {
        let _guard = crate::i18n::tests::LOCALE_TEST_LOCK
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        let (_temp, state) = setup();

        let err = dispatch(&state, "get_plan", json!({ "plan_id": "abc" })).unwrap_err();
        assert_eq!(error_code(&err), "INVALID_ARGS");

        let err = dispatch(&state, "get_plan", Value::Null).unwrap_err();
        assert_eq!(error_code(&err), "INVALID_ARGS");
    }

    #[test]
    fn test_not_found_carries_status() {
        let _guard = crate::i18n::tests::LOCALE_TEST_LOCK
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        let (_temp, state) = setup();

        let err = dispatch(&state, "get_plan", json!({ "plan_id": 42 })).unwrap_err();
        let value: Value = serde_json::from_str(&err).unwrap();
        assert_eq!(value["code"], "NOT_FOUND");
        assert_eq!(value["details"]["status"], 404);
    }

    #[test]
    fn test_create_object_and_schedule() {
        let _guard = crate::i18n::tests::LOCALE_TEST_LOCK
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        let (_temp, state) = setup();

        let out = dispatch(
            &state,
            "create_object",
            json!({ "district": "Central", "street": "Main 1" }),
        )
        .unwrap();
        let created: Value = serde_json::from_str(&out).unwrap();
        let object_id = created["data"]["object_id"].as_i64().unwrap();

        let out = dispatch(&state, "create_work_schedule", json!({ "object_id": object_id })).unwrap();
        let schedule: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(schedule["data"]["version"], 1);

        let plan_id = schedule["data"]["plan_id"].as_i64().unwrap();
        let out = dispatch(&state, "is_plan_locked", json!({ "plan_id": plan_id })).unwrap();
        let lock: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(lock["locked"], false);
    }
}
