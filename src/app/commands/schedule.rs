use serde::Deserialize;
use serde_json::Value;

use crate::app::state::AppState;

use super::common::{map_api_error, parse_args, to_json};

// ==========================================
// 参数结构
// ==========================================

#[derive(Debug, Deserialize)]
struct CreateObjectArgs {
    district: String,
    street: String,
}

#[derive(Debug, Deserialize)]
struct ObjectIdArgs {
    object_id: i64,
}

#[derive(Debug, Deserialize)]
struct PlanIdArgs {
    plan_id: i64,
}

// ==========================================
// 施工对象相关命令
// ==========================================

/// 创建施工对象
pub(super) fn create_object(state: &AppState, args: Value) -> Result<String, String> {
    let args: CreateObjectArgs = parse_args(args)?;
    let result = state
        .schedule_api
        .create_object(&args.district, &args.street)
        .map_err(map_api_error)?;

    to_json(&result)
}

pub(super) fn get_object(state: &AppState, args: Value) -> Result<String, String> {
    let args: ObjectIdArgs = parse_args(args)?;
    let result = state
        .schedule_api
        .get_object(args.object_id)
        .map_err(map_api_error)?;

    to_json(&result)
}

pub(super) fn list_objects(state: &AppState, _args: Value) -> Result<String, String> {
    let result = state.schedule_api.list_objects().map_err(map_api_error)?;

    to_json(&result)
}

// ==========================================
// 进度计划方案相关命令
// ==========================================

/// 为对象创建新版本方案
pub(super) fn create_work_schedule(state: &AppState, args: Value) -> Result<String, String> {
    let args: ObjectIdArgs = parse_args(args)?;
    let result = state
        .schedule_api
        .create_work_schedule(args.object_id)
        .map_err(map_api_error)?;

    to_json(&result)
}

pub(super) fn list_plans(state: &AppState, _args: Value) -> Result<String, String> {
    let result = state.schedule_api.list_plans().map_err(map_api_error)?;

    to_json(&result)
}

pub(super) fn list_plan_versions(state: &AppState, args: Value) -> Result<String, String> {
    let args: ObjectIdArgs = parse_args(args)?;
    let result = state
        .schedule_api
        .list_plan_versions(args.object_id)
        .map_err(map_api_error)?;

    to_json(&result)
}

pub(super) fn get_plan(state: &AppState, args: Value) -> Result<String, String> {
    let args: PlanIdArgs = parse_args(args)?;
    let result = state
        .schedule_api
        .get_plan(args.plan_id)
        .map_err(map_api_error)?;

    to_json(&result)
}

/// 查询方案结构快照
pub(super) fn get_plan_structure(state: &AppState, args: Value) -> Result<String, String> {
    let args: PlanIdArgs = parse_args(args)?;
    let result = state
        .schedule_api
        .get_plan_structure(args.plan_id)
        .map_err(map_api_error)?;

    to_json(&result)
}

/// 查询对象当前编辑中方案的结构
pub(super) fn get_current_schedule(state: &AppState, args: Value) -> Result<String, String> {
    let args: ObjectIdArgs = parse_args(args)?;
    let result = state
        .schedule_api
        .get_current_schedule(args.object_id)
        .map_err(map_api_error)?;

    to_json(&result)
}

/// 激活方案（同对象其他方案归档）
pub(super) fn set_active_plan(state: &AppState, args: Value) -> Result<String, String> {
    let args: PlanIdArgs = parse_args(args)?;
    let result = state
        .schedule_api
        .set_active_plan(args.plan_id)
        .map_err(map_api_error)?;

    to_json(&result)
}

/// 删除方案（级联删除全部层级）
pub(super) fn delete_work_schedule(state: &AppState, args: Value) -> Result<String, String> {
    let args: PlanIdArgs = parse_args(args)?;
    let result = state
        .schedule_api
        .delete_work_schedule(args.plan_id)
        .map_err(map_api_error)?;

    to_json(&result)
}

/// 删除对象及其全部方案
pub(super) fn delete_object_schedules(state: &AppState, args: Value) -> Result<String, String> {
    let args: ObjectIdArgs = parse_args(args)?;
    let result = state
        .schedule_api
        .delete_object_schedules(args.object_id)
        .map_err(map_api_error)?;

    to_json(&result)
}

// ==========================================
// 编辑锁相关命令
// ==========================================

pub(super) fn lock_changes(state: &AppState, _args: Value) -> Result<String, String> {
    to_json(&state.schedule_api.lock_changes())
}

pub(super) fn unlock_changes(state: &AppState, _args: Value) -> Result<String, String> {
    to_json(&state.schedule_api.unlock_changes())
}

pub(super) fn is_changes_locked(state: &AppState, _args: Value) -> Result<String, String> {
    to_json(&state.schedule_api.is_changes_locked())
}

pub(super) fn lock_plan(state: &AppState, args: Value) -> Result<String, String> {
    let args: PlanIdArgs = parse_args(args)?;
    let result = state
        .schedule_api
        .lock_plan(args.plan_id)
        .map_err(map_api_error)?;

    to_json(&result)
}

pub(super) fn unlock_plan(state: &AppState, args: Value) -> Result<String, String> {
    let args: PlanIdArgs = parse_args(args)?;
    let result = state
        .schedule_api
        .unlock_plan(args.plan_id)
        .map_err(map_api_error)?;

    to_json(&result)
}

pub(super) fn is_plan_locked(state: &AppState, args: Value) -> Result<String, String> {
    let args: PlanIdArgs = parse_args(args)?;
    let result = state
        .schedule_api
        .is_plan_locked(args.plan_id)
        .map_err(map_api_error)?;

    to_json(&result)
}

pub(super) fn lock_object(state: &AppState, args: Value) -> Result<String, String> {
    let args: ObjectIdArgs = parse_args(args)?;
    let result = state
        .schedule_api
        .lock_object(args.object_id)
        .map_err(map_api_error)?;

    to_json(&result)
}

pub(super) fn unlock_object(state: &AppState, args: Value) -> Result<String, String> {
    let args: ObjectIdArgs = parse_args(args)?;
    let result = state
        .schedule_api
        .unlock_object(args.object_id)
        .map_err(map_api_error)?;

    to_json(&result)
}

pub(super) fn is_object_locked(state: &AppState, args: Value) -> Result<String, String> {
    let args: ObjectIdArgs = parse_args(args)?;
    let result = state
        .schedule_api
        .is_object_locked(args.object_id)
        .map_err(map_api_error)?;

    to_json(&result)
}
