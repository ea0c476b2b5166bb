use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use crate::app::state::AppState;

use super::common::{map_api_error, parse_args, to_json};

// ==========================================
// 参数结构
// ==========================================

#[derive(Debug, Deserialize)]
struct PlanIdArgs {
    plan_id: i64,
}

#[derive(Debug, Deserialize)]
struct ChapterIdArgs {
    chapter_id: i64,
}

#[derive(Debug, Deserialize)]
struct SubchapterIdArgs {
    subchapter_id: i64,
}

#[derive(Debug, Deserialize)]
struct WorkTypeIdArgs {
    work_type_id: i64,
}

#[derive(Debug, Deserialize)]
struct WorkPlanIdArgs {
    work_plan_id: i64,
}

#[derive(Debug, Deserialize)]
struct AddChapterArgs {
    plan_id: i64,
    name: String,
    number: i32,
}

#[derive(Debug, Deserialize)]
struct UpdateChapterArgs {
    chapter_id: i64,
    plan_id: i64,
    name: String,
    number: i32,
}

#[derive(Debug, Deserialize)]
struct DeleteChapterArgs {
    chapter_id: i64,
    plan_id: i64,
}

#[derive(Debug, Deserialize)]
struct ReorderChaptersArgs {
    plan_id: i64,
    order: Vec<i64>,
}

#[derive(Debug, Deserialize)]
struct AddSubchapterArgs {
    chapter_id: i64,
    name: String,
    number: i32,
}

#[derive(Debug, Deserialize)]
struct UpdateSubchapterArgs {
    subchapter_id: i64,
    chapter_id: i64,
    name: String,
    number: i32,
}

#[derive(Debug, Deserialize)]
struct DeleteSubchapterArgs {
    subchapter_id: i64,
    chapter_id: i64,
}

#[derive(Debug, Deserialize)]
struct ReorderSubchaptersArgs {
    chapter_id: i64,
    order: Vec<i64>,
}

#[derive(Debug, Deserialize)]
struct MoveSubchapterArgs {
    subchapter_id: i64,
    new_chapter_id: i64,
    plan_id: i64,
}

#[derive(Debug, Deserialize)]
struct AddWorkTypeArgs {
    subchapter_id: i64,
    name: String,
    number: i32,
    unit: String,
    #[serde(default)]
    work_type_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct UpdateWorkTypeArgs {
    work_type_id: i64,
    plan_id: i64,
    name: String,
    number: i32,
    unit: String,
}

#[derive(Debug, Deserialize)]
struct DeleteWorkTypeArgs {
    work_type_id: i64,
    plan_id: i64,
}

#[derive(Debug, Deserialize)]
struct AddWorkPlanArgs {
    work_type_id: i64,
    plan_date: NaiveDate,
    value: i32,
    #[serde(default)]
    work_plan_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct UpdateWorkPlanArgs {
    work_plan_id: i64,
    plan_id: i64,
    plan_date: NaiveDate,
    value: i32,
}

#[derive(Debug, Deserialize)]
struct DeleteWorkPlanArgs {
    work_plan_id: i64,
    plan_id: i64,
}

// ==========================================
// 章相关命令
// ==========================================

pub(super) fn list_chapters(state: &AppState, args: Value) -> Result<String, String> {
    let args: PlanIdArgs = parse_args(args)?;
    let result = state
        .hierarchy_api
        .list_chapters(args.plan_id)
        .map_err(map_api_error)?;

    to_json(&result)
}

pub(super) fn get_chapter(state: &AppState, args: Value) -> Result<String, String> {
    let args: ChapterIdArgs = parse_args(args)?;
    let result = state
        .hierarchy_api
        .get_chapter(args.chapter_id)
        .map_err(map_api_error)?;

    to_json(&result)
}

pub(super) fn add_chapter(state: &AppState, args: Value) -> Result<String, String> {
    let args: AddChapterArgs = parse_args(args)?;
    let result = state
        .hierarchy_api
        .add_chapter(args.plan_id, &args.name, args.number)
        .map_err(map_api_error)?;

    to_json(&result)
}

pub(super) fn update_chapter(state: &AppState, args: Value) -> Result<String, String> {
    let args: UpdateChapterArgs = parse_args(args)?;
    let result = state
        .hierarchy_api
        .update_chapter(args.chapter_id, args.plan_id, &args.name, args.number)
        .map_err(map_api_error)?;

    to_json(&result)
}

/// 删除章（级联删除节、工作类型、工作计划）
pub(super) fn delete_chapter(state: &AppState, args: Value) -> Result<String, String> {
    let args: DeleteChapterArgs = parse_args(args)?;
    let result = state
        .hierarchy_api
        .delete_chapter(args.chapter_id, args.plan_id)
        .map_err(map_api_error)?;

    to_json(&result)
}

/// 整体重排章
pub(super) fn reorder_chapters(state: &AppState, args: Value) -> Result<String, String> {
    let args: ReorderChaptersArgs = parse_args(args)?;
    let result = state
        .hierarchy_api
        .reorder_chapters(args.plan_id, &args.order)
        .map_err(map_api_error)?;

    to_json(&result)
}

// ==========================================
// 节相关命令
// ==========================================

pub(super) fn list_subchapters(state: &AppState, args: Value) -> Result<String, String> {
    let args: ChapterIdArgs = parse_args(args)?;
    let result = state
        .hierarchy_api
        .list_subchapters(args.chapter_id)
        .map_err(map_api_error)?;

    to_json(&result)
}

pub(super) fn get_subchapter(state: &AppState, args: Value) -> Result<String, String> {
    let args: SubchapterIdArgs = parse_args(args)?;
    let result = state
        .hierarchy_api
        .get_subchapter(args.subchapter_id)
        .map_err(map_api_error)?;

    to_json(&result)
}

pub(super) fn add_subchapter(state: &AppState, args: Value) -> Result<String, String> {
    let args: AddSubchapterArgs = parse_args(args)?;
    let result = state
        .hierarchy_api
        .add_subchapter(args.chapter_id, &args.name, args.number)
        .map_err(map_api_error)?;

    to_json(&result)
}

pub(super) fn update_subchapter(state: &AppState, args: Value) -> Result<String, String> {
    let args: UpdateSubchapterArgs = parse_args(args)?;
    let result = state
        .hierarchy_api
        .update_subchapter(args.subchapter_id, args.chapter_id, &args.name, args.number)
        .map_err(map_api_error)?;

    to_json(&result)
}

pub(super) fn delete_subchapter(state: &AppState, args: Value) -> Result<String, String> {
    let args: DeleteSubchapterArgs = parse_args(args)?;
    let result = state
        .hierarchy_api
        .delete_subchapter(args.subchapter_id, args.chapter_id)
        .map_err(map_api_error)?;

    to_json(&result)
}

pub(super) fn reorder_subchapters(state: &AppState, args: Value) -> Result<String, String> {
    let args: ReorderSubchaptersArgs = parse_args(args)?;
    let result = state
        .hierarchy_api
        .reorder_subchapters(args.chapter_id, &args.order)
        .map_err(map_api_error)?;

    to_json(&result)
}

/// 将节移动到同方案的另一章末尾
pub(super) fn move_subchapter(state: &AppState, args: Value) -> Result<String, String> {
    let args: MoveSubchapterArgs = parse_args(args)?;
    let result = state
        .hierarchy_api
        .move_subchapter(args.subchapter_id, args.new_chapter_id, args.plan_id)
        .map_err(map_api_error)?;

    to_json(&result)
}

// ==========================================
// 工作类型相关命令
// ==========================================

pub(super) fn list_work_types(state: &AppState, args: Value) -> Result<String, String> {
    let args: SubchapterIdArgs = parse_args(args)?;
    let result = state
        .hierarchy_api
        .list_work_types(args.subchapter_id)
        .map_err(map_api_error)?;

    to_json(&result)
}

pub(super) fn get_work_type(state: &AppState, args: Value) -> Result<String, String> {
    let args: WorkTypeIdArgs = parse_args(args)?;
    let result = state
        .hierarchy_api
        .get_work_type(args.work_type_id)
        .map_err(map_api_error)?;

    to_json(&result)
}

/// 新增工作类型（work_type_id 可选, 缺省自动分配）
pub(super) fn add_work_type(state: &AppState, args: Value) -> Result<String, String> {
    let args: AddWorkTypeArgs = parse_args(args)?;
    let result = state
        .hierarchy_api
        .add_work_type(
            args.subchapter_id,
            &args.name,
            args.number,
            &args.unit,
            args.work_type_id,
        )
        .map_err(map_api_error)?;

    to_json(&result)
}

pub(super) fn update_work_type(state: &AppState, args: Value) -> Result<String, String> {
    let args: UpdateWorkTypeArgs = parse_args(args)?;
    let result = state
        .hierarchy_api
        .update_work_type(
            args.work_type_id,
            args.plan_id,
            &args.name,
            args.number,
            &args.unit,
        )
        .map_err(map_api_error)?;

    to_json(&result)
}

pub(super) fn delete_work_type(state: &AppState, args: Value) -> Result<String, String> {
    let args: DeleteWorkTypeArgs = parse_args(args)?;
    let result = state
        .hierarchy_api
        .delete_work_type(args.work_type_id, args.plan_id)
        .map_err(map_api_error)?;

    to_json(&result)
}

// ==========================================
// 工作计划相关命令
// ==========================================

pub(super) fn list_work_plans(state: &AppState, args: Value) -> Result<String, String> {
    let args: WorkTypeIdArgs = parse_args(args)?;
    let result = state
        .hierarchy_api
        .list_work_plans(args.work_type_id)
        .map_err(map_api_error)?;

    to_json(&result)
}

pub(super) fn get_work_plan(state: &AppState, args: Value) -> Result<String, String> {
    let args: WorkPlanIdArgs = parse_args(args)?;
    let result = state
        .hierarchy_api
        .get_work_plan(args.work_plan_id)
        .map_err(map_api_error)?;

    to_json(&result)
}

/// 新增工作计划（plan_date 格式 YYYY-MM-DD）
pub(super) fn add_work_plan(state: &AppState, args: Value) -> Result<String, String> {
    let args: AddWorkPlanArgs = parse_args(args)?;
    let result = state
        .hierarchy_api
        .add_work_plan(args.work_type_id, args.plan_date, args.value, args.work_plan_id)
        .map_err(map_api_error)?;

    to_json(&result)
}

pub(super) fn update_work_plan(state: &AppState, args: Value) -> Result<String, String> {
    let args: UpdateWorkPlanArgs = parse_args(args)?;
    let result = state
        .hierarchy_api
        .update_work_plan(args.work_plan_id, args.plan_id, args.plan_date, args.value)
        .map_err(map_api_error)?;

    to_json(&result)
}

pub(super) fn delete_work_plan(state: &AppState, args: Value) -> Result<String, String> {
    let args: DeleteWorkPlanArgs = parse_args(args)?;
    let result = state
        .hierarchy_api
        .delete_work_plan(args.work_plan_id, args.plan_id)
        .map_err(map_api_error)?;

    to_json(&result)
}
