// ==========================================
// 施工进度计划系统 - 层级结构 API
// ==========================================
// 职责: 章 / 节 / 工作类型 / 工作计划的增删改查、重排、移动
// 红线:
// - 写操作先过编辑闸门, 被阻断时不产生任何写入
// - 删除带后代的节点在单一事务内完成 (叶子优先)
// - 带 plan_id 的操作必须校验子节点属于该方案
// ==========================================

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, instrument};

use crate::api::error::{ApiError, ApiResult};
use crate::api::guard::{ensure_plan_editable, require_text};
use crate::api::response::ApiResponse;
use crate::domain::hierarchy::{Chapter, Subchapter, WorkPlan, WorkType};
use crate::engine::lock_manager::LockManager;
use crate::engine::ordering::{MoveOutcome, OrderingEngine};
use crate::engine::repositories::ScheduleRepositories;
use crate::i18n::t_with_args;
use crate::repository::{CascadeSummary, IdAssignment};

// ==========================================
// HierarchyApi - 层级结构 API
// ==========================================
pub struct HierarchyApi {
    repos: ScheduleRepositories,
    lock_manager: Arc<LockManager>,
    ordering_engine: Arc<OrderingEngine>,
}

impl HierarchyApi {
    /// 创建新的HierarchyApi实例
    pub fn new(
        repos: ScheduleRepositories,
        lock_manager: Arc<LockManager>,
        ordering_engine: Arc<OrderingEngine>,
    ) -> Self {
        Self {
            repos,
            lock_manager,
            ordering_engine,
        }
    }

    // ==========================================
    // 章 (Chapter)
    // ==========================================

    pub fn list_chapters(&self, plan_id: i64) -> ApiResult<Vec<Chapter>> {
        self.require_plan(plan_id)?;
        Ok(self.repos.chapter_repo.list_by_plan(plan_id)?)
    }

    pub fn get_chapter(&self, chapter_id: i64) -> ApiResult<Chapter> {
        self.repos
            .chapter_repo
            .find_by_id(chapter_id)?
            .ok_or_else(|| ApiError::not_found("Chapter", chapter_id))
    }

    /// 新增章
    #[instrument(skip(self))]
    pub fn add_chapter(&self, plan_id: i64, name: &str, number: i32) -> ApiResult<ApiResponse<Chapter>> {
        let name = require_text("name", name)?;
        ensure_plan_editable(&self.lock_manager, plan_id, "add_chapter")?;

        let chapter = self.repos.chapter_repo.insert(plan_id, &name, number)?;

        info!(chapter_id = chapter.chapter_id, plan_id, "章已新增");
        Ok(ApiResponse::new(
            t_with_args("hierarchy.chapter_added", &[("id", &chapter.chapter_id.to_string())]),
            chapter,
        ))
    }

    /// 更新章 (名称、序号)
    #[instrument(skip(self))]
    pub fn update_chapter(
        &self,
        chapter_id: i64,
        plan_id: i64,
        name: &str,
        number: i32,
    ) -> ApiResult<ApiResponse<Chapter>> {
        let name = require_text("name", name)?;
        let mut chapter = self.chapter_in_plan(chapter_id, plan_id)?;
        ensure_plan_editable(&self.lock_manager, plan_id, "update_chapter")?;

        chapter.name = name;
        chapter.number = number;
        if !self.repos.chapter_repo.update(&chapter)? {
            return Err(ApiError::not_found("Chapter", chapter_id));
        }

        info!(chapter_id, plan_id, "章已更新");
        Ok(ApiResponse::new(
            t_with_args("hierarchy.chapter_updated", &[("id", &chapter_id.to_string())]),
            chapter,
        ))
    }

    /// 删除章及其节、工作类型、工作计划
    #[instrument(skip(self))]
    pub fn delete_chapter(&self, chapter_id: i64, plan_id: i64) -> ApiResult<ApiResponse<CascadeSummary>> {
        self.chapter_in_plan(chapter_id, plan_id)?;
        ensure_plan_editable(&self.lock_manager, plan_id, "delete_chapter")?;

        let summary = self.repos.cascade_repo.delete_chapter_tree(chapter_id)?;

        info!(chapter_id, plan_id, deleted = summary.total(), "章已删除");
        Ok(ApiResponse::new(
            t_with_args("hierarchy.chapter_deleted", &[("id", &chapter_id.to_string())]),
            summary,
        ))
    }

    /// 整体重排方案下的章
    ///
    /// 先校验编辑锁, 再校验顺序; 任一失败不改变任何序号
    #[instrument(skip(self, new_order))]
    pub fn reorder_chapters(&self, plan_id: i64, new_order: &[i64]) -> ApiResult<ApiResponse<Vec<Chapter>>> {
        ensure_plan_editable(&self.lock_manager, plan_id, "reorder_chapters")?;

        let updated = self.ordering_engine.reorder_chapters(plan_id, new_order)?;
        let chapters = self.repos.chapter_repo.list_by_plan(plan_id)?;

        info!(plan_id, updated, "章已重排");
        Ok(ApiResponse::new(
            t_with_args("hierarchy.chapters_reordered", &[("count", &updated.to_string())]),
            chapters,
        ))
    }

    // ==========================================
    // 节 (Subchapter)
    // ==========================================

    pub fn list_subchapters(&self, chapter_id: i64) -> ApiResult<Vec<Subchapter>> {
        self.get_chapter(chapter_id)?;
        Ok(self.repos.subchapter_repo.list_by_chapter(chapter_id)?)
    }

    pub fn get_subchapter(&self, subchapter_id: i64) -> ApiResult<Subchapter> {
        self.repos
            .subchapter_repo
            .find_by_id(subchapter_id)?
            .ok_or_else(|| ApiError::not_found("Subchapter", subchapter_id))
    }

    /// 新增节
    #[instrument(skip(self))]
    pub fn add_subchapter(
        &self,
        chapter_id: i64,
        name: &str,
        number: i32,
    ) -> ApiResult<ApiResponse<Subchapter>> {
        let name = require_text("name", name)?;
        let chapter = self.get_chapter(chapter_id)?;
        ensure_plan_editable(&self.lock_manager, chapter.plan_id, "add_subchapter")?;

        let subchapter = self.repos.subchapter_repo.insert(chapter_id, &name, number)?;

        info!(subchapter_id = subchapter.subchapter_id, chapter_id, "节已新增");
        Ok(ApiResponse::new(
            t_with_args(
                "hierarchy.subchapter_added",
                &[("id", &subchapter.subchapter_id.to_string())],
            ),
            subchapter,
        ))
    }

    /// 更新节 (名称、序号); 节必须属于 chapter_id
    #[instrument(skip(self))]
    pub fn update_subchapter(
        &self,
        subchapter_id: i64,
        chapter_id: i64,
        name: &str,
        number: i32,
    ) -> ApiResult<ApiResponse<Subchapter>> {
        let name = require_text("name", name)?;
        let (mut subchapter, chapter) = self.subchapter_in_chapter(subchapter_id, chapter_id)?;
        ensure_plan_editable(&self.lock_manager, chapter.plan_id, "update_subchapter")?;

        subchapter.name = name;
        subchapter.number = number;
        if !self.repos.subchapter_repo.update(&subchapter)? {
            return Err(ApiError::not_found("Subchapter", subchapter_id));
        }

        info!(subchapter_id, chapter_id, "节已更新");
        Ok(ApiResponse::new(
            t_with_args("hierarchy.subchapter_updated", &[("id", &subchapter_id.to_string())]),
            subchapter,
        ))
    }

    /// 删除节及其工作类型、工作计划
    #[instrument(skip(self))]
    pub fn delete_subchapter(
        &self,
        subchapter_id: i64,
        chapter_id: i64,
    ) -> ApiResult<ApiResponse<CascadeSummary>> {
        let (_, chapter) = self.subchapter_in_chapter(subchapter_id, chapter_id)?;
        ensure_plan_editable(&self.lock_manager, chapter.plan_id, "delete_subchapter")?;

        let summary = self.repos.cascade_repo.delete_subchapter_tree(subchapter_id)?;

        info!(subchapter_id, chapter_id, deleted = summary.total(), "节已删除");
        Ok(ApiResponse::new(
            t_with_args("hierarchy.subchapter_deleted", &[("id", &subchapter_id.to_string())]),
            summary,
        ))
    }

    /// 整体重排章下的节
    #[instrument(skip(self, new_order))]
    pub fn reorder_subchapters(
        &self,
        chapter_id: i64,
        new_order: &[i64],
    ) -> ApiResult<ApiResponse<Vec<Subchapter>>> {
        let chapter = self.get_chapter(chapter_id)?;
        ensure_plan_editable(&self.lock_manager, chapter.plan_id, "reorder_subchapters")?;

        let updated = self.ordering_engine.reorder_subchapters(chapter_id, new_order)?;
        let subchapters = self.repos.subchapter_repo.list_by_chapter(chapter_id)?;

        info!(chapter_id, updated, "节已重排");
        Ok(ApiResponse::new(
            t_with_args("hierarchy.subchapters_reordered", &[("count", &updated.to_string())]),
            subchapters,
        ))
    }

    /// 将节移动到同方案内另一章的末尾
    #[instrument(skip(self))]
    pub fn move_subchapter(
        &self,
        subchapter_id: i64,
        new_chapter_id: i64,
        plan_id: i64,
    ) -> ApiResult<ApiResponse<MoveOutcome>> {
        ensure_plan_editable(&self.lock_manager, plan_id, "move_subchapter")?;

        let outcome = self
            .ordering_engine
            .move_subchapter(subchapter_id, new_chapter_id, plan_id)?;

        info!(
            subchapter_id,
            from = outcome.from_chapter_id,
            to = outcome.to_chapter_id,
            number = outcome.new_number,
            "节已移动"
        );
        Ok(ApiResponse::new(
            t_with_args(
                "hierarchy.subchapter_moved",
                &[
                    ("id", &subchapter_id.to_string()),
                    ("chapter_id", &new_chapter_id.to_string()),
                    ("number", &outcome.new_number.to_string()),
                ],
            ),
            outcome,
        ))
    }

    // ==========================================
    // 工作类型 (WorkType)
    // ==========================================

    pub fn list_work_types(&self, subchapter_id: i64) -> ApiResult<Vec<WorkType>> {
        self.get_subchapter(subchapter_id)?;
        Ok(self.repos.work_type_repo.list_by_subchapter(subchapter_id)?)
    }

    pub fn get_work_type(&self, work_type_id: i64) -> ApiResult<WorkType> {
        self.repos
            .work_type_repo
            .find_by_id(work_type_id)?
            .ok_or_else(|| ApiError::not_found("WorkType", work_type_id))
    }

    /// 新增工作类型
    ///
    /// `explicit_id` 为 None 时自动分配; 指定时必须未被占用
    #[instrument(skip(self))]
    pub fn add_work_type(
        &self,
        subchapter_id: i64,
        name: &str,
        number: i32,
        unit: &str,
        explicit_id: Option<i64>,
    ) -> ApiResult<ApiResponse<WorkType>> {
        let name = require_text("name", name)?;
        let plan_id = self
            .repos
            .subchapter_repo
            .find_plan_id(subchapter_id)?
            .ok_or_else(|| ApiError::not_found("Subchapter", subchapter_id))?;
        ensure_plan_editable(&self.lock_manager, plan_id, "add_work_type")?;

        let work_type = self.repos.work_type_repo.insert(
            subchapter_id,
            &name,
            number,
            unit.trim(),
            IdAssignment::from(explicit_id),
        )?;

        info!(work_type_id = work_type.work_type_id, subchapter_id, "工作类型已新增");
        Ok(ApiResponse::new(
            t_with_args(
                "hierarchy.work_type_added",
                &[("id", &work_type.work_type_id.to_string())],
            ),
            work_type,
        ))
    }

    /// 更新工作类型 (名称、序号、计量单位)
    #[instrument(skip(self))]
    pub fn update_work_type(
        &self,
        work_type_id: i64,
        plan_id: i64,
        name: &str,
        number: i32,
        unit: &str,
    ) -> ApiResult<ApiResponse<WorkType>> {
        let name = require_text("name", name)?;
        let mut work_type = self.work_type_in_plan(work_type_id, plan_id)?;
        ensure_plan_editable(&self.lock_manager, plan_id, "update_work_type")?;

        work_type.name = name;
        work_type.number = number;
        work_type.unit = unit.trim().to_string();
        if !self.repos.work_type_repo.update(&work_type)? {
            return Err(ApiError::not_found("WorkType", work_type_id));
        }

        info!(work_type_id, plan_id, "工作类型已更新");
        Ok(ApiResponse::new(
            t_with_args("hierarchy.work_type_updated", &[("id", &work_type_id.to_string())]),
            work_type,
        ))
    }

    /// 删除工作类型 (先删工作计划, 单一事务)
    #[instrument(skip(self))]
    pub fn delete_work_type(&self, work_type_id: i64, plan_id: i64) -> ApiResult<ApiResponse<CascadeSummary>> {
        self.work_type_in_plan(work_type_id, plan_id)?;
        ensure_plan_editable(&self.lock_manager, plan_id, "delete_work_type")?;

        let summary = self.repos.cascade_repo.delete_work_type_tree(work_type_id)?;

        info!(work_type_id, plan_id, work_plans = summary.work_plans, "工作类型已删除");
        Ok(ApiResponse::new(
            t_with_args("hierarchy.work_type_deleted", &[("id", &work_type_id.to_string())]),
            summary,
        ))
    }

    // ==========================================
    // 工作计划 (WorkPlan)
    // ==========================================

    /// 工作类型下的工作计划 (按日期升序)
    pub fn list_work_plans(&self, work_type_id: i64) -> ApiResult<Vec<WorkPlan>> {
        self.get_work_type(work_type_id)?;
        Ok(self.repos.work_plan_repo.list_by_work_type(work_type_id)?)
    }

    pub fn get_work_plan(&self, work_plan_id: i64) -> ApiResult<WorkPlan> {
        self.repos
            .work_plan_repo
            .find_by_id(work_plan_id)?
            .ok_or_else(|| ApiError::not_found("WorkPlan", work_plan_id))
    }

    /// 新增工作计划
    #[instrument(skip(self))]
    pub fn add_work_plan(
        &self,
        work_type_id: i64,
        plan_date: NaiveDate,
        value: i32,
        explicit_id: Option<i64>,
    ) -> ApiResult<ApiResponse<WorkPlan>> {
        let plan_id = self
            .repos
            .work_type_repo
            .find_plan_id(work_type_id)?
            .ok_or_else(|| ApiError::not_found("WorkType", work_type_id))?;
        ensure_plan_editable(&self.lock_manager, plan_id, "add_work_plan")?;

        let work_plan = self.repos.work_plan_repo.insert(
            work_type_id,
            plan_date,
            value,
            IdAssignment::from(explicit_id),
        )?;

        info!(work_plan_id = work_plan.work_plan_id, work_type_id, "工作计划已新增");
        Ok(ApiResponse::new(
            t_with_args(
                "hierarchy.work_plan_added",
                &[("id", &work_plan.work_plan_id.to_string())],
            ),
            work_plan,
        ))
    }

    /// 更新工作计划 (日期、计划量)
    #[instrument(skip(self))]
    pub fn update_work_plan(
        &self,
        work_plan_id: i64,
        plan_id: i64,
        plan_date: NaiveDate,
        value: i32,
    ) -> ApiResult<ApiResponse<WorkPlan>> {
        let mut work_plan = self.work_plan_in_plan(work_plan_id, plan_id)?;
        ensure_plan_editable(&self.lock_manager, plan_id, "update_work_plan")?;

        work_plan.plan_date = plan_date;
        work_plan.value = value;
        if !self.repos.work_plan_repo.update(&work_plan)? {
            return Err(ApiError::not_found("WorkPlan", work_plan_id));
        }

        info!(work_plan_id, plan_id, "工作计划已更新");
        Ok(ApiResponse::new(
            t_with_args("hierarchy.work_plan_updated", &[("id", &work_plan_id.to_string())]),
            work_plan,
        ))
    }

    /// 删除工作计划
    #[instrument(skip(self))]
    pub fn delete_work_plan(&self, work_plan_id: i64, plan_id: i64) -> ApiResult<ApiResponse<WorkPlan>> {
        let work_plan = self.work_plan_in_plan(work_plan_id, plan_id)?;
        ensure_plan_editable(&self.lock_manager, plan_id, "delete_work_plan")?;

        if !self.repos.work_plan_repo.delete(work_plan_id)? {
            return Err(ApiError::not_found("WorkPlan", work_plan_id));
        }

        info!(work_plan_id, plan_id, "工作计划已删除");
        Ok(ApiResponse::new(
            t_with_args("hierarchy.work_plan_deleted", &[("id", &work_plan_id.to_string())]),
            work_plan,
        ))
    }

    // ==========================================
    // 归属校验
    // ==========================================

    fn require_plan(&self, plan_id: i64) -> ApiResult<()> {
        if self.repos.plan_repo.find_by_id(plan_id)?.is_none() {
            return Err(ApiError::not_found("SchedulePlan", plan_id));
        }
        Ok(())
    }

    fn not_in_plan(entity: &str, id: i64, plan_id: i64) -> ApiError {
        ApiError::NotFound(t_with_args(
            "error.not_in_plan",
            &[
                ("entity", entity),
                ("id", &id.to_string()),
                ("plan_id", &plan_id.to_string()),
            ],
        ))
    }

    fn chapter_in_plan(&self, chapter_id: i64, plan_id: i64) -> ApiResult<Chapter> {
        let chapter = self.get_chapter(chapter_id)?;
        if chapter.plan_id != plan_id {
            return Err(Self::not_in_plan("Chapter", chapter_id, plan_id));
        }
        Ok(chapter)
    }

    fn subchapter_in_chapter(
        &self,
        subchapter_id: i64,
        chapter_id: i64,
    ) -> ApiResult<(Subchapter, Chapter)> {
        let subchapter = self.get_subchapter(subchapter_id)?;
        if subchapter.chapter_id != chapter_id {
            return Err(ApiError::NotFound(t_with_args(
                "error.not_in_chapter",
                &[
                    ("id", &subchapter_id.to_string()),
                    ("chapter_id", &chapter_id.to_string()),
                ],
            )));
        }
        let chapter = self.get_chapter(chapter_id)?;
        Ok((subchapter, chapter))
    }

    fn work_type_in_plan(&self, work_type_id: i64, plan_id: i64) -> ApiResult<WorkType> {
        let work_type = self.get_work_type(work_type_id)?;
        match self.repos.work_type_repo.find_plan_id(work_type_id)? {
            Some(owner) if owner == plan_id => Ok(work_type),
            _ => Err(Self::not_in_plan("WorkType", work_type_id, plan_id)),
        }
    }

    fn work_plan_in_plan(&self, work_plan_id: i64, plan_id: i64) -> ApiResult<WorkPlan> {
        let work_plan = self.get_work_plan(work_plan_id)?;
        match self.repos.work_plan_repo.find_plan_id(work_plan_id)? {
            Some(owner) if owner == plan_id => Ok(work_plan),
            _ => Err(Self::not_in_plan("WorkPlan", work_plan_id, plan_id)),
        }
    }
}
