// ==========================================
// 施工进度计划系统 - 进度计划方案 API
// ==========================================
// 职责: 对象管理、方案版本管理、编辑锁、整方案级联删除
// 约束: 同一对象至多一个编辑中方案 (可由配置关闭)
// ==========================================

use std::sync::Arc;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::guard::{ensure_changes_unlocked, require_text};
use crate::api::response::{ApiResponse, LockState};
use crate::config::ConfigManager;
use crate::domain::object::ConstructionObject;
use crate::domain::plan::{PlanStructure, SchedulePlan};
use crate::domain::types::{object_status, PlanStatus};
use crate::engine::lock_manager::{LockManager, LockScope, UnlockOutcome};
use crate::engine::repositories::ScheduleRepositories;
use crate::i18n::t_with_args;
use crate::repository::{CascadeSummary, IdAssignment};

/// 创建方案的结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedSchedule {
    pub plan_id: i64,
    pub object_id: i64,
    pub version: i32,
    pub status: PlanStatus,
}

// ==========================================
// ScheduleApi - 进度计划方案 API
// ==========================================
pub struct ScheduleApi {
    repos: ScheduleRepositories,
    lock_manager: Arc<LockManager>,
    config_manager: Arc<ConfigManager>,
}

impl ScheduleApi {
    /// 创建新的ScheduleApi实例
    pub fn new(
        repos: ScheduleRepositories,
        lock_manager: Arc<LockManager>,
        config_manager: Arc<ConfigManager>,
    ) -> Self {
        Self {
            repos,
            lock_manager,
            config_manager,
        }
    }

    // ==========================================
    // 对象
    // ==========================================

    /// 创建施工对象 (初始状态 UNLOCKED)
    #[instrument(skip(self))]
    pub fn create_object(
        &self,
        district: &str,
        street: &str,
    ) -> ApiResult<ApiResponse<ConstructionObject>> {
        let district = require_text("district", district)?;
        let street = require_text("street", street)?;

        let object = self.repos.object_repo.create(
            &district,
            &street,
            object_status::UNLOCKED,
            IdAssignment::Auto,
        )?;

        info!(object_id = object.object_id, "施工对象已创建");
        Ok(ApiResponse::new(
            t_with_args("object.created", &[("object_id", &object.object_id.to_string())]),
            object,
        ))
    }

    pub fn get_object(&self, object_id: i64) -> ApiResult<ConstructionObject> {
        self.repos
            .object_repo
            .find_by_id(object_id)?
            .ok_or_else(|| ApiError::not_found("ConstructionObject", object_id))
    }

    pub fn list_objects(&self) -> ApiResult<Vec<ConstructionObject>> {
        Ok(self.repos.object_repo.list_all()?)
    }

    // ==========================================
    // 方案版本
    // ==========================================

    /// 为对象创建新版本方案 (状态为编辑中)
    ///
    /// # 错误
    /// - NotFound: 对象不存在
    /// - ActivePlanExists: 已有编辑中方案 (schedule.single_editing_plan = true)
    /// - ChangesLocked / ObjectLocked: 编辑被锁
    #[instrument(skip(self))]
    pub fn create_work_schedule(&self, object_id: i64) -> ApiResult<ApiResponse<CreatedSchedule>> {
        let object = self.get_object(object_id)?;

        ensure_changes_unlocked(&self.lock_manager, "create_work_schedule")?;
        if object.is_locked() {
            warn!(object_id, "对象已锁定，拒绝创建方案");
            return Err(ApiError::from_lock_scope(LockScope::Object(object_id)));
        }

        let single_editing = self
            .config_manager
            .get_single_editing_plan()
            .map_err(|e| ApiError::InternalError(e.to_string()))?;
        if single_editing {
            if let Some(editing) = self.repos.plan_repo.find_editing_by_object(object_id)? {
                warn!(object_id, plan_id = editing.plan_id, "已存在编辑中方案");
                return Err(ApiError::ActivePlanExists(t_with_args(
                    "error.active_plan_exists",
                    &[
                        ("object_id", &object_id.to_string()),
                        ("plan_id", &editing.plan_id.to_string()),
                    ],
                )));
            }
        }

        let plan = self.repos.plan_repo.create_with_next_version(
            object_id,
            PlanStatus::Editing,
            Local::now().naive_local(),
        )?;

        info!(plan_id = plan.plan_id, object_id, version = plan.version, "方案已创建");
        Ok(ApiResponse::new(
            t_with_args(
                "schedule.created",
                &[
                    ("plan_id", &plan.plan_id.to_string()),
                    ("version", &plan.version.to_string()),
                ],
            ),
            CreatedSchedule {
                plan_id: plan.plan_id,
                object_id,
                version: plan.version,
                status: plan.status,
            },
        ))
    }

    /// 查询全部方案 (按创建时间降序)
    pub fn list_plans(&self) -> ApiResult<Vec<SchedulePlan>> {
        Ok(self.repos.plan_repo.list_all()?)
    }

    /// 查询对象的方案版本 (按版本降序)
    pub fn list_plan_versions(&self, object_id: i64) -> ApiResult<Vec<SchedulePlan>> {
        self.get_object(object_id)?;
        Ok(self.repos.plan_repo.list_by_object(object_id)?)
    }

    pub fn get_plan(&self, plan_id: i64) -> ApiResult<SchedulePlan> {
        self.repos
            .plan_repo
            .find_by_id(plan_id)?
            .ok_or_else(|| ApiError::not_found("SchedulePlan", plan_id))
    }

    /// 方案结构快照
    pub fn get_plan_structure(&self, plan_id: i64) -> ApiResult<PlanStructure> {
        self.repos
            .load_structure(plan_id)?
            .ok_or_else(|| ApiError::not_found("SchedulePlan", plan_id))
    }

    /// 对象当前编辑中方案的结构 (按状态显式查找)
    pub fn get_current_schedule(&self, object_id: i64) -> ApiResult<PlanStructure> {
        self.get_object(object_id)?;
        let editing = self
            .repos
            .plan_repo
            .find_editing_by_object(object_id)?
            .ok_or_else(|| {
                ApiError::NotFound(t_with_args(
                    "error.no_editing_plan",
                    &[("object_id", &object_id.to_string())],
                ))
            })?;
        self.get_plan_structure(editing.plan_id)
    }

    /// 激活方案: 置为编辑中, 同对象其他方案归档
    #[instrument(skip(self))]
    pub fn set_active_plan(&self, plan_id: i64) -> ApiResult<ApiResponse<SchedulePlan>> {
        self.get_plan(plan_id)?;
        ensure_changes_unlocked(&self.lock_manager, "set_active_plan")?;

        let archived = self.repos.plan_repo.activate(plan_id)?;
        let plan = self.get_plan(plan_id)?;

        info!(plan_id, archived, "方案已激活");
        Ok(ApiResponse::new(
            t_with_args(
                "schedule.activated",
                &[
                    ("plan_id", &plan_id.to_string()),
                    ("archived", &archived.to_string()),
                ],
            ),
            plan,
        ))
    }

    // ==========================================
    // 级联删除
    // ==========================================

    /// 删除方案及其全部后代 (单一事务)
    ///
    /// 方案锁只保护方案内容, 不阻止整体删除; 全局开关仍然生效
    #[instrument(skip(self))]
    pub fn delete_work_schedule(&self, plan_id: i64) -> ApiResult<ApiResponse<CascadeSummary>> {
        self.get_plan(plan_id)?;
        ensure_changes_unlocked(&self.lock_manager, "delete_work_schedule")?;

        let summary = self.repos.cascade_repo.delete_plan_tree(plan_id)?;

        info!(
            plan_id,
            chapters = summary.chapters,
            subchapters = summary.subchapters,
            work_types = summary.work_types,
            work_plans = summary.work_plans,
            "方案已删除"
        );
        Ok(ApiResponse::new(
            t_with_args("schedule.deleted", &[("plan_id", &plan_id.to_string())]),
            summary,
        ))
    }

    /// 删除对象的全部方案及对象本身 (单一事务)
    #[instrument(skip(self))]
    pub fn delete_object_schedules(&self, object_id: i64) -> ApiResult<ApiResponse<CascadeSummary>> {
        self.get_object(object_id)?;
        ensure_changes_unlocked(&self.lock_manager, "delete_object_schedules")?;

        let summary = self.repos.cascade_repo.delete_object_schedules(object_id)?;

        info!(object_id, plans = summary.plans, "对象及其方案已删除");
        Ok(ApiResponse::new(
            t_with_args(
                "schedule.object_deleted",
                &[
                    ("object_id", &object_id.to_string()),
                    ("plans", &summary.plans.to_string()),
                ],
            ),
            summary,
        ))
    }

    // ==========================================
    // 编辑锁
    // ==========================================

    pub fn lock_changes(&self) -> ApiResponse<LockState> {
        self.lock_manager.lock_changes();
        ApiResponse::new(
            t_with_args("lock.changes_locked", &[]),
            LockState { id: None, locked: true },
        )
    }

    pub fn unlock_changes(&self) -> ApiResponse<LockState> {
        self.lock_manager.unlock_changes();
        ApiResponse::new(
            t_with_args("lock.changes_unlocked", &[]),
            LockState { id: None, locked: false },
        )
    }

    pub fn is_changes_locked(&self) -> LockState {
        LockState {
            id: None,
            locked: self.lock_manager.is_changes_locked(),
        }
    }

    /// 锁定方案
    #[instrument(skip(self))]
    pub fn lock_plan(&self, plan_id: i64) -> ApiResult<ApiResponse<LockState>> {
        if !self.lock_manager.lock_plan(plan_id)? {
            return Err(ApiError::not_found("SchedulePlan", plan_id));
        }
        Ok(ApiResponse::new(
            t_with_args("lock.plan_locked", &[("plan_id", &plan_id.to_string())]),
            LockState { id: Some(plan_id), locked: true },
        ))
    }

    /// 解锁方案
    ///
    /// 同一对象已有其他编辑中方案时返回 ActivePlanExists
    #[instrument(skip(self))]
    pub fn unlock_plan(&self, plan_id: i64) -> ApiResult<ApiResponse<LockState>> {
        match self.lock_manager.unlock_plan(plan_id)? {
            UnlockOutcome::Unlocked => Ok(ApiResponse::new(
                t_with_args("lock.plan_unlocked", &[("plan_id", &plan_id.to_string())]),
                LockState { id: Some(plan_id), locked: false },
            )),
            UnlockOutcome::NotFound => Err(ApiError::not_found("SchedulePlan", plan_id)),
            UnlockOutcome::AnotherEditing(editing_id) => {
                warn!(plan_id, editing_id, "同对象已有编辑中方案，拒绝解锁");
                let plan = self.get_plan(plan_id)?;
                Err(ApiError::ActivePlanExists(t_with_args(
                    "error.active_plan_exists",
                    &[
                        ("object_id", &plan.object_id.to_string()),
                        ("plan_id", &editing_id.to_string()),
                    ],
                )))
            }
        }
    }

    pub fn is_plan_locked(&self, plan_id: i64) -> ApiResult<LockState> {
        let locked = self
            .lock_manager
            .is_plan_locked(plan_id)?
            .ok_or_else(|| ApiError::not_found("SchedulePlan", plan_id))?;
        Ok(LockState { id: Some(plan_id), locked })
    }

    #[instrument(skip(self))]
    pub fn lock_object(&self, object_id: i64) -> ApiResult<ApiResponse<LockState>> {
        if !self.lock_manager.lock_object(object_id)? {
            return Err(ApiError::not_found("ConstructionObject", object_id));
        }
        Ok(ApiResponse::new(
            t_with_args("lock.object_locked", &[("object_id", &object_id.to_string())]),
            LockState { id: Some(object_id), locked: true },
        ))
    }

    #[instrument(skip(self))]
    pub fn unlock_object(&self, object_id: i64) -> ApiResult<ApiResponse<LockState>> {
        if !self.lock_manager.unlock_object(object_id)? {
            return Err(ApiError::not_found("ConstructionObject", object_id));
        }
        Ok(ApiResponse::new(
            t_with_args("lock.object_unlocked", &[("object_id", &object_id.to_string())]),
            LockState { id: Some(object_id), locked: false },
        ))
    }

    pub fn is_object_locked(&self, object_id: i64) -> ApiResult<LockState> {
        let locked = self
            .lock_manager
            .is_object_locked(object_id)?
            .ok_or_else(|| ApiError::not_found("ConstructionObject", object_id))?;
        Ok(LockState { id: Some(object_id), locked })
    }
}
