// ==========================================
// 施工进度计划系统 - 编辑锁管理
// ==========================================
// 三种锁能力, 判定时取逻辑或:
// 1. 全局维护开关 (进程内, 不持久化, 重启后复位)
// 2. 对象锁 (construction_object.status = "LOCKED")
// 3. 方案锁 (work_schedule_plan.status = "Заблокирован")
// 红线: 读操作永不受锁影响
// ==========================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::object::ConstructionObject;
use crate::domain::plan::SchedulePlan;
use crate::domain::types::{object_status, PlanStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{ObjectRepository, SchedulePlanRepository};

// ==========================================
// ChangesSwitch - 全局维护开关
// ==========================================
#[derive(Debug, Default)]
pub struct ChangesSwitch {
    locked: AtomicBool,
}

impl ChangesSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock(&self) {
        self.locked.store(true, Ordering::SeqCst);
    }

    pub fn unlock(&self) {
        self.locked.store(false, Ordering::SeqCst);
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::SeqCst)
    }
}

// ==========================================
// LockScope - 阻断来源
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", content = "id")]
pub enum LockScope {
    /// 全局开关
    Changes,
    /// 对象锁
    Object(i64),
    /// 方案锁
    Plan(i64),
}

/// 评估方案是否可编辑 (纯函数)
///
/// 检查顺序: 全局开关 -> 对象 -> 方案; 返回第一个阻断来源
pub fn evaluate_gate(
    changes_locked: bool,
    object: Option<&ConstructionObject>,
    plan: &SchedulePlan,
) -> Option<LockScope> {
    if changes_locked {
        return Some(LockScope::Changes);
    }
    if let Some(obj) = object {
        if obj.is_locked() {
            return Some(LockScope::Object(obj.object_id));
        }
    }
    if plan.is_locked() {
        return Some(LockScope::Plan(plan.plan_id));
    }
    None
}

/// 解锁方案的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    Unlocked,
    NotFound,
    /// 同一对象已有其他编辑中方案
    AnotherEditing(i64),
}

// ==========================================
// LockManager - 编辑锁管理
// ==========================================
pub struct LockManager {
    switch: Arc<ChangesSwitch>,
    plan_repo: Arc<SchedulePlanRepository>,
    object_repo: Arc<ObjectRepository>,
}

impl LockManager {
    pub fn new(
        switch: Arc<ChangesSwitch>,
        plan_repo: Arc<SchedulePlanRepository>,
        object_repo: Arc<ObjectRepository>,
    ) -> Self {
        Self {
            switch,
            plan_repo,
            object_repo,
        }
    }

    // ==========================================
    // 全局开关
    // ==========================================

    pub fn lock_changes(&self) {
        self.switch.lock();
        info!("全局编辑开关已锁定");
    }

    pub fn unlock_changes(&self) {
        self.switch.unlock();
        info!("全局编辑开关已解锁");
    }

    pub fn is_changes_locked(&self) -> bool {
        self.switch.is_locked()
    }

    // ==========================================
    // 方案锁
    // ==========================================

    /// 锁定方案
    ///
    /// # 返回
    /// - `Ok(false)`: 方案不存在
    pub fn lock_plan(&self, plan_id: i64) -> RepositoryResult<bool> {
        let updated = self.plan_repo.update_status(plan_id, PlanStatus::Locked)?;
        if updated {
            info!(plan_id, "方案已锁定");
        }
        Ok(updated)
    }

    /// 解锁方案 (置为编辑中)
    ///
    /// 同一对象已有其他编辑中方案时拒绝, 保持"至多一个编辑中方案"
    pub fn unlock_plan(&self, plan_id: i64) -> RepositoryResult<UnlockOutcome> {
        let plan = match self.plan_repo.find_by_id(plan_id)? {
            Some(p) => p,
            None => return Ok(UnlockOutcome::NotFound),
        };

        if let Some(editing) = self.plan_repo.find_editing_by_object(plan.object_id)? {
            if editing.plan_id != plan_id {
                return Ok(UnlockOutcome::AnotherEditing(editing.plan_id));
            }
        }

        self.plan_repo.update_status(plan_id, PlanStatus::Editing)?;
        info!(plan_id, "方案已解锁");
        Ok(UnlockOutcome::Unlocked)
    }

    /// 查询方案是否锁定
    ///
    /// # 返回
    /// - `Ok(None)`: 方案不存在
    pub fn is_plan_locked(&self, plan_id: i64) -> RepositoryResult<Option<bool>> {
        Ok(self.plan_repo.find_by_id(plan_id)?.map(|p| p.is_locked()))
    }

    // ==========================================
    // 对象锁
    // ==========================================

    pub fn lock_object(&self, object_id: i64) -> RepositoryResult<bool> {
        let updated = self
            .object_repo
            .update_status(object_id, object_status::LOCKED)?;
        if updated {
            info!(object_id, "对象已锁定");
        }
        Ok(updated)
    }

    pub fn unlock_object(&self, object_id: i64) -> RepositoryResult<bool> {
        let updated = self
            .object_repo
            .update_status(object_id, object_status::UNLOCKED)?;
        if updated {
            info!(object_id, "对象已解锁");
        }
        Ok(updated)
    }

    pub fn is_object_locked(&self, object_id: i64) -> RepositoryResult<Option<bool>> {
        Ok(self.object_repo.find_by_id(object_id)?.map(|o| o.is_locked()))
    }

    // ==========================================
    // 闸门
    // ==========================================

    /// 加载方案并评估闸门
    ///
    /// # 返回
    /// - `Ok((plan, None))`: 可编辑
    /// - `Ok((plan, Some(scope)))`: 被 scope 阻断
    /// - `Err(NotFound)`: 方案不存在
    pub fn check_plan(&self, plan_id: i64) -> RepositoryResult<(SchedulePlan, Option<LockScope>)> {
        let plan = self
            .plan_repo
            .find_by_id(plan_id)?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "SchedulePlan".to_string(),
                id: plan_id.to_string(),
            })?;
        let object = self.object_repo.find_by_id(plan.object_id)?;

        let blocked = evaluate_gate(self.switch.is_locked(), object.as_ref(), &plan);
        if let Some(scope) = blocked {
            debug!(plan_id, ?scope, "编辑被锁阻断");
        }
        Ok((plan, blocked))
    }
}
