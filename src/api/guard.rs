// ==========================================
// 施工进度计划系统 - 编辑闸门
// ==========================================
// 所有写操作在修改前调用, 被阻断时不产生任何写入
// ==========================================

use tracing::warn;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::plan::SchedulePlan;
use crate::engine::lock_manager::{LockManager, LockScope};

/// 校验方案可编辑 (全局开关 / 对象锁 / 方案锁)
pub(crate) fn ensure_plan_editable(
    lock_manager: &LockManager,
    plan_id: i64,
    action: &str,
) -> ApiResult<SchedulePlan> {
    let (plan, blocked) = lock_manager.check_plan(plan_id)?;
    match blocked {
        None => Ok(plan),
        Some(scope) => {
            warn!(plan_id, action, ?scope, "写操作被编辑锁拒绝");
            Err(ApiError::from_lock_scope(scope))
        }
    }
}

/// 校验全局编辑开关未锁定
pub(crate) fn ensure_changes_unlocked(lock_manager: &LockManager, action: &str) -> ApiResult<()> {
    if lock_manager.is_changes_locked() {
        warn!(action, "写操作被全局编辑开关拒绝");
        return Err(ApiError::from_lock_scope(LockScope::Changes));
    }
    Ok(())
}

/// 校验非空文本字段
pub(crate) fn require_text(field: &str, value: &str) -> ApiResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidInput(format!("{} 不能为空", field)));
    }
    Ok(trimmed.to_string())
}
