// ==========================================
// 施工进度计划系统 - 序号重排引擎
// ==========================================
// 红线: 先校验后写入, 校验失败不产生任何序号变更
// ==========================================
// 职责: 章/节的整体重排、节的跨章移动
// 输入: 父节点ID + 完整的新顺序
// 输出: 1..N 的稠密序号
// ==========================================

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::repository::error::RepositoryError;
use crate::repository::{ChapterRepository, SubchapterRepository};

// ==========================================
// OrderingViolation - 重排校验失败
// ==========================================
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderingViolation {
    #[error("数量不一致: 现有 {expected} 个, 提交 {actual} 个")]
    CountMismatch { expected: usize, actual: usize },

    #[error("ID {0} 不属于该父节点")]
    UnknownId(i64),

    #[error("ID {0} 重复出现")]
    DuplicateId(i64),
}

// ==========================================
// OrderingError - 引擎错误
// ==========================================
#[derive(Error, Debug)]
pub enum OrderingError {
    #[error(transparent)]
    Violation(#[from] OrderingViolation),

    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("不允许跨方案移动: subchapter_id={subchapter_id}, 来源方案={from_plan_id}, 目标方案={to_plan_id}")]
    CrossPlanMove {
        subchapter_id: i64,
        from_plan_id: i64,
        to_plan_id: i64,
    },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// 移动结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub subchapter_id: i64,
    pub from_chapter_id: i64,
    pub to_chapter_id: i64,
    pub new_number: i32,
}

/// 由新顺序生成序号分配 (纯函数)
///
/// new_order[i] 获得序号 i+1; 必须恰好覆盖现有兄弟集合
pub fn build_ordinal_assignment(
    existing_ids: &[i64],
    new_order: &[i64],
) -> Result<Vec<(i64, i32)>, OrderingViolation> {
    if existing_ids.len() != new_order.len() {
        return Err(OrderingViolation::CountMismatch {
            expected: existing_ids.len(),
            actual: new_order.len(),
        });
    }

    let existing: HashSet<i64> = existing_ids.iter().copied().collect();
    let mut seen = HashSet::with_capacity(new_order.len());
    for id in new_order {
        if !existing.contains(id) {
            return Err(OrderingViolation::UnknownId(*id));
        }
        if !seen.insert(*id) {
            return Err(OrderingViolation::DuplicateId(*id));
        }
    }

    Ok(new_order
        .iter()
        .enumerate()
        .map(|(idx, id)| (*id, idx as i32 + 1))
        .collect())
}

// ==========================================
// OrderingEngine - 序号重排引擎
// ==========================================
// 锁校验由调用方 (HierarchyApi) 在调用前完成
pub struct OrderingEngine {
    chapter_repo: Arc<ChapterRepository>,
    subchapter_repo: Arc<SubchapterRepository>,
}

impl OrderingEngine {
    pub fn new(
        chapter_repo: Arc<ChapterRepository>,
        subchapter_repo: Arc<SubchapterRepository>,
    ) -> Self {
        Self {
            chapter_repo,
            subchapter_repo,
        }
    }

    /// 重排方案下的章
    #[instrument(skip(self, new_order), fields(count = new_order.len()))]
    pub fn reorder_chapters(&self, plan_id: i64, new_order: &[i64]) -> Result<usize, OrderingError> {
        let existing: Vec<i64> = self
            .chapter_repo
            .list_by_plan(plan_id)?
            .iter()
            .map(|c| c.chapter_id)
            .collect();

        let numbers = build_ordinal_assignment(&existing, new_order)?;
        Ok(self.chapter_repo.apply_numbers(plan_id, &numbers)?)
    }

    /// 重排章下的节
    #[instrument(skip(self, new_order), fields(count = new_order.len()))]
    pub fn reorder_subchapters(
        &self,
        chapter_id: i64,
        new_order: &[i64],
    ) -> Result<usize, OrderingError> {
        let existing: Vec<i64> = self
            .subchapter_repo
            .list_by_chapter(chapter_id)?
            .iter()
            .map(|s| s.subchapter_id)
            .collect();

        let numbers = build_ordinal_assignment(&existing, new_order)?;
        Ok(self.subchapter_repo.apply_numbers(chapter_id, &numbers)?)
    }

    /// 将节移动到同一方案内的另一章末尾
    ///
    /// 新序号 = 目标章现有节数 + 1, 原章不重新编号 (允许出现空号)
    #[instrument(skip(self))]
    pub fn move_subchapter(
        &self,
        subchapter_id: i64,
        new_chapter_id: i64,
        plan_id: i64,
    ) -> Result<MoveOutcome, OrderingError> {
        let subchapter = self
            .subchapter_repo
            .find_by_id(subchapter_id)?
            .ok_or(OrderingError::NotFound {
                entity: "Subchapter",
                id: subchapter_id,
            })?;
        let target = self
            .chapter_repo
            .find_by_id(new_chapter_id)?
            .ok_or(OrderingError::NotFound {
                entity: "Chapter",
                id: new_chapter_id,
            })?;
        let source = self
            .chapter_repo
            .find_by_id(subchapter.chapter_id)?
            .ok_or(OrderingError::NotFound {
                entity: "Chapter",
                id: subchapter.chapter_id,
            })?;

        if source.plan_id != plan_id || target.plan_id != plan_id {
            return Err(OrderingError::CrossPlanMove {
                subchapter_id,
                from_plan_id: source.plan_id,
                to_plan_id: target.plan_id,
            });
        }

        let new_number = self
            .subchapter_repo
            .move_to_chapter(subchapter_id, new_chapter_id)?;

        Ok(MoveOutcome {
            subchapter_id,
            from_chapter_id: source.chapter_id,
            to_chapter_id: new_chapter_id,
            new_number,
        })
    }
}
