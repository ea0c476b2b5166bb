// ==========================================
// 施工进度计划系统 - 仓储聚合
// ==========================================
// 职责: 聚合进度计划所需的所有 Repository, 并提供方案结构装配
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::domain::plan::PlanStructure;
use crate::repository::error::RepositoryResult;
use crate::repository::{
    CascadeRepository, ChapterRepository, ObjectRepository, SchedulePlanRepository,
    SubchapterRepository, WorkPlanRepository, WorkTypeRepository,
};

/// 进度计划仓储集合
///
/// 所有仓储共享同一个连接
#[derive(Clone)]
pub struct ScheduleRepositories {
    pub object_repo: Arc<ObjectRepository>,
    pub plan_repo: Arc<SchedulePlanRepository>,
    pub chapter_repo: Arc<ChapterRepository>,
    pub subchapter_repo: Arc<SubchapterRepository>,
    pub work_type_repo: Arc<WorkTypeRepository>,
    pub work_plan_repo: Arc<WorkPlanRepository>,
    pub cascade_repo: Arc<CascadeRepository>,
}

impl ScheduleRepositories {
    /// 基于共享连接创建全部仓储
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            object_repo: Arc::new(ObjectRepository::new(conn.clone())),
            plan_repo: Arc::new(SchedulePlanRepository::new(conn.clone())),
            chapter_repo: Arc::new(ChapterRepository::new(conn.clone())),
            subchapter_repo: Arc::new(SubchapterRepository::new(conn.clone())),
            work_type_repo: Arc::new(WorkTypeRepository::new(conn.clone())),
            work_plan_repo: Arc::new(WorkPlanRepository::new(conn.clone())),
            cascade_repo: Arc::new(CascadeRepository::new(conn)),
        }
    }

    /// 装配方案结构快照 (只读)
    ///
    /// 章/节/工作类型按序号, 工作计划按日期
    ///
    /// # 返回
    /// - `Ok(None)`: 方案不存在
    pub fn load_structure(&self, plan_id: i64) -> RepositoryResult<Option<PlanStructure>> {
        let plan = match self.plan_repo.find_by_id(plan_id)? {
            Some(p) => p,
            None => return Ok(None),
        };
        let object = self.object_repo.find_by_id(plan.object_id)?;

        let chapters = self.chapter_repo.list_by_plan(plan_id)?;
        let chapter_ids: Vec<i64> = chapters.iter().map(|c| c.chapter_id).collect();

        let subchapters = self.subchapter_repo.list_by_chapters(&chapter_ids)?;
        let subchapter_ids: Vec<i64> = subchapters.iter().map(|s| s.subchapter_id).collect();

        let work_types = self.work_type_repo.list_by_subchapters(&subchapter_ids)?;
        let work_type_ids: Vec<i64> = work_types.iter().map(|w| w.work_type_id).collect();

        let work_plans = self.work_plan_repo.list_by_work_types(&work_type_ids, None)?;

        Ok(Some(PlanStructure {
            plan,
            object,
            chapters,
            subchapters,
            work_types,
            work_plans,
        }))
    }
}
